use crate::regions::region_name;

/// Label used when the request carries no usable location.
pub const UNKNOWN_LOCATION: &str = "Somewhere else in the world";

/// Countries whose English short name reads with a leading article.
const WITH_ARTICLE: [&str; 3] = ["GB", "US", "AE"];

/// Derives the human-readable location label for a visit.
///
/// `city` arrives percent-encoded from the edge network and is decoded
/// here, so two visits from the same city always produce the same label.
pub fn visitor_label(city: Option<&str>, country_code: Option<&str>) -> String {
    let city = city.map(str::trim).filter(|c| !c.is_empty());
    let country_code = country_code.map(str::trim).filter(|c| !c.is_empty());

    let Some(code) = country_code else {
        return UNKNOWN_LOCATION.to_string();
    };
    let country = region_name(code).unwrap_or(code);

    match city {
        Some(city) => format!("{}, {country}", decode_label(city)),
        None => {
            let article = if WITH_ARTICLE.iter().any(|c| c.eq_ignore_ascii_case(code)) {
                "the "
            } else {
                ""
            };
            format!("Somewhere in {article}{country}")
        }
    }
}

/// Percent-decodes `raw`, returning it unchanged when it is not valid
/// percent-encoded UTF-8.
pub fn decode_label(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
