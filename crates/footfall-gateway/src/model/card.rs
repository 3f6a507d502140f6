use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    pub theme: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
