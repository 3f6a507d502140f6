use crate::model::VisitorListResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use footfall_ledger::{TrackOutcome, VisitRequest};
use jiff::Timestamp;
use tracing::warn;

pub const CITY_HEADER: &str = "x-vercel-ip-city";
pub const COUNTRY_HEADER: &str = "x-vercel-ip-country";
pub const REAL_IP_HEADER: &str = "x-real-ip";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

const LIST_CACHE_CONTROL: &str = "public, max-age=1800, stale-while-revalidate=3600";
/// Reported freshness lags the clock by this much.
const LAST_UPDATED_LAG_MS: i64 = 10_000;

pub async fn list_visitors_handler(State(state): State<AppState>) -> impl IntoResponse {
    let visitors = state.listing().visitors().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to read visitor ledger");
        Vec::new()
    });

    let body = VisitorListResponse {
        visitors,
        last_updated: Timestamp::now().as_millisecond() - LAST_UPDATED_LAG_MS,
    };

    ([(header::CACHE_CONTROL, LIST_CACHE_CONTROL)], Json(body))
}

pub async fn track_visit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<TrackOutcome> {
    let request = visit_request(&headers);
    Json(state.tracker().track(&request).await)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn visit_request(headers: &HeaderMap) -> VisitRequest {
    let ip = header_str(headers, REAL_IP_HEADER).or_else(|| {
        header_str(headers, FORWARDED_FOR_HEADER)
            .and_then(|list| list.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    });

    VisitRequest {
        city: header_str(headers, CITY_HEADER).map(String::from),
        country: header_str(headers, COUNTRY_HEADER).map(String::from),
        ip: ip.map(String::from),
    }
}
