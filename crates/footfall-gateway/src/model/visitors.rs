use footfall_core::VisitorRecord;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorListResponse {
    pub visitors: Vec<VisitorRecord>,
    /// Epoch milliseconds.
    pub last_updated: i64,
}
