use crate::label::{decode_label, visitor_label, UNKNOWN_LOCATION};
use crate::ledger::VisitorLedger;
use crate::resolver::GeoResolver;
use footfall_core::{Clock, KvStore, SystemClock, VisitorRecord};
use serde::Serialize;
use tracing::{debug, warn};

/// Request metadata the tracker needs, as supplied by the edge network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitRequest {
    /// Percent-encoded city name.
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    pub ip: Option<String>,
}

impl VisitRequest {
    fn client_ip(&self) -> Option<&str> {
        self.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutcome {
    pub visitors: Vec<VisitorRecord>,
    /// Label of the visit before this one.
    pub last_visitor: String,
    pub current_visitor: String,
}

/// Records visits on a best-effort basis.
///
/// Storage and geolocation failures are logged and degrade the answer;
/// [`track`](VisitTracker::track) itself never fails.
#[derive(Debug, Clone)]
pub struct VisitTracker<S, R, C = SystemClock> {
    ledger: VisitorLedger<S, C>,
    resolver: R,
    dev_mode: bool,
}

impl<S: KvStore, R: GeoResolver, C: Clock> VisitTracker<S, R, C> {
    pub fn new(ledger: VisitorLedger<S, C>, resolver: R) -> Self {
        Self {
            ledger,
            resolver,
            dev_mode: false,
        }
    }

    /// In development mode no storage or network I/O happens.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn ledger(&self) -> &VisitorLedger<S, C> {
        &self.ledger
    }

    pub async fn track(&self, request: &VisitRequest) -> TrackOutcome {
        if self.dev_mode {
            return TrackOutcome {
                visitors: Vec::new(),
                last_visitor: UNKNOWN_LOCATION.to_string(),
                current_visitor: UNKNOWN_LOCATION.to_string(),
            };
        }

        let current = visitor_label(request.city.as_deref(), request.country.as_deref());

        let last_visitor = match self.ledger.last_visitor().await {
            Ok(Some(label)) => decode_label(&label),
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to read last visitor");
                UNKNOWN_LOCATION.to_string()
            }
        };

        if let Err(e) = self.ledger.set_last_visitor(&current).await {
            warn!(error = %e, "Failed to update last visitor");
        }

        let visitors = match request.client_ip() {
            Some(ip) => self.record(ip, &current).await,
            None => {
                debug!("No client address, visit not recorded");
                Vec::new()
            }
        };

        TrackOutcome {
            visitors,
            last_visitor,
            current_visitor: current,
        }
    }

    async fn record(&self, ip: &str, location: &str) -> Vec<VisitorRecord> {
        let coordinates = self.resolver.locate(ip).await;

        match self.ledger.record_visit(location, coordinates).await {
            Ok(visitors) => visitors,
            Err(e) => {
                warn!(location, error = %e, "Failed to record visit");
                match self.ledger.visitors().await {
                    Ok(visitors) => visitors,
                    Err(_) => Vec::new(),
                }
            }
        }
    }
}
