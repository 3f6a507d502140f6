use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A single entry in the visitor ledger.
///
/// Only a coarse location label, the capture time and approximate
/// coordinates are kept. Nothing identifying the visitor is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorRecord {
    /// Human-readable label, e.g. "London, United Kingdom".
    pub location: String,
    /// When the record was created.
    pub timestamp: Timestamp,
    pub latitude: f64,
    pub longitude: f64,
}

impl VisitorRecord {
    pub fn new(location: impl Into<String>, coordinates: Coordinates, timestamp: Timestamp) -> Self {
        Self {
            location: location.into(),
            timestamp,
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// An approximate position on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Accepts a resolver answer only when both components carry a value.
    ///
    /// Geolocation services answer `0` (or nothing) when they cannot place an
    /// address, so a zero, NaN or infinite component counts as unresolved.
    pub fn resolved(latitude: f64, longitude: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v != 0.0;
        if usable(latitude) && usable(longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}
