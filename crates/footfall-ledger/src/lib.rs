//! Visitor ledger and the best-effort tracking flow built on it.
//!
//! The [`VisitorLedger`] keeps a bounded, deduplicated, most-recent-first
//! list of visitor locations in a [`KvStore`](footfall_core::KvStore). The
//! [`VisitTracker`] wraps it with label derivation and geolocation so that
//! a request handler can record a visit without ever failing.
//!
//! # Example
//!
//! ```rust
//! use footfall_core::Coordinates;
//! use footfall_ledger::{LedgerSettings, VisitorLedger};
//! use footfall_store::InMemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = VisitorLedger::new(InMemoryStore::new(), LedgerSettings::default());
//!
//! let paris = Coordinates::resolved(48.85, 2.35);
//! let visitors = ledger.record_visit("Paris, France", paris).await?;
//! assert_eq!(visitors[0].location, "Paris, France");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod label;
pub mod ledger;
mod regions;
pub mod resolver;
pub mod tracker;

pub use error::{LedgerError, Result};
pub use label::{decode_label, visitor_label, UNKNOWN_LOCATION};
pub use ledger::{apply_visit, LedgerSettings, VisitorLedger, DEFAULT_MAX_RECORDS};
pub use regions::region_name;
pub use resolver::{
    FixedResolver, GeoResolver, IpApiResolver, DEFAULT_IP_API_URL, DEFAULT_RESOLVER_TIMEOUT,
};
pub use tracker::{TrackOutcome, VisitRequest, VisitTracker};
