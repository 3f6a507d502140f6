//! Core types and traits for the Footfall visitor services.
//!
//! This crate provides the shared visitor record model, the key-value
//! store abstraction the ledger persists through, and the clock used
//! to stamp new records.

pub mod clock;
pub mod error;
pub mod record;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use error::{Result, StorageError};
pub use record::{Coordinates, VisitorRecord};
pub use store::KvStore;
