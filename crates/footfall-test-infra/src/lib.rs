//! Container fixtures for Footfall integration tests.

pub mod error;
pub mod redis;

pub use error::{Result, TestInfraError};
