//! bb-core: stable foundation for the behaviour bricks.
//!
//! Contains:
//! - units (uom SI types for elastic properties and temperatures)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{BbError, BbResult};
pub use numeric::*;
pub use units::*;
