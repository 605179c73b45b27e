//! Progressive income-tax estimation.
//!
//! [`TaxEngine`] turns a [`TaxEstimateInput`] into a [`TaxEstimateResult`]
//! using the versioned tables held by a [`TaxTableRegistry`]. All amounts are
//! [`rust_decimal::Decimal`] and the engine never rounds intermediate values.

pub mod calculations;
pub mod models;
pub mod tables;

pub use calculations::{TaxEngine, TaxEngineError};
pub use models::*;
pub use tables::{TaxTableError, TaxTableRegistry, TaxYearTables};
