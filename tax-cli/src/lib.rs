//! Command-line front end for the tax engine.
//!
//! Builds [`tax_core::TaxEstimateInput`]s from flags, TOML request files or
//! batch CSV files, and renders the results as text or as a CSV report.

pub mod csv_loader;
pub mod logging;
pub mod report;
pub mod request;
pub mod utils;
