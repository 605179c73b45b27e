//! Loads versioned tax table sets from CSV files.

pub mod loader;

pub use loader::{
    BRACKETS_FILE, STANDARD_DEDUCTIONS_FILE, STATE_RATES_FILE, StandardDeductionRecord,
    StateRateRecord, TaxBracketRecord, TaxTableLoader, TaxTableLoaderError, TaxYearConfigRecord,
    YEAR_CONFIG_FILE,
};
