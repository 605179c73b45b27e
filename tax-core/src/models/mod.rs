mod filing_status;
mod state_tax;
mod tax_bracket;
mod tax_estimate;
mod tax_year_config;

pub use filing_status::{FilingStatus, PerFilingStatus, UnknownFilingStatus};
pub use state_tax::{StateTaxInfo, is_state_code, normalize_state_code};
pub use tax_bracket::{BracketTable, TaxBracket};
pub use tax_estimate::{
    Credit, DEFAULT_PAY_PERIODS, DEFAULT_TAX_YEAR, Deduction, DeductionSummary, PriorYearSummary,
    TaxEstimateInput, TaxEstimateResult,
};
pub use tax_year_config::SelfEmploymentRates;
