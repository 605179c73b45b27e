//! Tax computations.
//!
//! Each module covers one component of the estimate; [`engine`] runs them in
//! order for a full [`crate::TaxEstimateResult`].

pub mod brackets;
pub mod common;
pub mod comparison;
pub mod engine;
pub mod self_emp;
pub mod state;
pub mod withholding;

pub use brackets::{BracketSlice, compute_bracket_breakdown, total_bracket_tax};
pub use comparison::{YearOverYear, compare_with_prior_year};
pub use engine::{TaxEngine, TaxEngineError};
pub use self_emp::{SelfEmploymentTax, compute_self_employment_tax};
pub use state::compute_state_tax;
pub use withholding::{WithholdingSuggestion, compute_withholding};
