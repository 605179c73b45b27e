use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::TaxYearTables;
use crate::models::{BracketTable, PerFilingStatus, SelfEmploymentRates, StateTaxInfo, TaxBracket};

/// Limits of the six bounded brackets; the seventh bracket (37%) is unbounded.
fn federal_table(limits: [Decimal; 6]) -> BracketTable {
    const RATES: [Decimal; 7] = [
        dec!(0.10),
        dec!(0.12),
        dec!(0.22),
        dec!(0.24),
        dec!(0.32),
        dec!(0.35),
        dec!(0.37),
    ];

    let mut brackets: Vec<TaxBracket> = RATES
        .iter()
        .zip(limits)
        .map(|(rate, limit)| TaxBracket::bounded(*rate, limit))
        .collect();
    brackets.push(TaxBracket::unbounded(RATES[6]));

    BracketTable::from_validated(brackets)
}

fn state_rates() -> BTreeMap<String, StateTaxInfo> {
    BTreeMap::from([
        ("CA".to_string(), StateTaxInfo::new("California", dec!(0.0750))),
        ("FL".to_string(), StateTaxInfo::new("Florida", dec!(0))),
        ("NY".to_string(), StateTaxInfo::new("New York", dec!(0.0685))),
        ("TX".to_string(), StateTaxInfo::new("Texas", dec!(0))),
    ])
}

fn tax_year_2024() -> TaxYearTables {
    TaxYearTables {
        tax_year: 2024,
        brackets: PerFilingStatus {
            single: federal_table([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(609350),
            ]),
            married_joint: federal_table([
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200),
            ]),
            head_of_household: federal_table([
                dec!(16550),
                dec!(63100),
                dec!(100500),
                dec!(191950),
                dec!(243700),
                dec!(609350),
            ]),
            married_separate: federal_table([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(365700),
            ]),
        },
        standard_deductions: PerFilingStatus {
            single: dec!(14600),
            married_joint: dec!(29200),
            head_of_household: dec!(21900),
            married_separate: dec!(14600),
        },
        state_rates: state_rates(),
        self_employment: SelfEmploymentRates::default(),
    }
}

fn tax_year_2025() -> TaxYearTables {
    TaxYearTables {
        tax_year: 2025,
        brackets: PerFilingStatus {
            single: federal_table([
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(626350),
            ]),
            married_joint: federal_table([
                dec!(23850),
                dec!(96950),
                dec!(206700),
                dec!(394600),
                dec!(501050),
                dec!(751600),
            ]),
            head_of_household: federal_table([
                dec!(17000),
                dec!(64850),
                dec!(103350),
                dec!(197300),
                dec!(250500),
                dec!(626350),
            ]),
            married_separate: federal_table([
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(375800),
            ]),
        },
        standard_deductions: PerFilingStatus {
            single: dec!(15000),
            married_joint: dec!(30000),
            head_of_household: dec!(22500),
            married_separate: dec!(15000),
        },
        state_rates: state_rates(),
        self_employment: SelfEmploymentRates::default(),
    }
}

pub(super) fn all_years() -> Vec<TaxYearTables> {
    vec![tax_year_2024(), tax_year_2025()]
}
