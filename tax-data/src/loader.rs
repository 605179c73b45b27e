use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tax_core::{
    BracketTable, FilingStatus, PerFilingStatus, SelfEmploymentRates, StateTaxInfo, TaxBracket,
    TaxTableError, TaxTableRegistry, TaxYearTables, UnknownFilingStatus, normalize_state_code,
};
use thiserror::Error;
use tracing::{debug, info};

/// File names expected by [`TaxTableLoader::load_dir`].
pub const BRACKETS_FILE: &str = "tax_brackets.csv";
pub const STANDARD_DEDUCTIONS_FILE: &str = "standard_deductions.csv";
pub const STATE_RATES_FILE: &str = "state_rates.csv";
pub const YEAR_CONFIG_FILE: &str = "tax_year_config.csv";

/// Errors that can occur when loading tax table data.
#[derive(Debug, Error)]
pub enum TaxTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error(transparent)]
    UnknownFilingStatus(#[from] UnknownFilingStatus),

    #[error(
        "Tax year {tax_year}, schedule {schedule}: bracket starts at {min_income}, expected {expected}"
    )]
    NonContiguousBracket {
        tax_year: i32,
        schedule: String,
        min_income: Decimal,
        expected: Decimal,
    },

    #[error(
        "Tax year {tax_year}, schedule {schedule}: base tax {base_tax} at {min_income} does not match accumulated tax {expected}"
    )]
    BaseTaxMismatch {
        tax_year: i32,
        schedule: String,
        min_income: Decimal,
        base_tax: Decimal,
        expected: Decimal,
    },

    #[error("Tax year {tax_year}: no brackets for schedule {schedule}")]
    MissingBrackets { tax_year: i32, schedule: &'static str },

    #[error("Tax year {tax_year}: no standard deduction for {filing_status}")]
    MissingStandardDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
    },

    #[error("Tax year {tax_year}: more than one standard deduction for {filing_status}")]
    DuplicateStandardDeduction {
        tax_year: i32,
        filing_status: FilingStatus,
    },

    #[error("Tax year {tax_year}: more than one rate for state {state}")]
    DuplicateStateRate { tax_year: i32, state: String },

    #[error("Tax year {0}: no self-employment rates configured")]
    MissingYearConfig(i32),

    #[error("Tax year {0}: more than one self-employment rates row")]
    DuplicateYearConfig(i32),

    #[error("Tax year {tax_year}: {source}")]
    InvalidTables {
        tax_year: i32,
        #[source]
        source: TaxTableError,
    },
}

impl From<csv::Error> for TaxTableLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxTableLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing statuses.
///
/// - Schedule X → Single (S)
/// - Schedule Y-1 → Married Filing Jointly (MFJ)
/// - Schedule Y-2 → Married Filing Separately (MFS)
/// - Schedule Z → Head of Household (HOH)
fn schedule_to_filing_status(schedule: &str) -> Result<FilingStatus, TaxTableLoaderError> {
    match schedule {
        "X" => Ok(FilingStatus::Single),
        "Y-1" => Ok(FilingStatus::MarriedJoint),
        "Y-2" => Ok(FilingStatus::MarriedSeparate),
        "Z" => Ok(FilingStatus::HeadOfHousehold),
        _ => Err(TaxTableLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

fn filing_status_to_schedule(filing_status: FilingStatus) -> &'static str {
    match filing_status {
        FilingStatus::Single => "X",
        FilingStatus::MarriedJoint => "Y-1",
        FilingStatus::MarriedSeparate => "Y-2",
        FilingStatus::HeadOfHousehold => "Z",
    }
}

/// A single record from the tax brackets CSV file.
///
/// The CSV format uses IRS schedule designations:
/// - `tax_year`: The tax year (e.g., 2025)
/// - `schedule`: The IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: The minimum income for this bracket
/// - `max_income`: The maximum income for this bracket (empty for unlimited)
/// - `base_tax`: Tax owed on `min_income`, used as a consistency check
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

/// `tax_year,filing_status,amount`; the status is any form accepted by
/// [`FilingStatus::parse`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StandardDeductionRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub amount: Decimal,
}

/// `tax_year,state,name,rate`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateRateRecord {
    pub tax_year: i32,
    pub state: String,
    pub name: String,
    pub rate: Decimal,
}

/// `tax_year,social_security_rate,medicare_rate,net_earnings_factor`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxYearConfigRecord {
    pub tax_year: i32,
    pub social_security_rate: Decimal,
    pub medicare_rate: Decimal,
    pub net_earnings_factor: Decimal,
}

impl From<&TaxYearConfigRecord> for SelfEmploymentRates {
    fn from(record: &TaxYearConfigRecord) -> Self {
        SelfEmploymentRates {
            social_security_rate: record.social_security_rate,
            medicare_rate: record.medicare_rate,
            net_earnings_factor: record.net_earnings_factor,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, TaxTableLoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    Ok(records)
}

/// Loader for tax table sets from CSV files.
///
/// Each file may hold any number of tax years; [`TaxTableLoader::assemble`]
/// groups the records by year and builds one validated [`TaxYearTables`] per
/// year found in the bracket file.
pub struct TaxTableLoader;

impl TaxTableLoader {
    /// Parse tax bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse_brackets<R: Read>(
        reader: R
    ) -> Result<Vec<TaxBracketRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    pub fn parse_standard_deductions<R: Read>(
        reader: R
    ) -> Result<Vec<StandardDeductionRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    pub fn parse_state_rates<R: Read>(
        reader: R
    ) -> Result<Vec<StateRateRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    pub fn parse_year_config<R: Read>(
        reader: R
    ) -> Result<Vec<TaxYearConfigRecord>, TaxTableLoaderError> {
        parse_records(reader)
    }

    /// Builds a registry from parsed records.
    ///
    /// For each tax year present in `brackets`, this method will:
    /// 1. Check every schedule's rows are contiguous from zero
    /// 2. Check each row's `base_tax` against the tax of the rows below it
    /// 3. Require one standard deduction per filing status
    /// 4. Require self-employment rates for the year
    /// 5. Validate the assembled [`TaxYearTables`]
    pub fn assemble(
        brackets: &[TaxBracketRecord],
        standard_deductions: &[StandardDeductionRecord],
        state_rates: &[StateRateRecord],
        year_config: &[TaxYearConfigRecord],
    ) -> Result<TaxTableRegistry, TaxTableLoaderError> {
        // Group by (tax_year, filing status); rows keep file order.
        let mut schedules: BTreeMap<(i32, FilingStatus), Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in brackets {
            let filing_status = schedule_to_filing_status(&record.schedule)?;
            schedules
                .entry((record.tax_year, filing_status))
                .or_default()
                .push(record);
        }

        let years: BTreeSet<i32> = brackets.iter().map(|r| r.tax_year).collect();
        let mut registry = TaxTableRegistry::new();

        for tax_year in years {
            let bracket_tables = PerFilingStatus::try_from_fn(|filing_status| {
                let schedule = filing_status_to_schedule(filing_status);
                let rows = schedules
                    .get(&(tax_year, filing_status))
                    .ok_or(TaxTableLoaderError::MissingBrackets { tax_year, schedule })?;
                Self::bracket_table(tax_year, schedule, rows)
            })?;

            let deductions = Self::standard_deductions_for(tax_year, standard_deductions)?;

            let states = Self::state_rates_for(tax_year, state_rates)?;
            let self_employment = Self::year_config_for(tax_year, year_config)?;

            let tables = TaxYearTables::new(
                tax_year,
                bracket_tables,
                deductions,
                states,
                self_employment,
            )
            .map_err(|source| TaxTableLoaderError::InvalidTables { tax_year, source })?;

            debug!(
                tax_year,
                states = tables.state_rates().len(),
                "tax year tables assembled"
            );

            registry
                .insert(tables)
                .map_err(|source| TaxTableLoaderError::InvalidTables { tax_year, source })?;
        }

        Ok(registry)
    }

    /// Reads the four table files from `dir` and assembles them.
    pub fn load_dir(dir: &Path) -> Result<TaxTableRegistry, TaxTableLoaderError> {
        let brackets = Self::parse_brackets(open(&dir.join(BRACKETS_FILE))?)?;
        let deductions =
            Self::parse_standard_deductions(open(&dir.join(STANDARD_DEDUCTIONS_FILE))?)?;
        let states = Self::parse_state_rates(open(&dir.join(STATE_RATES_FILE))?)?;
        let config = Self::parse_year_config(open(&dir.join(YEAR_CONFIG_FILE))?)?;

        let registry = Self::assemble(&brackets, &deductions, &states, &config)?;

        info!(
            dir = %dir.display(),
            years = ?registry.years(),
            "tax tables loaded"
        );

        Ok(registry)
    }

    /// Converts one schedule's rows into a [`BracketTable`].
    ///
    /// Rows are ordered by `min_income`; each must start where the previous
    /// one ended and carry the tax accumulated below it as `base_tax`.
    fn bracket_table(
        tax_year: i32,
        schedule: &str,
        rows: &[&TaxBracketRecord],
    ) -> Result<BracketTable, TaxTableLoaderError> {
        let mut rows = rows.to_vec();
        rows.sort_by(|a, b| a.min_income.cmp(&b.min_income));

        let mut expected_min = Decimal::ZERO;
        let mut accumulated = Decimal::ZERO;
        let mut brackets = Vec::with_capacity(rows.len());

        for row in rows {
            if row.min_income != expected_min {
                return Err(TaxTableLoaderError::NonContiguousBracket {
                    tax_year,
                    schedule: schedule.to_string(),
                    min_income: row.min_income,
                    expected: expected_min,
                });
            }
            if row.base_tax != accumulated {
                return Err(TaxTableLoaderError::BaseTaxMismatch {
                    tax_year,
                    schedule: schedule.to_string(),
                    min_income: row.min_income,
                    base_tax: row.base_tax,
                    expected: accumulated,
                });
            }

            if let Some(max_income) = row.max_income {
                accumulated += (max_income - row.min_income) * row.rate;
                expected_min = max_income;
            }

            brackets.push(TaxBracket {
                rate: row.rate,
                limit: row.max_income,
            });
        }

        BracketTable::new(brackets)
            .map_err(|source| TaxTableLoaderError::InvalidTables { tax_year, source })
    }

    fn standard_deductions_for(
        tax_year: i32,
        records: &[StandardDeductionRecord],
    ) -> Result<PerFilingStatus<Decimal>, TaxTableLoaderError> {
        let mut amounts: BTreeMap<FilingStatus, Decimal> = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let filing_status: FilingStatus = record.filing_status.parse()?;
            if amounts.insert(filing_status, record.amount).is_some() {
                return Err(TaxTableLoaderError::DuplicateStandardDeduction {
                    tax_year,
                    filing_status,
                });
            }
        }

        PerFilingStatus::try_from_fn(|filing_status| {
            amounts
                .get(&filing_status)
                .copied()
                .ok_or(TaxTableLoaderError::MissingStandardDeduction {
                    tax_year,
                    filing_status,
                })
        })
    }

    /// State rows for one year, keyed by upper-cased code. A code may
    /// appear once per year.
    fn state_rates_for(
        tax_year: i32,
        records: &[StateRateRecord],
    ) -> Result<BTreeMap<String, StateTaxInfo>, TaxTableLoaderError> {
        let mut states = BTreeMap::new();
        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let state = normalize_state_code(&record.state);
            let info = StateTaxInfo::new(record.name.clone(), record.rate);
            if states.insert(state.clone(), info).is_some() {
                return Err(TaxTableLoaderError::DuplicateStateRate { tax_year, state });
            }
        }
        Ok(states)
    }

    fn year_config_for(
        tax_year: i32,
        records: &[TaxYearConfigRecord],
    ) -> Result<SelfEmploymentRates, TaxTableLoaderError> {
        let mut rows = records.iter().filter(|r| r.tax_year == tax_year);
        let record = rows
            .next()
            .ok_or(TaxTableLoaderError::MissingYearConfig(tax_year))?;
        if rows.next().is_some() {
            return Err(TaxTableLoaderError::DuplicateYearConfig(tax_year));
        }
        Ok(SelfEmploymentRates::from(record))
    }
}

fn open(path: &Path) -> Result<File, TaxTableLoaderError> {
    File::open(path).map_err(|source| TaxTableLoaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
