//! Rendering estimates for people: a text summary and a CSV report.

use std::fmt;
use std::io;

use chrono::NaiveDate;
use tax_core::{TaxEstimateInput, TaxEstimateResult};

use crate::utils::{format_currency, format_percent, format_rate};

/// Date format of the "Generated on" row.
const DATE_FORMAT: &str = "%m/%d/%Y";

/// One CSV line; an empty vector is a blank separator line.
pub type ReportRow = Vec<String>;

fn row<const N: usize>(cells: [&str; N]) -> ReportRow {
    cells.iter().map(|c| c.to_string()).collect()
}

fn labelled(
    label: &str,
    value: String,
) -> ReportRow {
    vec![label.to_string(), value]
}

/// Builds the rows of the exported estimate report.
pub fn report_rows(
    input: &TaxEstimateInput,
    result: &TaxEstimateResult,
    generated_on: NaiveDate,
) -> Vec<ReportRow> {
    let mut rows = vec![
        row(["Tax Estimation Report"]),
        labelled("Generated on", generated_on.format(DATE_FORMAT).to_string()),
        Vec::new(),
        row(["Income Details"]),
        labelled("Tax Year", result.tax_year.to_string()),
        labelled("Annual Income", format_currency(result.gross_income)),
        labelled("Filing Status", result.filing_status.label().to_string()),
        labelled(
            "Self-Employment Income",
            format_currency(input.self_employment_income),
        ),
        Vec::new(),
        row(["Tax Breakdown"]),
        labelled("Federal Tax", format_currency(result.federal_tax)),
        labelled("State Tax", format_currency(result.state_tax)),
        labelled(
            "Self-Employment Tax",
            format_currency(result.self_employment_tax.total),
        ),
        labelled("Total Tax", format_currency(result.total_tax)),
        labelled("Effective Tax Rate", format_percent(result.effective_rate)),
        Vec::new(),
        row(["Withholding"]),
        labelled("Pay Periods", result.withholding.pay_periods.to_string()),
        labelled("Per Paycheck", format_currency(result.withholding.per_paycheck)),
        labelled("Monthly", format_currency(result.withholding.monthly)),
    ];

    if let (Some(prior), Some(yoy)) = (&input.prior_year, &result.year_over_year) {
        rows.extend([
            Vec::new(),
            row(["Year-over-Year"]),
            labelled("Prior Year Tax", format_currency(prior.total_tax)),
            labelled("Difference", format_currency(yoy.difference)),
            labelled(
                "Change",
                yoy.percentage_change
                    .map(format_percent)
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
        ]);
    }

    rows
}

/// Writes report rows as CSV.
pub fn write_report<W: io::Write>(
    writer: W,
    rows: &[ReportRow],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    for row in rows {
        if row.is_empty() {
            csv_writer.write_record([""])?;
        } else {
            csv_writer.write_record(row)?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Multi-line, human-readable summary of one estimate.
pub fn render_summary(result: &TaxEstimateResult) -> String {
    Summary(result).to_string()
}

struct Summary<'a>(&'a TaxEstimateResult);

impl Summary<'_> {
    fn line(
        f: &mut fmt::Formatter<'_>,
        label: &str,
        value: &str,
    ) -> fmt::Result {
        writeln!(f, "  {label:<24}{value:>14}")
    }
}

impl fmt::Display for Summary<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let result = self.0;

        writeln!(
            f,
            "Tax estimate for {} ({})",
            result.tax_year,
            result.filing_status.label()
        )?;
        Self::line(f, "Gross income", &format_currency(result.gross_income))?;
        let deduction_kind = if result.deductions.used_itemized {
            "Itemized deductions"
        } else {
            "Standard deduction"
        };
        Self::line(f, deduction_kind, &format_currency(result.deductions.effective))?;
        Self::line(f, "Taxable income", &format_currency(result.taxable_income))?;
        writeln!(f)?;

        writeln!(f, "  Federal brackets")?;
        for slice in &result.federal_breakdown {
            writeln!(
                f,
                "    {:>6} of {:>14}{:>14}",
                format_rate(slice.rate),
                format_currency(slice.amount),
                format_currency(slice.tax)
            )?;
        }
        Self::line(f, "Federal tax", &format_currency(result.federal_tax))?;
        Self::line(f, "Marginal rate", &format_rate(result.marginal_rate))?;
        Self::line(
            f,
            "Self-employment tax",
            &format_currency(result.self_employment_tax.total),
        )?;
        Self::line(f, "State tax", &format_currency(result.state_tax))?;
        if !result.credits.is_zero() {
            Self::line(f, "Credits", &format_currency(-result.credits))?;
        }
        Self::line(f, "Total tax", &format_currency(result.total_tax))?;
        Self::line(f, "Effective rate", &format_percent(result.effective_rate))?;
        writeln!(f)?;

        writeln!(
            f,
            "  Withholding: {} per paycheck ({} pay periods), {} per month",
            format_currency(result.withholding.per_paycheck),
            result.withholding.pay_periods,
            format_currency(result.withholding.monthly)
        )?;

        if let Some(yoy) = &result.year_over_year {
            let change = yoy
                .percentage_change
                .map(format_percent)
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                f,
                "  Change from prior year: {} ({})",
                format_currency(yoy.difference),
                change
            )?;
        }

        Ok(())
    }
}

/// One line per estimate for batch output.
pub fn render_batch_line(
    row: usize,
    result: &TaxEstimateResult,
) -> String {
    format!(
        "{row:>4}  {:<4} {:>6}  income {:>14}  total tax {:>12}  effective {:>6}",
        result.filing_status.as_str(),
        result.tax_year,
        format_currency(result.gross_income),
        format_currency(result.total_tax),
        format_percent(result.effective_rate)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{FilingStatus, TaxEngine};

    use super::*;

    fn estimate(input: &TaxEstimateInput) -> TaxEstimateResult {
        TaxEngine::builtin().compute_total_tax(input).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    fn value<'a>(
        rows: &'a [ReportRow],
        label: &str,
    ) -> Option<&'a str> {
        rows.iter()
            .find(|r| r.first().map(String::as_str) == Some(label))
            .and_then(|r| r.get(1))
            .map(String::as_str)
    }

    // =========================================================================
    // report_rows tests
    // =========================================================================

    #[test]
    fn report_rows_single_filer() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single);
        let rows = report_rows(&input, &estimate(&input), date());

        assert_eq!(rows[0], vec!["Tax Estimation Report".to_string()]);
        assert_eq!(value(&rows, "Generated on"), Some("04/15/2024"));
        assert_eq!(value(&rows, "Annual Income"), Some("$50000.00"));
        assert_eq!(value(&rows, "Filing Status"), Some("Single"));
        assert_eq!(value(&rows, "Self-Employment Income"), Some("$0.00"));
        assert_eq!(value(&rows, "Federal Tax"), Some("$4016.00"));
        assert_eq!(value(&rows, "State Tax"), Some("$0.00"));
        assert_eq!(value(&rows, "Total Tax"), Some("$4016.00"));
        assert_eq!(value(&rows, "Effective Tax Rate"), Some("8.0%"));
        assert_eq!(value(&rows, "Per Paycheck"), Some("$154.46"));
        assert_eq!(value(&rows, "Monthly"), Some("$334.67"));
        assert_eq!(value(&rows, "Difference"), None);
    }

    #[test]
    fn report_rows_include_year_over_year() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single)
            .with_prior_year_tax(dec!(5000));
        let rows = report_rows(&input, &estimate(&input), date());

        assert_eq!(value(&rows, "Prior Year Tax"), Some("$5000.00"));
        assert_eq!(value(&rows, "Difference"), Some("-$984.00"));
        assert_eq!(value(&rows, "Change"), Some("-19.7%"));
    }

    #[test]
    fn report_rows_zero_prior_year_has_no_percentage() {
        let input =
            TaxEstimateInput::new(dec!(50000), FilingStatus::Single).with_prior_year_tax(dec!(0));
        let rows = report_rows(&input, &estimate(&input), date());

        assert_eq!(value(&rows, "Change"), Some("n/a"));
    }

    // =========================================================================
    // write_report tests
    // =========================================================================

    #[test]
    fn write_report_produces_readable_csv() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single)
            .with_self_employment_income(dec!(10000));
        let rows = report_rows(&input, &estimate(&input), date());
        let mut buf = Vec::new();

        write_report(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Tax Estimation Report\n"));
        assert!(text.contains("Self-Employment Tax,$1412.96\n"));
        assert!(text.contains("Total Tax,$5428.96\n"));
    }

    // =========================================================================
    // render tests
    // =========================================================================

    #[test]
    fn render_summary_lists_brackets_and_totals() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single);

        let summary = render_summary(&estimate(&input));

        assert!(summary.starts_with("Tax estimate for 2024 (Single)\n"));
        assert!(summary.contains("Standard deduction"));
        assert!(summary.contains("10% of"));
        assert!(summary.contains("12% of"));
        assert!(summary.contains("$4016.00"));
        assert!(summary.contains("8.0%"));
        assert!(summary.contains("$154.46 per paycheck (26 pay periods)"));
        assert!(!summary.contains("prior year"));
    }

    #[test]
    fn render_summary_aligns_label_and_value_columns() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single);

        let summary = render_summary(&estimate(&input));

        let line = summary
            .lines()
            .find(|l| l.trim_start().starts_with("Taxable income"))
            .unwrap();
        assert_eq!(line, format!("  {:<24}{:>14}", "Taxable income", "$35400.00"));
        assert_eq!(line.len(), 40);
    }

    #[test]
    fn render_summary_shows_credits_and_comparison() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single)
            .with_credit("Child", dec!(1000))
            .with_prior_year_tax(dec!(3000));

        let summary = render_summary(&estimate(&input));

        assert!(summary.contains("-$1000.00"));
        assert!(summary.contains("Change from prior year: $16.00"));
    }

    #[test]
    fn render_batch_line_contains_key_figures() {
        let input = TaxEstimateInput::new(dec!(50000), FilingStatus::Single);

        let line = render_batch_line(1, &estimate(&input));

        assert!(line.contains("S"));
        assert!(line.contains("$50000.00"));
        assert!(line.contains("$4016.00"));
        assert!(line.contains("8.0%"));
    }
}
