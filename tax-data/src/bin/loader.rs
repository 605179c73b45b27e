use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::FilingStatus;
use tax_data::TaxTableLoader;

/// Check a directory of tax table CSV files and print what it contains.
///
/// The directory must hold:
/// - tax_brackets.csv: tax_year,schedule,min_income,max_income,base_tax,rate
/// - standard_deductions.csv: tax_year,filing_status,amount
/// - state_rates.csv: tax_year,state,name,rate
/// - tax_year_config.csv: tax_year,social_security_rate,medicare_rate,net_earnings_factor
#[derive(Parser, Debug)]
#[command(name = "tax-table-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the tax table CSV files
    #[arg(short, long)]
    dir: PathBuf,

    /// Only summarize this tax year
    #[arg(short, long)]
    year: Option<i32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Loading tax tables from: {}", args.dir.display());

    let registry = TaxTableLoader::load_dir(&args.dir)
        .with_context(|| format!("Failed to load tax tables from: {}", args.dir.display()))?;

    let years: Vec<i32> = match args.year {
        Some(year) if registry.get(year).is_none() => {
            bail!("Tax year {year} not found in {}", args.dir.display())
        }
        Some(year) => vec![year],
        None => registry.years(),
    };

    for year in years {
        let Some(tables) = registry.get(year) else {
            continue;
        };

        println!();
        println!("Tax year {year}");
        for status in FilingStatus::ALL {
            let brackets = tables.bracket_table(status);
            println!(
                "  {:<26} standard deduction {:>8}  brackets {}  top rate {}",
                status.label(),
                tables.standard_deduction(status),
                brackets.brackets().len(),
                brackets.top_rate(),
            );
        }

        let se = tables.self_employment();
        println!(
            "  Self-employment: social security {}, medicare {}, net earnings factor {}",
            se.social_security_rate, se.medicare_rate, se.net_earnings_factor
        );

        let states: Vec<String> = tables
            .state_rates()
            .iter()
            .map(|(code, info)| format!("{code} {}", info.rate))
            .collect();
        println!("  States: {}", states.join(", "));
    }

    println!();
    println!(
        "Successfully validated tax tables for {} year(s).",
        registry.years().len()
    );

    Ok(())
}
