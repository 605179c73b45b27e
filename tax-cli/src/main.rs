use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use tax_cli::logging::{self, LogOptions};
use tax_cli::request::EstimateArgs;
use tax_cli::{csv_loader, report};
use tax_core::{TaxEngine, TaxTableRegistry};
use tax_data::TaxTableLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Progressive income-tax estimator.
///
/// Computes federal bracket tax, self-employment tax, flat state tax and a
/// withholding suggestion from the built-in tax tables, or from a directory
/// of table CSV files.
#[derive(Debug, Parser)]
#[command(name = "tax-estimator", version)]
struct Cli {
    /// Directory holding tax_brackets.csv, standard_deductions.csv,
    /// state_rates.csv and tax_year_config.csv.
    #[arg(long, global = true, value_name = "DIR")]
    tables: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also append log output to this file.
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate a single return.
    Estimate {
        #[command(flatten)]
        args: EstimateArgs,

        /// Write the CSV report to this file.
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Estimate every row of a CSV file.
    Batch {
        /// CSV file of estimate requests.
        file: PathBuf,
    },
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&LogOptions {
        verbose: cli.verbose,
        log_file: cli.log_file.clone(),
    })?;

    let loaded;
    let registry: &TaxTableRegistry = match &cli.tables {
        Some(dir) => {
            loaded = TaxTableLoader::load_dir(dir)
                .with_context(|| format!("Failed to load tax tables from: {}", dir.display()))?;
            &loaded
        }
        None => {
            debug!("using built-in tax tables");
            TaxTableRegistry::builtin()
        }
    };
    let engine = TaxEngine::new(registry);

    match cli.command {
        Command::Estimate { args, export } => run_estimate(&engine, &args, export),
        Command::Batch { file } => run_batch(&engine, &file),
    }
}

fn run_estimate(
    engine: &TaxEngine<'_>,
    args: &EstimateArgs,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = args.to_input()?;
    let result = engine
        .compute_total_tax(&input)
        .context("Failed to compute estimate")?;

    print!("{}", report::render_summary(&result));

    if let Some(path) = export {
        let today = chrono::Local::now().date_naive();
        let rows = report::report_rows(&input, &result, today);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create: {}", path.display()))?;
        report::write_report(file, &rows)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "report exported");
    }

    Ok(())
}

fn run_batch(
    engine: &TaxEngine<'_>,
    file: &Path,
) -> anyhow::Result<()> {
    let inputs = csv_loader::load_from_file(file)
        .with_context(|| format!("Failed to load estimates from: {}", file.display()))?;

    let mut failed = 0usize;
    for (idx, input) in inputs.iter().enumerate() {
        let row = idx + 1;
        match engine.compute_total_tax(input) {
            Ok(result) => println!("{}", report::render_batch_line(row, &result)),
            Err(e) => {
                error!(row, error = %e, "estimate failed");
                failed += 1;
            }
        }
    }

    info!(rows = inputs.len(), failed, "batch complete");

    if failed > 0 {
        bail!("{failed} of {} estimates failed", inputs.len());
    }
    Ok(())
}
