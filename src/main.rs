use budget_generator::cli;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "budget-generator")]
#[command(about = "Generate a personal budgeting Excel workbook from a JSON spec.")]
#[command(long_about = "Budget Generator - JSON spec to multi-sheet Excel budget workbook

SHEETS:
  Settings          - starting year and late-income toggle
  Dropdown Data     - hidden year/month lists for dropdowns
  Budget Planning   - monthly plan per year, with totals and unallocated row
  Budget Tracking   - transaction table (tblTracking) with running balance
  Calculations      - hidden helper metrics
  Budget Dashboard  - period selectors, KPI tiles and doughnut charts

EXAMPLES:
  budget-generator generate budget_spec.json -o out/budget.xlsx
  budget-generator generate budget_spec.json --validate-only
  budget-generator inspect out/budget.xlsx")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the workbook described by a JSON spec
    Generate {
        /// Path to the JSON workbook spec
        spec: PathBuf,

        /// Output .xlsx path
        #[arg(
            short,
            long,
            env = "BUDGET_GENERATOR_OUTPUT",
            default_value = "budget_workbook.xlsx"
        )]
        output: PathBuf,

        /// Validate the spec without writing a workbook
        #[arg(long)]
        validate_only: bool,
    },

    /// List sheets, defined names and tables of a generated workbook
    Inspect {
        /// Path to the .xlsx file
        workbook: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "budget_generator=debug"
    } else {
        "budget_generator=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            spec,
            output,
            validate_only,
        } => cli::generate(spec, output, validate_only),

        Commands::Inspect { workbook } => cli::inspect(workbook),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
