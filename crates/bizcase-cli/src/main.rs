mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::calculate::CalculateArgs;
use commands::quote::{OptimizeQuoteArgs, QuoteArgs, ValidateQuoteArgs};
use commands::scenarios::ScenariosArgs;
use commands::sensitivity::{GridArgs, SensitivityArgs};

/// Five-year business case projections for manufactured products
#[derive(Parser)]
#[command(
    name = "bizcase",
    version,
    about = "Five-year business case projections for manufactured products",
    long_about = "Projects volumes, prices, P&L, free cash flow, NPV/IRR, payback and RoCE \
                  for multi-SKU business cases with decimal precision. Supports \
                  sensitivity sweeps, what-if scenarios and customer quotes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full projection for a business case
    Calculate(CalculateArgs),
    /// Perturb variables or field paths and compare NPV/IRR/PAT
    Sensitivity(SensitivityArgs),
    /// Two-way sensitivity table over two swept targets
    Grid(GridArgs),
    /// Run named what-if scenarios against the base case
    Scenarios(ScenariosArgs),
    /// Derive a customer quote with GST
    Quote(QuoteArgs),
    /// Check a quote for negative components, quantities and GST rate
    ValidateQuote(ValidateQuoteArgs),
    /// Scale quote components to reach a target NPV or IRR
    OptimizeQuote(OptimizeQuoteArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args, &config),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args, &config),
        Commands::Grid(args) => commands::sensitivity::run_grid(args, &config),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args, &config),
        Commands::Quote(args) => commands::quote::run_quote(args),
        Commands::ValidateQuote(args) => commands::quote::run_validate_quote(args),
        Commands::OptimizeQuote(args) => commands::quote::run_optimize_quote(args, &config),
        Commands::Version => {
            println!("bizcase {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
