//! Kairos CLI: the command-line front end of the Kairos timing engine.
//!
//! Provides `kairos budget` to annotate every connection of a placed design
//! with a timing budget, and `kairos analyze` to report the critical path,
//! estimated Fmax and slack histogram.

#![warn(missing_docs)]

mod analyze;
mod budget;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Kairos: timing budgets and path analysis for placed FPGA designs.
#[derive(Parser, Debug)]
#[command(name = "kairos", version, about = "Kairos Timing Engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log the budget of every connection.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kairos.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assign timing budgets to every connection of a design.
    Budget(BudgetArgs),
    /// Report the critical path, estimated Fmax and slack histogram.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `kairos budget` subcommand.
#[derive(Parser, Debug)]
pub struct BudgetArgs {
    /// Design file (JSON).
    pub design: String,

    /// Target clock frequency (e.g. "100MHz"); overrides the configuration.
    #[arg(long)]
    pub freq: Option<String>,

    /// Write per-connection budgets to this JSON file.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Retarget the clock to the achieved frequency after each round.
    #[arg(long)]
    pub auto_freq: bool,

    /// Number of slack redistribution rounds; overrides the configuration.
    #[arg(long)]
    pub iterations: Option<u32>,
}

/// Arguments for the `kairos analyze` subcommand.
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Design file (JSON).
    pub design: String,

    /// Target clock frequency (e.g. "100MHz"); overrides the configuration.
    #[arg(long)]
    pub freq: Option<String>,

    /// Print the endpoint slack histogram.
    #[arg(long)]
    pub histogram: bool,

    /// Print the critical path.
    #[arg(long)]
    pub path: bool,

    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print per-connection budgets.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Budget(ref args) => budget::run(args, &global),
        Command::Analyze(ref args) => analyze::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
