//! Command-line interface argument parsing.

use clap::{Parser, Subcommand};
use job_market_dashboard::ControlOverrides;
use std::path::PathBuf;

/// Job market analytics dashboard
///
/// Browse the dashboard pages in the terminal, print single pages, or
/// export the dataset as CSV. The web front-end lives in `dashboard-server`.
///
/// Examples:
///   job-market-dashboard
///   job-market-dashboard show filters --min-experience 2 --min-demand 70
///   job-market-dashboard show forecasting --json
///   job-market-dashboard export --output jobs.csv
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    ///
    /// If not specified, looks for dashboard.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive terminal dashboard (default)
    Tui,

    /// List the pages in sidebar order
    Pages,

    /// Render one page to stdout
    Show {
        /// Page slug or title, e.g. `filters` or "Data View"
        page: String,

        #[command(flatten)]
        controls: ControlArgs,

        /// Print the page as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write the full dataset as CSV
    Export {
        /// Output file (defaults to the configured export file name)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write a commented default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Slider positions for `show`
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ControlArgs {
    /// Minimum experience in years
    #[arg(long, value_name = "YEARS")]
    pub min_experience: Option<u32>,

    /// Minimum median salary in CNY
    #[arg(long, value_name = "CNY")]
    pub min_salary: Option<f64>,

    /// Minimum demand index
    #[arg(long, value_name = "INDEX")]
    pub min_demand: Option<f64>,

    /// Rows shown on the Data View page
    #[arg(long, value_name = "COUNT")]
    pub rows: Option<usize>,
}

impl From<&ControlArgs> for ControlOverrides {
    fn from(args: &ControlArgs) -> Self {
        Self {
            min_experience: args.min_experience,
            min_salary: args.min_salary,
            min_demand: args.min_demand,
            rows: args.rows,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to run; no subcommand opens the terminal dashboard
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }
}
