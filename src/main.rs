//! Job market dashboard - terminal front-end and headless commands
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, unknown page, failed export)

mod cli;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use cli::{Cli, Command, ControlArgs};
use job_market_dashboard::config::DEFAULT_CONFIG_FILE;
use job_market_dashboard::{
    export_csv, render_page, sample_records, Config, ControlOverrides, Page, Record, VERSION,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command();

    // Handle init-config early (no logging needed)
    if let Command::InitConfig { force } = command {
        return handle_init_config(cli.config.as_deref(), force);
    }

    let config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_logging(log_directive(&cli, &config, command == Command::Tui));

    info!("Job market dashboard v{}", VERSION);
    debug!("Arguments: {:?}", cli);

    let records = sample_records();

    match command {
        Command::Tui => run_ui_mode(records, &config),
        Command::Pages => {
            list_pages();
            Ok(())
        }
        Command::Show { page, controls, json } => show_page(&records, &config, &page, &controls, json),
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            run_export(&records, &path)
        }
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Level filter: `--verbose` wins, the terminal UI stays quiet, otherwise the config decides.
///
/// `RUST_LOG` still overrides whatever is returned here.
fn log_directive(cli: &Cli, config: &Config, interactive: bool) -> String {
    if cli.verbose {
        "debug".to_string()
    } else if interactive {
        // Log lines on stderr would tear through the alternate screen
        "warn".to_string()
    } else {
        config.general.log_level.clone()
    }
}

/// Initialize logging on stderr so stdout stays clean for page and CSV output.
fn init_logging(directive: String) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

/// Handle init-config: write the commented default config.
fn handle_init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Remove it, edit it manually, or pass --force.",
            path.display()
        );
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    Ok(())
}

fn list_pages() {
    for (i, page) in Page::ALL.iter().enumerate() {
        println!("{:>2}. {:<24} {}", i + 1, page.slug(), page.title());
    }
}

fn show_page(
    records: &[Record],
    config: &Config,
    name: &str,
    controls: &ControlArgs,
    json: bool,
) -> Result<()> {
    let page = Page::from_slug(name)?;

    let mut ctx = config.page_context(records);
    ControlOverrides::from(controls).apply(&mut ctx, records);
    debug!(page = page.slug(), thresholds = ?ctx.thresholds, "showing page");

    let view = render_page(page, records, &ctx);
    if json {
        let body = serde_json::to_string_pretty(&view).context("Failed to serialize page")?;
        println!("{}", body);
    } else {
        print!("{}", view);
    }
    Ok(())
}

fn run_export(records: &[Record], path: &Path) -> Result<()> {
    let rows = export_csv(path, records)
        .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
    info!("Exported {} rows to {}", rows, path.display());
    println!("✓ Wrote {} rows to {}", rows, path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(records: Vec<Record>, config: &Config) -> Result<()> {
    info!("Starting terminal UI with {} rows", records.len());

    let mut app = ui::App::new(records, config);
    ui::run_ui(&mut app)?;

    info!("Terminal UI closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_records: Vec<Record>, _config: &Config) -> Result<()> {
    anyhow::bail!(
        "TUI mode not available. Rebuild with `--features tui`, \
         or use the web UI: cargo run --bin dashboard-server --features server"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use job_market_dashboard::parse_csv;

    #[test]
    fn test_log_directive() {
        let config = Config::default();
        let quiet = Cli::try_parse_from(["job-market-dashboard", "pages"]).unwrap();
        let verbose = Cli::try_parse_from(["job-market-dashboard", "-v", "pages"]).unwrap();

        assert_eq!(log_directive(&quiet, &config, false), "info");
        assert_eq!(log_directive(&quiet, &config, true), "warn");
        assert_eq!(log_directive(&verbose, &config, true), "debug");
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");

        handle_init_config(Some(&path), false).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        assert!(handle_init_config(Some(&path), false).is_err());
        assert!(handle_init_config(Some(&path), true).is_ok());
    }

    #[test]
    fn test_export_command_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        let records = sample_records();

        run_export(&records, &path).unwrap();
        let parsed = parse_csv(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_show_unknown_page_fails() {
        let records = sample_records();
        let err = show_page(&records, &Config::default(), "nowhere", &ControlArgs::default(), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown page: nowhere");
    }

    #[test]
    fn test_show_accepts_titles() {
        let records = sample_records();
        assert!(show_page(&records, &Config::default(), "Data View", &ControlArgs::default(), true).is_ok());
    }
}
