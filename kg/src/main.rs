use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, debug, info};

use kubegen::cli::Cli;
use kubegen::config::Config;
use kubegen::{ExpandOptions, Expander};

fn parse_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            LevelFilter::Info
        }
    }
}

// Priority: --log-level > config file > RUST_LOG > WARN
fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = cli_log_level.or(config_log_level) {
        builder.filter_level(parse_level(level));
    }
    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    debug!(
        "kubegen starting: count={} jobs={:?} config={:?}",
        cli.count, cli.jobs, cli.config
    );

    let options = ExpandOptions {
        jobs: cli.jobs.unwrap_or(config.jobs),
    };
    let expander = Expander::with_options(".", options);
    let report = expander
        .run(cli.passes())
        .context(format!("Failed to expand {}", expander.template_path().display()))?;

    if !cli.quiet {
        for path in &report.written {
            println!("{} {}", "✓".green(), path.display());
        }
    }
    println!(
        "Generated {} manifest(s) from {}",
        report.written.len().to_string().cyan(),
        kubegen::TEMPLATE_PATH
    );
    info!("kubegen finished");

    Ok(())
}
