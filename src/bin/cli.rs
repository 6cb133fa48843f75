//! geoprobe CLI
//!
//! Checks a website from up to ten countries and prints results as each
//! group completes.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use geoprobe::{
    config,
    error::Result,
    models::{Country, CountrySelection, StrategyKind},
    pipeline::{self, CancelToken, Submission},
    utils::{TokioClock, log as console},
};

/// geoprobe - Website Accessibility Checker
#[derive(Parser, Debug)]
#[command(
    name = "geoprobe",
    version,
    about = "Check website accessibility from different countries"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test a URL from the selected countries
    Test {
        /// URL or bare domain to test (e.g. "example" or "https://example.com")
        url: String,

        /// Country codes, comma separated (at most 10)
        #[arg(short = 'C', long, value_delimiter = ',', required = true)]
        countries: Vec<String>,

        /// Fetch through the relay instead of simulating
        #[arg(long)]
        live: bool,

        /// Seed the simulation for repeatable results
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final result set as JSON
        #[arg(long)]
        json: bool,
    },

    /// List selectable countries
    Countries,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Cancel the run on Ctrl-C; groups already printed stay valid.
fn cancel_on_ctrl_c() -> CancelToken {
    let token = CancelToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing current group");
            handle.cancel();
        }
    });
    token
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = config::config_path(cli.config.as_deref());

    match cli.command {
        Command::Test {
            url,
            countries,
            live,
            seed,
            json,
        } => {
            let mut config = config::load_config(&config_path);
            if live {
                config.strategy = StrategyKind::Live;
            }
            if seed.is_some() {
                config.simulation.seed = seed;
            }
            console::set_quiet(json);

            let selection = CountrySelection::from_codes(&countries, config.dispatch.max_targets)?;
            let submission = Submission::new(url, selection.into_countries());

            let cancel = cancel_on_ctrl_c();
            let set =
                pipeline::run_check(&config, Arc::new(TokioClock), &submission, &cancel).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&set)?);
            }
        }

        Command::Countries => {
            for country in Country::all() {
                println!(
                    "{} {}  {:<15} ({:>8.4}, {:>9.4})",
                    country.flag, country.code, country.name, country.lat, country.lng
                );
            }
        }

        Command::Validate => {
            log::info!("Validating {}", config_path.display());
            let config = config::load_config_strict(&config_path)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            console::success(&format!("Config OK ({})", config_path.display()));
        }
    }

    Ok(())
}
