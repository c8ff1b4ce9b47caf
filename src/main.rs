mod api;
mod config;
mod consts;
mod environment;
mod events;
mod logging;
mod metrics;
mod pretty;
mod queries;
mod session;
mod widget;

use crate::config::{Config, get_config_path};
use crate::consts::cli_consts::watch::DEFAULT_POLL_INTERVAL_MS;
use crate::environment::Environment;
use crate::pretty::{print_cmd_error, print_cmd_info};
use crate::session::{WidgetArgs, run_fetch, run_watch, setup_session};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::Path;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Fetch dashboard widget data from the metrics API
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a widget once and print its series
    Fetch {
        #[command(flatten)]
        widget: WidgetArgs,
    },
    /// Keep a widget live, refetching whenever its file changes
    Watch {
        #[command(flatten)]
        widget: WidgetArgs,

        /// How often to re-read the widget file, in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        poll_ms: u64,
    },
    /// Save the default organization and API location
    Configure {
        /// Organization slug
        #[arg(long, value_name = "SLUG")]
        organization: String,

        /// API environment: local or production
        #[arg(long, value_name = "ENV")]
        api_environment: Option<String>,

        /// API root of a self-hosted install
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Remove the saved configuration
    ClearConfig,
}

fn load_config(config_path: &Path) -> Config {
    if !config_path.exists() {
        return Config::default();
    }
    match Config::load_from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
            Config::default()
        }
    }
}

/// `METRICS_API_ENVIRONMENT` wins over the configured environment.
fn resolve_environment(config: &Config) -> Environment {
    std::env::var("METRICS_API_ENVIRONMENT")
        .ok()
        .and_then(|s| s.parse::<Environment>().ok())
        .or_else(|| config.environment())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config_path = get_config_path()?;
    let args = Args::parse();
    match args.command {
        Command::Fetch { widget } => {
            let config = load_config(&config_path);
            let environment = resolve_environment(&config);
            let session = setup_session(widget, &config, environment)?;
            run_fetch(session).await.map_err(|e| {
                print_cmd_error!("Fetch failed", "{}", e);
                Box::<dyn Error>::from(e)
            })
        }
        Command::Watch { widget, poll_ms } => {
            let config = load_config(&config_path);
            let environment = resolve_environment(&config);
            let session = setup_session(widget, &config, environment)?;
            run_watch(session, Duration::from_millis(poll_ms.max(1)))
                .await
                .map_err(Into::into)
        }
        Command::Configure {
            organization,
            api_environment,
            api_url,
        } => {
            let environment = match api_environment {
                Some(name) => name
                    .parse::<Environment>()
                    .map_err(|_| format!("Unknown API environment: {}", name))?,
                None => Environment::default(),
            };
            let config = Config::new(organization, environment, api_url);
            config
                .save(&config_path)
                .map_err(|e| format!("Failed to save config: {}", e))?;
            print_cmd_info!(
                "Configuration saved",
                "Organization {} on {} ({})",
                config.organization,
                config.environment,
                config_path.display()
            );
            Ok(())
        }
        Command::ClearConfig => {
            println!("Clearing configuration file...");
            Config::clear(&config_path).map_err(Into::into)
        }
    }
}
