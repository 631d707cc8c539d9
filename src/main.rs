//! SurveyFlow - survey authoring client and edge proxy
//!
#![doc = "SurveyFlow - survey authoring client and edge proxy"]
#![doc = "Main entry point for the SurveyFlow command-line application."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use surveyflow::cli::{Cli, Commands};
use surveyflow::commands;
use surveyflow::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { listen, timeout } => {
            tracing::info!("Starting edge proxy");
            commands::serve::run_serve(config, listen, timeout).await?;
            Ok(())
        }
        Commands::Login {
            credentials,
            register,
            confirm,
        } => {
            tracing::info!(register, "Starting sign-in");
            commands::login::run_login(&config, &credentials, register, confirm).await?;
            Ok(())
        }
        Commands::Dashboard { credentials, json } => {
            tracing::info!("Loading dashboard");
            commands::dashboard::run_dashboard(&config, &credentials, json).await?;
            Ok(())
        }
        Commands::Surveys {
            credentials,
            command,
        } => {
            tracing::debug!("Starting survey command");
            commands::surveys::handle_surveys(&config, &credentials, command).await?;
            Ok(())
        }
        Commands::Theme { command } => {
            commands::theme::handle_theme(&config, command)?;
            Ok(())
        }
        Commands::Validate {
            email,
            password,
            confirm,
        } => {
            commands::login::run_validate(&email, &password, confirm.as_deref())?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the defaults; `--verbose` lowers the default level
/// to debug and `--json-logs` switches the output to JSON lines.
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_directive = if verbose {
        "surveyflow=debug"
    } else {
        "surveyflow=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
