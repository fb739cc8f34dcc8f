use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp_truthlens::{
    analysis::{DegradationController, HeuristicScorer},
    cli::{execute_analyze, execute_recent, Cli, Commands},
    config::{Config, LogFormat},
    provider,
    server::{AppState, McpServer},
    storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = config.provider.name(),
        "TruthLens starting..."
    );

    // Initialize storage
    let store = match storage::open(&config.database).await {
        Ok(s) => {
            info!(
                backend = ?config.database.backend,
                path = %config.database.path.display(),
                "Storage initialized"
            );
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize storage");
            return Err(e.into());
        }
    };

    // Initialize analysis provider
    let provider = match provider::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to initialize analysis provider");
            return Err(e.into());
        }
    };

    let command = cli.command.unwrap_or(Commands::Serve);

    // Missing pipes only cost the remote tiers; analysis still degrades locally
    if command == Commands::Serve {
        info!("Preparing analysis provider...");
        if let Err(e) = provider.prepare().await {
            warn!(error = %e, "Provider setup failed, remote tiers may be unavailable");
        }
    }

    let controller =
        DegradationController::new(provider, HeuristicScorer::new(), config.analysis.clone());
    let state = Arc::new(AppState::new(config, store, controller));

    match command {
        Commands::Serve => {
            let server = McpServer::new(state);

            info!("Server ready, waiting for requests on stdin...");

            if let Err(e) = server.run().await {
                error!(error = %e, "Server error");
                return Err(e.into());
            }

            info!("Server shutdown complete");
        }
        Commands::Analyze { text, language } => {
            let result = execute_analyze(&state, &text, &language).await;
            finish(result.exit_code, &result.message);
        }
        Commands::Recent { limit } => {
            let result = execute_recent(&state, limit).await;
            finish(result.exit_code, &result.message);
        }
    }

    Ok(())
}

fn finish(exit_code: i32, message: &str) {
    if exit_code == 0 {
        println!("{}", message);
    } else {
        eprintln!("{}", message);
        std::process::exit(exit_code);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
