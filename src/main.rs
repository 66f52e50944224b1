//! bg-remover - background removal over HTTP.
//!
//! This binary starts the HTTP server, or runs a one-off removal on a local
//! file with the `remove` subcommand.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bg_remover::{
    config::{Cli, Command, RemoveConfig, ServeConfig},
    create_router,
    extract::{ForegroundExtractor, NativeExtractor},
    removal::RemovalService,
    RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Remove(config) => run_remove(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let options = config.extract.to_options();

    info!("bg-remover v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Extractor: native ({} preset)", config.extract.quality);
    info!(
        "  Iterations: {}, edge mode: {}, margin: {}",
        options.iterations,
        options.edge_mode,
        options
            .margin
            .map(|m| format!("{}px", m))
            .unwrap_or_else(|| "auto".to_string())
    );
    info!("  Max body size: {} bytes", config.max_body_size);

    if config.api_key_or_empty().is_empty() {
        warn!("  Auth: NO API KEY CONFIGURED - every /removebg request will be rejected");
        warn!("        Set one with --api-key=<key> or BG_API_KEY");
    } else {
        info!("  Auth: X-Api-Key required");
    }

    let service = RemovalService::new(NativeExtractor::new(options));
    let router = create_router(service, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Resolve when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so `remove -o -` can stream the PNG on stdout.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bg_remover=debug,tower_http=debug"
    } else {
        "bg_remover=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new(config.api_key_or_empty())
        .with_max_body_size(config.max_body_size)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Remove Command
// =============================================================================

fn run_remove(config: RemoveConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let input = match read_input(&config) {
        Ok(bytes) if bytes.is_empty() => {
            eprintln!("Error: no image data received");
            return ExitCode::FAILURE;
        }
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: could not read {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let extractor = NativeExtractor::new(config.extract.to_options());
    info!(
        input_bytes = input.len(),
        quality = %config.extract.quality,
        "Removing background"
    );

    let png = match extractor.extract(&input) {
        Ok(png) => png,
        Err(e) => {
            eprintln!("Error: could not identify foreground: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(&config, &png) {
        eprintln!("Error: could not write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    if !config.writes_stdout() {
        println!("Background removed -> {}", config.output.display());
    }

    ExitCode::SUCCESS
}

fn read_input(config: &RemoveConfig) -> io::Result<Vec<u8>> {
    if config.reads_stdin() {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read(&config.input)
    }
}

fn write_output(config: &RemoveConfig, png: &[u8]) -> io::Result<()> {
    if config.writes_stdout() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(png)?;
        stdout.flush()
    } else {
        fs::write(&config.output, png)
    }
}
