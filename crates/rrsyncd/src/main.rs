// # rrsyncd - record synchronizer daemon
//
// Thin integration layer: all sync logic lives in rrsync-core.
//
// The daemon is responsible for:
// 1. Reading configuration from flags, environment variables or a TOML file
// 2. Initializing logging and the runtime
// 3. Registering address sources and providers
// 4. Running the sync engine until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// export RRSYNC_ACCESS_KEY_ID=LTAI...
// export RRSYNC_ACCESS_KEY_SECRET=...
//
// rrsyncd --zone example.com --records @,www
// ```

mod cli;

use anyhow::Result;
use clap::Parser;
use rrsync_core::{Registry, SyncConfig, SyncEngine};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::Args;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RrsyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<RrsyncExitCode> for ExitCode {
    fn from(code: RrsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Registry with every built-in address source and provider
fn registry() -> Registry {
    let mut registry = Registry::new();
    rrsync_ip_http::register(&mut registry);
    rrsync_ip_resolve::register(&mut registry);
    rrsync_provider_alidns::register(&mut registry);
    rrsync_provider_cloudflare::register(&mut registry);
    registry
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RrsyncExitCode::ConfigError.into();
    }

    let config = match args.sync_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return RrsyncExitCode::ConfigError.into();
        }
    };

    info!("Starting rrsyncd {}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RrsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the engine and run it until a shutdown signal arrives
async fn run_daemon(config: SyncConfig) -> RrsyncExitCode {
    let registry = registry();

    let engine = match build_engine(&registry, config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return RrsyncExitCode::ConfigError;
        }
    };

    match engine.run_until(shutdown_signal()).await {
        Ok(()) => {
            info!("Shutting down rrsyncd");
            RrsyncExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            RrsyncExitCode::RuntimeError
        }
    }
}

/// Instantiate the collaborators named by `config` and wire up the engine
fn build_engine(registry: &Registry, config: SyncConfig) -> Result<SyncEngine> {
    info!("Address source: {}", config.source.type_name());
    info!("Provider: {}", config.provider.type_name());
    for record in &config.records {
        info!("Managing record: {} in {}", record, config.zone);
    }

    let source = registry.create_address_source(&config.source)?;
    let provider = registry.create_provider(&config.provider)?;
    let (engine, mut events) = SyncEngine::new(source, provider, config)?;

    // The engine already logs every step; events only feed debug output here.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "engine event");
        }
    });

    Ok(engine)
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to set up SIGTERM handler: {}", e);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = wait_for_ctrl_c() => {}
    }
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT"),
        Err(e) => {
            error!("Failed to wait for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
