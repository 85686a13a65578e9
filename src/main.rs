// ABOUTME: Entry point for the compose-adapter server.
// ABOUTME: Loads configuration, connects to the engine, registers and serves until signalled.

mod cli;

use clap::Parser;
use cli::Cli;
use compose_adapter::config::AdapterConfig;
use compose_adapter::error::Result;
use compose_adapter::group::ResourceGroupFacade;
use compose_adapter::registration::AdapterRegistration;
use compose_adapter::runtime::{BollardRuntime, RuntimeError, RuntimeInfo, detect_local};
use compose_adapter::server;
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    let detected = detect_local(&config.runtime).map_err(RuntimeError::from)?;
    tracing::info!(
        runtime = %detected.runtime_type,
        socket = %detected.socket_path,
        "using container engine"
    );
    let runtime = BollardRuntime::connect(&detected).map_err(RuntimeError::from)?;
    match runtime.info().await {
        Ok(engine) => tracing::info!(
            engine = %engine.name,
            version = %engine.version,
            api = %engine.api_version,
            os = %engine.os,
            arch = %engine.arch,
            "container engine ready"
        ),
        // Requests report the engine as unavailable until it answers.
        Err(e) => tracing::warn!(error = %e, "container engine not answering yet"),
    }

    let facade = Arc::new(ResourceGroupFacade::new(
        Arc::new(runtime),
        &config.root,
        config.stop_timeout,
    ));
    tracing::info!(packages = %facade.store().packages_dir().display(), "project store ready");

    let registration = match &config.registration {
        Some(settings) => Some(AdapterRegistration::register(settings, config.listen.port()).await?),
        None => None,
    };

    let served = server::serve(
        config.listen,
        facade,
        config.workers,
        server::shutdown_signal(),
    )
    .await;

    if let Some(registration) = registration
        && let Err(e) = registration.close().await
    {
        tracing::warn!(error = %e, "failed to de-register adapter");
    }

    served?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AdapterConfig> {
    let mut config = match &cli.config {
        Some(path) => AdapterConfig::load(path)?,
        None => AdapterConfig::discover(&env::current_dir()?)?,
    };

    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(values) = &cli.register_adapter {
        config.register_with(values);
    }

    config.validate()?;
    Ok(config)
}
