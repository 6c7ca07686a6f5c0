// FitFlag entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Build the shared flag client
// 4. Build services and routes
// 5. Serve until Ctrl+C

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use fitflag_core::config;
use fitflag_core::flags::{FlagClient, FlagEvaluator};
use fitflag_core::random::{RandomSource, ThreadRandom};
use fitflag_server::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("FitFlag starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: flagd at {}:{} (tls={}, enabled={})",
        config.flagd.host, config.flagd.port, config.flagd.tls, config.flagd.enabled
    );

    // 3. One flag client for the whole process
    let flag_client =
        FlagClient::from_config(&config.flagd).context("failed to build flag client")?;
    match &flag_client {
        FlagClient::Flagd(client) => info!("Flag client connected to {}", client.base_url()),
        FlagClient::Disabled => info!("Flag client disabled; all flags use their defaults"),
    }
    let evaluator: Arc<dyn FlagEvaluator> = Arc::new(flag_client);
    let random: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    // 4. Services and routes
    let state = Arc::new(AppState::from_config(&config, evaluator, random));
    for (name, dispatcher) in [
        ("steps", state.steps.dispatcher()),
        ("calories", state.calories.dispatcher()),
    ] {
        info!(
            "{name} algorithm flag `{}` (default `{}`)",
            dispatcher.flag_key(),
            dispatcher.default_variant()
        );
    }
    let addr = config.server.socket_addr()?;

    // 5. Serve
    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {bound}");
    info!("Steps API: http://{bound}/api/steps/daily");
    info!("Calories API: http://{bound}/api/calories/daily");

    server.await;

    info!("FitFlag shut down cleanly");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, waits forever so
/// the server keeps running.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fitflag_server=info,fitflag_core=info,warn")),
        )
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
