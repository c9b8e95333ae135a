use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vitae::{RuntimeHooks, build_runtime_with_hooks};
use vserver::{AppState, Settings, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let mut runtime_config = settings.runtime_config();
    if !settings.profile_path.exists() {
        tracing::warn!(
            phase = "startup",
            event = "profile_missing",
            path = %settings.profile_path.display(),
            "answering without profile data"
        );
        runtime_config.profile_path = None;
    }

    let runtime = build_runtime_with_hooks(&runtime_config, RuntimeHooks::tracing_and_metrics())
        .context("failed to assemble runtime")?;
    tracing::info!(
        phase = "startup",
        event = "runtime_ready",
        provider = %settings.provider.provider_id(),
        purged_conversations = runtime.purged_conversations
    );

    let app = app(&settings, AppState::from(runtime))?;
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(phase = "startup", event = "listening", %addr, "API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(phase = "shutdown", event = "signal_error", error = %error);
        std::future::pending::<()>().await;
    }
    tracing::info!(phase = "shutdown", event = "draining");
}
