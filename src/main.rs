use anyhow::Context;
use devtel::{
    api::routes::{chat_router, workflow_router},
    cli::{self, output::Output, Cli, Commands},
    AppState, Settings,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let output = cli.output();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    };

    init_tracing(&settings, cli.verbose);
    let state = AppState::new(settings.clone()).context("Failed to initialize application state")?;

    match cli.command() {
        Commands::Chat { port } => {
            let addr = bind_addr(&settings.host, port.unwrap_or(settings.chat_port))?;
            serve(&output, "chat orchestrator", addr, chat_router(state)).await
        }
        Commands::Workflows { port } => {
            let addr = bind_addr(&settings.host, port.unwrap_or(settings.workflow_port))?;
            serve(&output, "workflow service", addr, workflow_router(state)).await
        }
        Commands::Providers => {
            let manager = &state.provider_manager;
            let (active, statuses) = tokio::join!(manager.active_provider(), manager.statuses());
            let active = active.map(|p| p.kind().id());
            cli::print_providers(&output, &statuses, active);
            Ok(())
        }
        Commands::Agents => {
            cli::print_agents(&output);
            Ok(())
        }
    }
}

fn init_tracing(settings: &Settings, verbose: bool) {
    let default_level = if verbose { "debug" } else { settings.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("devtel={0},devtel_server={0},tower_http={0}", default_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))
}

async fn serve(output: &Output, service: &str, addr: SocketAddr, app: axum::Router) -> anyhow::Result<()> {
    output.banner(&format!("{} on http://{}", service, addr));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, service, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    output.info("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
