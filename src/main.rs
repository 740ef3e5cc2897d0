use clap::Parser;
use paylike_gateway::cli::{self, Cli, Commands};
use paylike_gateway::config::Config;
use paylike_gateway::{create_app, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Config => cli::handle_config_validate(&config),
        Commands::Sign { total, order_id } => cli::handle_sign(&config, &total, &order_id),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(&config)?;

    let gateway = state.gateway.config();
    tracing::info!(
        testmode = gateway.testmode,
        capture_mode = %gateway.capture_mode,
        api_url = %gateway.api_url,
        "Paylike gateway configured"
    );

    if !config.gateway.enabled {
        tracing::warn!("PAYLIKE_ENABLED is off, checkout will not offer the gateway");
    }

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
