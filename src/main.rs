use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weather_backend::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes, scheduler, AppState,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before the log filter reads RUST_LOG
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config();

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    info!("database ready");

    let app_state = AppState::new(pool, config)?;

    if let Some(seed) = &config.admin_seed {
        app_state
            .user_service
            .ensure_admin(&seed.email, &seed.password, &seed.name)
            .await?;
    }

    if !app_state.ai_service.is_enabled() {
        info!("INSIGHT_API_KEY not set, insight reports will not include an AI summary");
    }

    if !app_state.collector_service.is_configured() {
        info!("collector location not set, POST /weather/collect is disabled");
    }

    // kept alive for the lifetime of the server
    let _scheduler = scheduler::start(&app_state, config).await?;

    let app = routes::app(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
