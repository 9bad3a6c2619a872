use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoplist_server::config::Config;
use shoplist_server::database;
use shoplist_server::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoplist_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = database::init_db(&config.data_path).await?;
    tracing::info!(data_path = %config.data_path, "database ready");

    let app = build_router(db, &config.session_secret)?;

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server running on http://{bind_address}");

    axum::serve(listener, app).await?;
    Ok(())
}
