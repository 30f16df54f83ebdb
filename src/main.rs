use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exampilot::api::router;
use exampilot::auth::StaffCredentials;
use exampilot::remote::{HttpRemoteStore, NoopRemoteStore, RemoteConfig, RemoteFolderStore};
use exampilot::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "exampilot=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://exampilot.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let remote: Arc<dyn RemoteFolderStore> = match RemoteConfig::from_env() {
        Some(config) => {
            info!("remote folder store at {}", config.base_url);
            Arc::new(HttpRemoteStore::new(config)?)
        }
        None => {
            info!("no remote folder store configured, folders persist locally only");
            Arc::new(NoopRemoteStore)
        }
    };

    let state = AppState {
        db: pool.clone(),
        remote,
        credentials: StaffCredentials::from_env(),
    };

    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
