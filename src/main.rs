use anyhow::Context;
use tracing_subscriber::EnvFilter;

use atrium_api::config::AppConfig;
use atrium_api::database;
use atrium_api::routes;
use atrium_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium_api=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    database::migrate(&pool).await.context("failed to run migrations")?;

    tokio::fs::create_dir_all(config.uploads.media_dir())
        .await
        .context("failed to create media upload directory")?;
    tokio::fs::create_dir_all(config.uploads.resume_dir())
        .await
        .context("failed to create resume upload directory")?;

    let port = config.http.port;
    let state = AppState::new(pool, config);
    let app = routes::app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("atrium api listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
