//! Salad Recipes Backend
//!
//! Bootstrap binary: loads configuration, connects to PostgreSQL, applies
//! the schema migrations and checks that the store answers.

use anyhow::Result;
use salad_recipes_backend::{config, db, state::Repositories};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Salad Recipes Backend"
    );

    info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;

    db::run_migrations(&pool).await?;
    db::health_check(&pool).await?;

    let repositories = Repositories::new(pool);
    info!(
        pool_size = repositories.db().size(),
        "Repositories ready"
    );

    repositories.db().close().await;
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "salad_recipes_backend=info,sqlx=warn".into()
        } else {
            "salad_recipes_backend=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
