use std::sync::Arc;
use residence_backend::{build_rocket, config::AppConfig, queries::PgStore};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting building polls server");

    let config = AppConfig::from_lookup(|key| secret_store.get(key));
    info!(
        "Write attempts per vote: {}, CORS origin prefix: {}",
        config.max_write_attempts, config.allowed_origin
    );

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let rocket = build_rocket(Arc::new(PgStore::new(pool)), config);

    Ok(rocket.into())
}
