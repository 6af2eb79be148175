use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::store::PgStore;
use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

pub async fn connect(dsn: &str) -> Result<PgPool> {
    let log = telemetry::init();
    let _s = log.span(&InitPhase::Connect).entered();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(dsn)
        .await
        .context("connecting to database")?;
    Ok(pool)
}

/// Apply any pending migrations (idempotent).
pub async fn migrate(store: &PgStore) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span().entered();
    let _s = log.span(&InitPhase::Migrate).entered();
    sqlx::migrate!().run(store.pool()).await.context("running migrations")?;
    log.info("✅ Database initialized");
    Ok(())
}
