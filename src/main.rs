use anyhow::{bail, Result};
use dotenvy::dotenv;
use std::env;

mod commands;
mod config;
mod feed;
mod ingestion;
mod init;
mod post;
mod scheduler;
mod store;
mod telemetry;
mod user;
mod util;

use commands::{Ctx, DispatchError};
use config::Config;
use store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // initialize logging/tracing (stderr). Respect RUST_LOG and GATOR_LOG_FORMAT
    telemetry::config::init_tracing();

    let cli = match commands::parse_args(env::args_os()) {
        Ok(cli) => cli,
        Err(DispatchError::Usage(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };
    telemetry::config::set_json_mode(cli.json);

    let mut cfg = Config::read()?;

    let Some(dsn) = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .or_else(|| cfg.db_url.clone())
    else {
        bail!("no database configured: pass --dsn, set DATABASE_URL, or add db_url to {}", cfg.path().display());
    };

    let pool = init::connect(&dsn).await?;
    let store = PgStore::new(pool);

    commands::dispatch(Ctx { store: &store, config: &mut cfg }, cli.command).await?;
    Ok(())
}
