use anyhow::{bail, Context, Result};
use clap::Args;

use crate::config::Config;
use crate::store::{PgStore, StoreError};
use crate::telemetry::{self};
use crate::telemetry::ops::user::Phase as UserPhase;

pub mod db;
pub mod types;

/// gator register|login <name>
#[derive(Args, Debug, Clone, PartialEq)]
pub struct NameArgs {
    pub name: String,
}

pub async fn register(store: &PgStore, cfg: &mut Config, args: NameArgs) -> Result<()> {
    let log = telemetry::user();
    let _g = log.root_span_kv([("name", args.name.clone())]).entered();
    let _s = log.span(&UserPhase::Register).entered();

    let user = match db::create_user(store.pool(), &args.name).await {
        Ok(user) => user,
        Err(StoreError::Duplicate(_)) => bail!("user {} already exists", args.name),
        Err(e) => return Err(e).context("creating user"),
    };
    cfg.set_user(&user.name)?;
    log.info(format!("👤 User created: {}", user.name));

    if telemetry::config::json_mode() {
        log.result(&user)?;
    } else {
        println!("User {} registered and logged in", user.name);
    }
    Ok(())
}

pub async fn login(store: &PgStore, cfg: &mut Config, args: NameArgs) -> Result<()> {
    let log = telemetry::user();
    let _g = log.root_span_kv([("name", args.name.clone())]).entered();
    let _s = log.span(&UserPhase::Login).entered();

    let user = match db::get_user(store.pool(), &args.name).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => bail!("user {} does not exist; register first", args.name),
        Err(e) => return Err(e.into()),
    };
    cfg.set_user(&user.name)?;

    if telemetry::config::json_mode() {
        log.result(&user)?;
    } else {
        println!("User has been set to {}", user.name);
    }
    Ok(())
}

pub async fn reset(store: &PgStore) -> Result<()> {
    let log = telemetry::user();
    let _g = log.root_span().entered();
    let _s = log.span(&UserPhase::Reset).entered();

    let users_deleted = db::delete_all_users(store.pool()).await?;
    log.info(format!("🧹 Reset: deleted {} user(s) and everything they owned", users_deleted));
    log.result(&types::ResetResult { users_deleted })
}

pub async fn list(store: &PgStore, cfg: &Config) -> Result<()> {
    let log = telemetry::user();
    let _g = log.root_span().entered();
    let _s = log.span(&UserPhase::List).entered();

    let users = db::list_users(store.pool()).await?;
    let entries: Vec<types::UserEntry> = users
        .into_iter()
        .map(|u| types::UserEntry { current: cfg.current_user() == Some(u.name.as_str()), name: u.name })
        .collect();

    if telemetry::config::json_mode() {
        return log.result(&types::UserList { users: entries });
    }
    for u in &entries {
        if u.current { println!("* {} (current)", u.name); } else { println!("* {}", u.name); }
    }
    Ok(())
}
