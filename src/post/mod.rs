use anyhow::{bail, Result};
use clap::Args;

use crate::store::PgStore;
use crate::telemetry::{self};
use crate::telemetry::ops::browse::Phase as BrowsePhase;
use crate::user::types::User;

pub mod db;
pub mod types;

pub const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// gator browse [limit]
#[derive(Args, Debug, Clone, PartialEq)]
pub struct BrowseArgs {
    pub limit: Option<i64>,
}

pub async fn browse(store: &PgStore, user: &User, args: BrowseArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(DEFAULT_BROWSE_LIMIT);
    if limit < 1 { bail!("browse limit must be at least 1, got {limit}"); }

    let log = telemetry::browse();
    let _g = log.root_span_kv([("user", user.name.clone()), ("limit", limit.to_string())]).entered();
    let posts = { let _s = log.span(&BrowsePhase::Query).entered(); db::posts_for_user(store.pool(), user.id, limit).await? };

    if telemetry::config::json_mode() {
        return log.result(&types::BrowseResult { user: user.name.clone(), limit, posts });
    }
    if posts.is_empty() {
        log.info("ℹ️  No posts yet. Follow a feed and run `agg` first.");
    }
    for p in &posts {
        let date = p.published_at.map(|d| d.format("%a %b %e %Y").to_string()).unwrap_or_else(|| "undated".into());
        println!("{} from {}", date, p.feed_name);
        println!("--- {} ---", p.title);
        if let Some(desc) = p.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}", desc);
        }
        println!("Link: {}", p.url);
        println!("=====================================");
    }
    Ok(())
}
