use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

use crate::store::{PgStore, StoreError};
use crate::telemetry::{self};
use crate::telemetry::ops::feed::Phase as FeedPhase;
use crate::user::types::User;

pub mod db;
pub mod types;

/// gator addfeed <name> <url>
#[derive(Args, Debug, Clone, PartialEq)]
pub struct AddFeedArgs {
    pub name: String,
    pub url: String,
}

/// gator follow|unfollow <url>
#[derive(Args, Debug, Clone, PartialEq)]
pub struct FeedUrlArgs {
    pub url: String,
}

pub async fn add_feed(store: &PgStore, user: &User, args: AddFeedArgs) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([("name", args.name.clone()), ("url", args.url.clone())]).entered();

    // URL validation (friendly error before DB I/O)
    validate_feed_url(&args.url)?;

    let _s = log.span(&FeedPhase::Add).entered();
    let feed = match db::create_feed(store.pool(), &args.name, &args.url, user.id).await {
        Ok(feed) => feed,
        Err(StoreError::Duplicate(_)) => bail!("a feed with url {} already exists; use `follow` instead", args.url),
        Err(e) => return Err(e).context("creating feed"),
    };
    let follow = db::create_follow(store.pool(), user.id, feed.id).await.context("following new feed")?;
    log.info(format!("➕ Feed added: {} ({}), followed by {}", feed.name, feed.url, follow.user_name));

    if telemetry::config::json_mode() {
        log.result(&feed)?;
    } else {
        println!("{} {}", feed.name, feed.url);
    }
    Ok(())
}

pub async fn list_feeds(store: &PgStore) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span().entered();
    let _s = log.span(&FeedPhase::List).entered();
    let feeds = db::list_feeds(store.pool()).await?;

    if telemetry::config::json_mode() {
        return log.result(&types::FeedList { feeds });
    }
    if feeds.is_empty() {
        log.info("ℹ️  No feeds registered. Add one with `addfeed <name> <url>`.");
    }
    for f in &feeds {
        println!("* {} {} (added by {}) last_fetched={:?}", f.name, f.url, f.user_name, f.last_fetched_at);
    }
    Ok(())
}

pub async fn follow(store: &PgStore, user: &User, args: FeedUrlArgs) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([("url", args.url.clone())]).entered();
    let _s = log.span(&FeedPhase::Follow).entered();

    let feed = match db::get_feed_by_url(store.pool(), &args.url).await {
        Ok(feed) => feed,
        Err(StoreError::NotFound) => bail!("no feed registered with url {}", args.url),
        Err(e) => return Err(e.into()),
    };
    let row = match db::create_follow(store.pool(), user.id, feed.id).await {
        Ok(row) => row,
        Err(StoreError::Duplicate(_)) => bail!("{} already follows {}", user.name, feed.url),
        Err(e) => return Err(e).context("creating follow"),
    };

    if telemetry::config::json_mode() {
        log.result(&row)?;
    } else {
        println!("{} now follows {}", row.user_name, row.feed_name);
    }
    Ok(())
}

pub async fn following(store: &PgStore, user: &User) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span().entered();
    let _s = log.span(&FeedPhase::Following).entered();
    let follows = db::follows_for_user(store.pool(), user.id).await?;

    if telemetry::config::json_mode() {
        return log.result(&types::FollowList { user: user.name.clone(), follows });
    }
    for f in &follows {
        println!("* {} ({})", f.feed_name, f.feed_url);
    }
    Ok(())
}

pub async fn unfollow(store: &PgStore, user: &User, args: FeedUrlArgs) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([("url", args.url.clone())]).entered();
    let _s = log.span(&FeedPhase::Unfollow).entered();

    let removed = db::delete_follow(store.pool(), user.id, &args.url).await?;
    if !removed {
        bail!("{} does not follow {}", user.name, args.url);
    }
    log.info(format!("➖ {} unfollowed {}", user.name, args.url));
    log.result(&types::UnfollowResult { url: args.url, removed })
}

fn validate_feed_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).with_context(|| format!("Invalid URL: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Invalid URL: {raw} (expected http or https)");
    }
    Ok(())
}
