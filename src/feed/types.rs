use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Feed {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

// `feeds` listing joins the owner's name
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct FeedListRow {
    pub name: String,
    pub url: String,
    pub user_name: String,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct FollowRow {
    pub feed_name: String,
    pub feed_url: String,
    pub user_name: String,
}

#[derive(Serialize)]
pub struct FeedList { pub feeds: Vec<FeedListRow> }

#[derive(Serialize)]
pub struct FollowList { pub user: String, pub follows: Vec<FollowRow> }

#[derive(Serialize)]
pub struct UnfollowResult { pub url: String, pub removed: bool }
