use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::feed::types::Feed;
use crate::post::types::{NewPost, Post};
use crate::user::types::User;

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    /// Unique constraint rejected the write; carries the constraint name.
    Duplicate(String),
    Db(sqlx::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool { matches!(self, StoreError::Duplicate(_)) }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.constraint().unwrap_or("unique").to_string())
            }
            other => StoreError::Db(other),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Duplicate(c) => write!(f, "duplicate value violates {c}"),
            StoreError::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Db(e) => Some(e),
            _ => None,
        }
    }
}

/// Storage calls the ingestion cycle depends on.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Feed with the oldest `last_fetched_at`; never-fetched feeds first.
    async fn get_next_feed_to_fetch(&self) -> Result<Feed, StoreError>;
    async fn mark_feed_fetched(&self, feed_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, name: &str) -> Result<User, StoreError>;
}

/// Postgres-backed store. Glue CRUD lives in each module's `db.rs`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub fn pool(&self) -> &PgPool { &self.pool }
}

#[async_trait]
impl FeedStore for PgStore {
    async fn get_next_feed_to_fetch(&self) -> Result<Feed, StoreError> {
        crate::ingestion::db::next_feed_to_fetch(&self.pool).await
    }

    async fn mark_feed_fetched(&self, feed_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        crate::ingestion::db::mark_feed_fetched(&self.pool, feed_id, at).await
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        crate::post::db::create_post(&self.pool, post).await
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, name: &str) -> Result<User, StoreError> {
        crate::user::db::get_user(&self.pool, name).await
    }
}

#[cfg(test)]
pub mod mem {
    //! In-memory store for exercising ingestion and dispatch without Postgres.
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MemStore {
        feeds: Mutex<Vec<Feed>>,
        posts: Mutex<Vec<Post>>,
        users: Mutex<Vec<User>>,
        reject_urls: Mutex<HashSet<String>>,
        calls: Mutex<Vec<String>>,
    }

    impl MemStore {
        pub fn new() -> Self { Self::default() }

        pub fn add_feed(&self, name: &str, url: &str, last_fetched_at: Option<DateTime<Utc>>) -> Feed {
            let mut feeds = self.feeds.lock().unwrap();
            // spread created_at so insertion order is observable
            let created_at = Utc::now() + chrono::Duration::milliseconds(feeds.len() as i64);
            let feed = Feed {
                id: Uuid::new_v4(),
                created_at,
                updated_at: created_at,
                name: name.to_string(),
                url: url.to_string(),
                user_id: Uuid::nil(),
                last_fetched_at,
            };
            feeds.push(feed.clone());
            feed
        }

        pub fn add_user(&self, name: &str) -> User {
            let now = Utc::now();
            let user = User { id: Uuid::new_v4(), created_at: now, updated_at: now, name: name.to_string() };
            self.users.lock().unwrap().push(user.clone());
            user
        }

        /// Make `create_post` fail as a duplicate for this url.
        pub fn reject_post_url(&self, url: &str) {
            self.reject_urls.lock().unwrap().insert(url.to_string());
        }

        pub fn feed(&self, id: Uuid) -> Feed {
            self.feeds.lock().unwrap().iter().find(|f| f.id == id).cloned().unwrap()
        }

        pub fn posts(&self) -> Vec<Post> { self.posts.lock().unwrap().clone() }

        pub fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

        fn record(&self, call: &str) { self.calls.lock().unwrap().push(call.to_string()); }
    }

    #[async_trait]
    impl FeedStore for MemStore {
        async fn get_next_feed_to_fetch(&self) -> Result<Feed, StoreError> {
            self.record("get_next_feed_to_fetch");
            let feeds = self.feeds.lock().unwrap();
            feeds
                .iter()
                .min_by_key(|f| (f.last_fetched_at.is_some(), f.last_fetched_at, f.created_at, f.id))
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn mark_feed_fetched(&self, feed_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
            self.record("mark_feed_fetched");
            let mut feeds = self.feeds.lock().unwrap();
            let feed = feeds.iter_mut().find(|f| f.id == feed_id).ok_or(StoreError::NotFound)?;
            feed.last_fetched_at = Some(feed.last_fetched_at.map_or(at, |prev| prev.max(at)));
            feed.updated_at = at;
            Ok(())
        }

        async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
            self.record("create_post");
            if self.reject_urls.lock().unwrap().contains(&post.url) {
                return Err(StoreError::Duplicate("posts_url_key".into()));
            }
            let mut posts = self.posts.lock().unwrap();
            if posts.iter().any(|p| p.url == post.url) {
                return Err(StoreError::Duplicate("posts_url_key".into()));
            }
            let now = Utc::now();
            let created = Post {
                id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
                title: post.title,
                url: post.url,
                description: post.description,
                published_at: post.published_at,
                feed_id: post.feed_id,
            };
            posts.push(created.clone());
            Ok(created)
        }
    }

    #[async_trait]
    impl UserStore for MemStore {
        async fn get_user(&self, name: &str) -> Result<User, StoreError> {
            self.record("get_user");
            self.users.lock().unwrap().iter().find(|u| u.name == name).cloned().ok_or(StoreError::NotFound)
        }
    }

    #[tokio::test]
    async fn never_fetched_feeds_win_in_insertion_order() {
        let store = MemStore::new();
        let yesterday = Utc::now() - chrono::Duration::days(1);
        store.add_feed("old", "https://old.example/rss", Some(yesterday));
        let first = store.add_feed("first", "https://first.example/rss", None);
        store.add_feed("second", "https://second.example/rss", None);

        assert_eq!(store.get_next_feed_to_fetch().await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn last_fetched_never_moves_backwards() {
        let store = MemStore::new();
        let feed = store.add_feed("f", "https://f.example/rss", None);
        let now = Utc::now();
        store.mark_feed_fetched(feed.id, now).await.unwrap();
        store.mark_feed_fetched(feed.id, now - chrono::Duration::hours(1)).await.unwrap();
        assert_eq!(store.feed(feed.id).last_fetched_at, Some(now));
    }
}
