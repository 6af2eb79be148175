use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{Feed, FeedListRow, FollowRow};
use crate::store::StoreError;

pub async fn create_feed(pool: &PgPool, name: &str, url: &str, user_id: Uuid) -> Result<Feed, StoreError> {
    let now = Utc::now();
    let feed = sqlx::query_as::<_, Feed>(
        r#"
        INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
        VALUES ($1, $2, $2, $3, $4, $5)
        RETURNING id, created_at, updated_at, name, url, user_id, last_fetched_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(name)
    .bind(url)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(feed)
}

pub async fn get_feed_by_url(pool: &PgPool, url: &str) -> Result<Feed, StoreError> {
    let feed = sqlx::query_as::<_, Feed>(
        r#"
        SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
        FROM feeds
        WHERE url = $1
        "#,
    )
    .bind(url)
    .fetch_one(pool)
    .await?;
    Ok(feed)
}

pub async fn list_feeds(pool: &PgPool) -> Result<Vec<FeedListRow>, StoreError> {
    let rows = sqlx::query_as::<_, FeedListRow>(
        r#"
        SELECT f.name, f.url, u.name AS user_name, f.last_fetched_at
        FROM feeds f
        JOIN users u ON u.id = f.user_id
        ORDER BY f.created_at, f.id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create_follow(pool: &PgPool, user_id: Uuid, feed_id: Uuid) -> Result<FollowRow, StoreError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, FollowRow>(
        r#"
        WITH inserted AS (
            INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING user_id, feed_id
        )
        SELECT f.name AS feed_name, f.url AS feed_url, u.name AS user_name
        FROM inserted i
        JOIN feeds f ON f.id = i.feed_id
        JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(user_id)
    .bind(feed_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn follows_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<FollowRow>, StoreError> {
    let rows = sqlx::query_as::<_, FollowRow>(
        r#"
        SELECT f.name AS feed_name, f.url AS feed_url, u.name AS user_name
        FROM feed_follows ff
        JOIN feeds f ON f.id = ff.feed_id
        JOIN users u ON u.id = ff.user_id
        WHERE ff.user_id = $1
        ORDER BY ff.created_at, ff.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// Returns whether a follow row was removed.
pub async fn delete_follow(pool: &PgPool, user_id: Uuid, url: &str) -> Result<bool, StoreError> {
    let res = sqlx::query(
        r#"
        DELETE FROM feed_follows ff
        USING feeds f
        WHERE ff.feed_id = f.id AND ff.user_id = $1 AND f.url = $2
        "#,
    )
    .bind(user_id)
    .bind(url)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}
