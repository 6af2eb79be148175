use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::{BrowseRow, NewPost, Post};
use crate::store::StoreError;

// A duplicate url surfaces as StoreError::Duplicate; callers decide whether that matters.
pub async fn create_post(pool: &PgPool, post: NewPost) -> Result<Post, StoreError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, created_at, updated_at, title, url, description, published_at, feed_id)
        VALUES ($1, $2, $2, $3, $4, $5, $6, $7)
        RETURNING id, created_at, updated_at, title, url, description, published_at, feed_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(now)
    .bind(&post.title)
    .bind(&post.url)
    .bind(post.description.as_deref())
    .bind(post.published_at)
    .bind(post.feed_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn posts_for_user(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<BrowseRow>, StoreError> {
    let rows = sqlx::query_as::<_, BrowseRow>(
        r#"
        SELECT p.title, p.url, p.description, p.published_at, f.name AS feed_name
        FROM posts p
        JOIN feeds f ON f.id = p.feed_id
        JOIN feed_follows ff ON ff.feed_id = p.feed_id
        WHERE ff.user_id = $1
        ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
