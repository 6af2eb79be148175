use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::feed::types::Feed;
use crate::store::StoreError;

// Round-robin: never-fetched feeds first, then the stalest; ties by age then id.
pub async fn next_feed_to_fetch(pool: &PgPool) -> Result<Feed, StoreError> {
    let feed = sqlx::query_as::<_, Feed>(
        r#"
        SELECT id, created_at, updated_at, name, url, user_id, last_fetched_at
        FROM feeds
        ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC, id ASC
        LIMIT 1
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(feed)
}

// GREATEST ignores NULL, so the first mark sets the value and later ones never rewind it.
pub async fn mark_feed_fetched(pool: &PgPool, feed_id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
    let res = sqlx::query(
        r#"
        UPDATE feeds
        SET last_fetched_at = GREATEST(last_fetched_at, $2),
            updated_at      = $2
        WHERE id = $1
        "#,
    )
    .bind(feed_id)
    .bind(at)
    .execute(pool)
    .await?;
    if res.rows_affected() == 0 { return Err(StoreError::NotFound); }
    Ok(())
}
