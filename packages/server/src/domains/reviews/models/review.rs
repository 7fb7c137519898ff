use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use typed_builder::TypedBuilder;

use crate::common::{PosId, ReviewId, UserId};

/// Review model - one user's review of one point of sale
///
/// `id`, `created_at` and `updated_at` are `None` until the storage layer
/// has persisted the review. `approved` is derived from `approval_count` and
/// must only be set through [`crate::domains::reviews::with_approval_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
pub struct Review {
    #[builder(default, setter(strip_option))]
    pub id: Option<ReviewId>,
    #[builder(default, setter(strip_option))]
    pub created_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub updated_at: Option<DateTime<Utc>>,

    // References
    pub pos_id: PosId,
    pub author_id: UserId,

    #[builder(setter(into))]
    pub text: String,

    // Approval workflow
    #[builder(default)]
    pub approval_count: i32,
    #[builder(default)]
    pub approved: bool,
}

impl Review {
    /// Returns true if both reviews are about the same POS by the same author
    pub fn same_pos_and_author(&self, other: &Review) -> bool {
        self.pos_id == other.pos_id && self.author_id == other.author_id
    }

    /// Find all reviews
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Self>("SELECT * FROM reviews ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(reviews)
    }

    /// Find review by ID, returning None if not found
    pub async fn find_by_id_optional<'e, E>(id: ReviewId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let review = sqlx::query_as::<_, Self>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(review)
    }

    /// Find review by ID and lock the row until the surrounding transaction ends
    pub async fn find_by_id_for_update<'e, E>(id: ReviewId, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let review = sqlx::query_as::<_, Self>("SELECT * FROM reviews WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(review)
    }

    /// Find reviews for a POS with the given approval flag
    pub async fn find_by_pos_and_approval(
        pos_id: PosId,
        approved: bool,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reviews
            WHERE pos_id = $1 AND approved = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(pos_id)
        .bind(approved)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    /// Insert a new review (ID and timestamps are assigned by the database)
    pub async fn insert<'e, E>(review: &Review, executor: E) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let stored = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO reviews (pos_id, author_id, text, approval_count, approved)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(review.pos_id)
        .bind(review.author_id)
        .bind(&review.text)
        .bind(review.approval_count)
        .bind(review.approved)
        .fetch_one(executor)
        .await?;
        Ok(stored)
    }

    /// Update an existing review, returning None if the ID does not exist.
    ///
    /// The author column is never rewritten.
    pub async fn update<'e, E>(id: ReviewId, review: &Review, executor: E) -> Result<Option<Self>>
    where
        E: PgExecutor<'e>,
    {
        let stored = sqlx::query_as::<_, Self>(
            r#"
            UPDATE reviews
            SET pos_id = $2,
                text = $3,
                approval_count = $4,
                approved = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(review.pos_id)
        .bind(&review.text)
        .bind(review.approval_count)
        .bind(review.approved)
        .fetch_optional(executor)
        .await?;
        Ok(stored)
    }

    /// Delete a review, returning whether a row was removed
    pub async fn delete(id: ReviewId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
