//! Postgres-backed implementations of the kernel traits.
//!
//! Thin adapters over the model query methods. The adapters add what the
//! models do not: mapping unique violations to domain errors and running
//! locked read-modify-write sequences inside a transaction.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::common::{PosId, ReviewId, UserId};
use crate::domains::pos::Pos;
use crate::domains::reviews::{Reference, Review, ReviewError};
use crate::domains::users::User;
use crate::kernel::{BasePosLookup, BaseReviewStore, BaseUserLookup, ReviewMutation};

/// Name of the unique constraint on `reviews (pos_id, author_id)`
const REVIEW_POS_AUTHOR_CONSTRAINT: &str = "reviews_pos_id_author_id_key";

// =============================================================================
// Review store
// =============================================================================

pub struct PostgresReviewStore {
    pool: PgPool,
}

impl PostgresReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique violation on the (pos, author) pair into `DuplicateReview`
fn map_write_error(err: anyhow::Error, review: &Review) -> ReviewError {
    let is_pair_violation = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation() && db.constraint() == Some(REVIEW_POS_AUTHOR_CONSTRAINT))
        .unwrap_or(false);

    if is_pair_violation {
        warn!(
            pos_id = %review.pos_id,
            author_id = %review.author_id,
            "Unique index rejected duplicate review"
        );
        ReviewError::DuplicateReview {
            pos_id: review.pos_id,
            author_id: review.author_id,
        }
    } else {
        ReviewError::Storage(err)
    }
}

#[async_trait]
impl BaseReviewStore for PostgresReviewStore {
    async fn get_all(&self) -> Result<Vec<Review>> {
        Review::find_all(&self.pool).await
    }

    async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        Review::find_by_id_optional(id, &self.pool).await
    }

    async fn upsert(&self, review: Review) -> Result<Review, ReviewError> {
        match review.id {
            None => Review::insert(&review, &self.pool)
                .await
                .map_err(|e| map_write_error(e, &review)),
            Some(id) => Review::update(id, &review, &self.pool)
                .await
                .map_err(|e| map_write_error(e, &review))?
                .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id))),
        }
    }

    async fn filter(&self, pos_id: PosId, approved: bool) -> Result<Vec<Review>> {
        Review::find_by_pos_and_approval(pos_id, approved, &self.pool).await
    }

    async fn delete(&self, id: ReviewId) -> Result<bool> {
        Review::delete(id, &self.pool).await
    }

    async fn update_locked(
        &self,
        id: ReviewId,
        mutation: ReviewMutation,
    ) -> Result<Review, ReviewError> {
        // Dropping the transaction without commit rolls it back
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        let current = Review::find_by_id_for_update(id, &mut *tx)
            .await?
            .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id)))?;

        let next = mutation(current)?;

        let stored = Review::update(id, &next, &mut *tx)
            .await
            .map_err(|e| map_write_error(e, &next))?
            .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id)))?;

        tx.commit().await.map_err(anyhow::Error::from)?;
        Ok(stored)
    }
}

// =============================================================================
// Reference lookups
// =============================================================================

pub struct PostgresPosLookup {
    pool: PgPool,
}

impl PostgresPosLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BasePosLookup for PostgresPosLookup {
    async fn find_by_id(&self, id: PosId) -> Result<Option<Pos>> {
        Pos::find_by_id_optional(id, &self.pool).await
    }
}

pub struct PostgresUserLookup {
    pool: PgPool,
}

impl PostgresUserLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseUserLookup for PostgresUserLookup {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        User::find_by_id_optional(id, &self.pool).await
    }
}
