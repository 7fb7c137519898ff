//! Review rule engine
//!
//! Every review write goes through [`ReviewRuleEngine`]. It validates the
//! referenced POS and users, enforces one review per (user, POS), runs the
//! approval workflow and keeps `approved` in step with `approval_count`.
//! Storage is delegated to the injected [`BaseReviewStore`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::{PosId, ReviewId, UserId};
use crate::domains::pos::Pos;
use crate::domains::reviews::approval::with_approval_status;
use crate::domains::reviews::errors::{Reference, ReviewError};
use crate::domains::reviews::models::Review;
use crate::kernel::{
    BaseApprovalPolicy, BasePosLookup, BaseReviewStore, BaseUserLookup, ServerDeps,
};

pub struct ReviewRuleEngine {
    reviews: Arc<dyn BaseReviewStore>,
    pos: Arc<dyn BasePosLookup>,
    users: Arc<dyn BaseUserLookup>,
    approval_policy: Arc<dyn BaseApprovalPolicy>,
}

impl ReviewRuleEngine {
    pub fn new(deps: &ServerDeps) -> Self {
        Self {
            reviews: deps.review_store.clone(),
            pos: deps.pos_lookup.clone(),
            users: deps.user_lookup.clone(),
            approval_policy: deps.approval_policy.clone(),
        }
    }

    /// All stored reviews
    pub async fn get_all(&self) -> Result<Vec<Review>, ReviewError> {
        Ok(self.reviews.get_all().await?)
    }

    /// One review by id
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Review, ReviewError> {
        self.reviews
            .get_by_id(id)
            .await?
            .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id)))
    }

    /// Create (no id) or update (id set) a review.
    ///
    /// The caller's `approval_count` is kept; `approved` is always recomputed.
    /// The author of a stored review cannot be changed.
    pub async fn upsert(&self, review: Review) -> Result<Review, ReviewError> {
        info!(review_id = ?review.id, "Upserting review");

        if review.approval_count < 0 {
            warn!(approval_count = review.approval_count, "Rejected negative approval count");
            return Err(ReviewError::NegativeApprovalCount {
                count: review.approval_count,
            });
        }

        let pos = self.resolve_pos(review.pos_id).await?;
        let author = self
            .users
            .find_by_id(review.author_id)
            .await?
            .ok_or(ReviewError::ReferenceNotFound(Reference::Author(review.author_id)))?;

        if let Some(id) = review.id {
            let stored = self.get_by_id(id).await?;
            if stored.author_id != author.id {
                warn!(review_id = %id, "Rejected author change");
                return Err(ReviewError::AuthorChange { review_id: id });
            }
        }

        self.ensure_pair_free(pos.id, author.id, review.id).await?;

        let normalized = with_approval_status(
            Review {
                pos_id: pos.id,
                author_id: author.id,
                ..review
            },
            self.approval_policy.minimum_count(),
        );

        let stored = self.reviews.upsert(normalized).await?;
        info!(review_id = ?stored.id, approved = stored.approved, "Review upserted");
        Ok(stored)
    }

    /// Change the POS and text of a stored review.
    ///
    /// Applied to the row while the store holds it locked, so approvals
    /// recorded since the caller last read the review are kept.
    pub async fn edit(
        &self,
        id: ReviewId,
        pos_id: PosId,
        text: String,
    ) -> Result<Review, ReviewError> {
        info!(review_id = %id, pos_id = %pos_id, "Editing review");

        let pos_id = self.resolve_pos(pos_id).await?.id;
        // The author is immutable, so an unlocked read is enough for the pair check
        let current = self.get_by_id(id).await?;
        self.ensure_pair_free(pos_id, current.author_id, Some(id)).await?;

        let policy = self.approval_policy.clone();
        let stored = self
            .reviews
            .update_locked(
                id,
                Box::new(move |persisted: Review| {
                    let edited = Review {
                        pos_id,
                        text,
                        ..persisted
                    };
                    Ok(with_approval_status(edited, policy.minimum_count()))
                }),
            )
            .await?;

        info!(review_id = %id, approval_count = stored.approval_count, "Review edited");
        Ok(stored)
    }

    /// Record one approval of a review by a user other than its author.
    ///
    /// The review is reloaded, checked, incremented and written while the
    /// store holds it locked, so concurrent approvals are never lost.
    pub async fn approve(
        &self,
        review_id: ReviewId,
        user_id: UserId,
    ) -> Result<Review, ReviewError> {
        info!(review_id = %review_id, user_id = %user_id, "Processing approval request");

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ReviewError::ReferenceNotFound(Reference::ApprovingUser(user_id)))?;

        let policy = self.approval_policy.clone();
        let stored = self
            .reviews
            .update_locked(
                review_id,
                Box::new(move |persisted: Review| {
                    if persisted.author_id == user_id {
                        return Err(ReviewError::SelfApproval { review_id, user_id });
                    }
                    let approval_count = persisted
                        .approval_count
                        .checked_add(1)
                        .ok_or(ReviewError::ApprovalLimitReached { review_id })?;
                    let incremented = Review {
                        approval_count,
                        ..persisted
                    };
                    Ok(with_approval_status(incremented, policy.minimum_count()))
                }),
            )
            .await
            .inspect_err(|e| {
                if let ReviewError::SelfApproval { .. } = e {
                    warn!(review_id = %review_id, user_id = %user_id, "Rejected self-approval");
                }
            })?;

        info!(
            review_id = %review_id,
            approval_count = stored.approval_count,
            approved = stored.approved,
            "Review approved"
        );
        Ok(stored)
    }

    /// Reviews of one POS with the given approval flag
    pub async fn filter(&self, pos_id: PosId, approved: bool) -> Result<Vec<Review>, ReviewError> {
        debug!(pos_id = %pos_id, approved, "Filtering reviews");
        let pos = self.resolve_pos(pos_id).await?;
        Ok(self.reviews.filter(pos.id, approved).await?)
    }

    /// Delete a review
    pub async fn delete(&self, id: ReviewId) -> Result<(), ReviewError> {
        info!(review_id = %id, "Deleting review");
        if self.reviews.delete(id).await? {
            Ok(())
        } else {
            Err(ReviewError::ReferenceNotFound(Reference::Review(id)))
        }
    }

    /// Fails with `DuplicateReview` if another review already holds the pair
    async fn ensure_pair_free(
        &self,
        pos_id: PosId,
        author_id: UserId,
        own_id: Option<ReviewId>,
    ) -> Result<(), ReviewError> {
        let taken = self.reviews.get_all().await?.iter().any(|existing| {
            existing.pos_id == pos_id
                && existing.author_id == author_id
                && (own_id.is_none() || existing.id != own_id)
        });
        if taken {
            warn!(pos_id = %pos_id, author_id = %author_id, "Rejected second review for POS");
            return Err(ReviewError::DuplicateReview { pos_id, author_id });
        }
        Ok(())
    }

    async fn resolve_pos(&self, id: PosId) -> Result<Pos, ReviewError> {
        self.pos
            .find_by_id(id)
            .await?
            .ok_or(ReviewError::ReferenceNotFound(Reference::Pos(id)))
    }
}
