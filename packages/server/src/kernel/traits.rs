// Trait definitions for dependency injection
//
// These are the collaborators the review rules consume. Implementations live
// in kernel::postgres (production) and kernel::test_dependencies (tests).
//
// Naming convention: Base* for trait names (e.g., BaseReviewStore, BasePosLookup)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{PosId, ReviewId, UserId};
use crate::domains::pos::Pos;
use crate::domains::reviews::{Review, ReviewError};
use crate::domains::users::User;

/// A fallible change applied to a review while its row is locked.
pub type ReviewMutation = Box<dyn FnOnce(Review) -> Result<Review, ReviewError> + Send>;

// =============================================================================
// Review Store Trait (Persistence)
// =============================================================================

#[async_trait]
pub trait BaseReviewStore: Send + Sync {
    /// Snapshot of every stored review
    async fn get_all(&self) -> Result<Vec<Review>>;

    /// Review by identity, None if it does not exist
    async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>>;

    /// Insert (no id) or update (id set) a review and return the stored row.
    ///
    /// Fails with `DuplicateReview` if the (pos, author) pair is already taken
    /// and with `ReferenceNotFound` if the id to update does not exist.
    async fn upsert(&self, review: Review) -> Result<Review, ReviewError>;

    /// Reviews for one POS with the given approval flag
    async fn filter(&self, pos_id: PosId, approved: bool) -> Result<Vec<Review>>;

    /// Remove a review, returning whether it existed
    async fn delete(&self, id: ReviewId) -> Result<bool>;

    /// Load the review, apply `mutation` and persist the result as one atomic
    /// unit. Nothing is written if the review is missing or `mutation` fails.
    async fn update_locked(
        &self,
        id: ReviewId,
        mutation: ReviewMutation,
    ) -> Result<Review, ReviewError>;
}

// =============================================================================
// Reference Lookup Traits (Existence checks)
// =============================================================================

#[async_trait]
pub trait BasePosLookup: Send + Sync {
    /// Point of sale by identity, None if it does not exist
    async fn find_by_id(&self, id: PosId) -> Result<Option<Pos>>;
}

#[async_trait]
pub trait BaseUserLookup: Send + Sync {
    /// User by identity, None if it does not exist
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
}

// =============================================================================
// Approval Policy Trait (Configuration)
// =============================================================================

pub trait BaseApprovalPolicy: Send + Sync {
    /// Approvals required before a review counts as approved.
    /// Read on every call; the value may change at runtime.
    fn minimum_count(&self) -> i32;
}
