use std::fmt;

use thiserror::Error;

use crate::common::{PosId, ReviewId, UserId};

/// A referenced entity that could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Pos(PosId),
    Author(UserId),
    ApprovingUser(UserId),
    Review(ReviewId),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Pos(id) => write!(f, "POS with ID {}", id),
            Reference::Author(id) => write!(f, "author with ID {}", id),
            Reference::ApprovingUser(id) => write!(f, "approving user with ID {}", id),
            Reference::Review(id) => write!(f, "review with ID {}", id),
        }
    }
}

/// Errors raised by the review rules
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("{0} does not exist")]
    ReferenceNotFound(Reference),

    #[error("A user cannot submit more than one review per POS (user {author_id}, POS {pos_id})")]
    DuplicateReview { pos_id: PosId, author_id: UserId },

    #[error("Users are not allowed to approve their own reviews (review {review_id}, user {user_id})")]
    SelfApproval { review_id: ReviewId, user_id: UserId },

    #[error("Approval count must not be negative (got {count})")]
    NegativeApprovalCount { count: i32 },

    #[error("Review {review_id} cannot take more approvals")]
    ApprovalLimitReached { review_id: ReviewId },

    #[error("The author of review {review_id} cannot be changed")]
    AuthorChange { review_id: ReviewId },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ReviewError {
    /// Short machine-readable name for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewError::ReferenceNotFound(_) => "reference_not_found",
            ReviewError::DuplicateReview { .. } => "duplicate_review",
            ReviewError::SelfApproval { .. } => "self_approval",
            ReviewError::NegativeApprovalCount { .. } => "negative_approval_count",
            ReviewError::ApprovalLimitReached { .. } => "approval_limit_reached",
            ReviewError::AuthorChange { .. } => "author_change",
            ReviewError::Storage(_) => "storage",
        }
    }

    /// True for the client-visible business-rule violations
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ReviewError::ReferenceNotFound(_) | ReviewError::Storage(_)
        )
    }
}
