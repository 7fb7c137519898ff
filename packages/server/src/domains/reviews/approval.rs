//! Approval threshold and derived approval status.
//!
//! `approved` is never set directly: every path that changes a review's
//! approval count passes the review through [`with_approval_status`] before
//! it is written.

use std::sync::atomic::{AtomicI32, Ordering};

use tracing::debug;

use crate::domains::reviews::models::Review;
use crate::kernel::BaseApprovalPolicy;

/// Returns the review with `approved` recomputed against `threshold`.
pub fn with_approval_status(review: Review, threshold: i32) -> Review {
    debug!(
        review_id = ?review.id,
        approval_count = review.approval_count,
        threshold,
        "Updating approval status"
    );
    let approved = review.approval_count >= threshold;
    Review { approved, ..review }
}

/// Operator-configurable approval threshold.
///
/// Loaded from `APPROVAL_MIN_COUNT` at startup and adjustable at runtime;
/// readers always see the current value.
#[derive(Debug)]
pub struct ApprovalConfig {
    min_count: AtomicI32,
}

impl ApprovalConfig {
    pub fn new(min_count: i32) -> Self {
        Self {
            min_count: AtomicI32::new(min_count),
        }
    }

    /// Change the threshold used by subsequent recomputations
    pub fn set_minimum_count(&self, min_count: i32) {
        self.min_count.store(min_count, Ordering::SeqCst);
    }
}

impl BaseApprovalPolicy for ApprovalConfig {
    fn minimum_count(&self) -> i32 {
        self.min_count.load(Ordering::SeqCst)
    }
}
