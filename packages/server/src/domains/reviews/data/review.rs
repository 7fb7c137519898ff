use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{PosId, ReviewId, UserId};
use crate::domains::reviews::models::Review;

/// Review data type returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewData {
    pub id: Option<ReviewId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pos_id: PosId,
    pub author_id: UserId,
    pub review: String,

    // Approval workflow (read-only)
    pub approval_count: i32,
    pub approved: bool,
}

impl From<Review> for ReviewData {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            created_at: review.created_at,
            updated_at: review.updated_at,
            pos_id: review.pos_id,
            author_id: review.author_id,
            review: review.text,
            approval_count: review.approval_count,
            approved: review.approved,
        }
    }
}

/// Input for creating or updating a review.
///
/// Has no approval fields: approval state only changes through the approve
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub id: Option<ReviewId>,
    pub pos_id: PosId,
    pub author_id: UserId,
    pub review: String,
}

impl ReviewInput {
    /// Review text with surrounding whitespace removed, None if blank
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.review.trim();
        (!text.is_empty()).then_some(text)
    }

    /// A new, not yet persisted review
    pub fn into_new_review(self) -> Review {
        Review::builder()
            .pos_id(self.pos_id)
            .author_id(self.author_id)
            .text(self.review)
            .build()
    }
}

/// Query parameters for `GET /api/reviews/filter`
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewFilterQuery {
    pub pos_id: PosId,
    pub approved: bool,
}

/// Query parameters for `POST /api/reviews/:id/approve`
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveQuery {
    pub user_id: UserId,
}
