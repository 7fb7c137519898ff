//! Typed ID definitions for all domain entities.
//!
//! # Example
//!
//! ```rust
//! use reviews_core::common::{PosId, UserId};
//!
//! // These are incompatible types - compiler prevents mixing them up
//! let pos_id = PosId::new(7);
//! let author_id = UserId::new(3);
//!
//! // This would be a compile error:
//! // let wrong: PosId = author_id;
//! # let _ = (pos_id, author_id);
//! ```

// Re-export the core Id type
pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for point-of-sale entities.
pub struct PointOfSale;

/// Marker type for User entities (review authors and approvers).
pub struct Account;

/// Marker type for Review entities.
pub struct PosReview;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for point-of-sale entities.
pub type PosId = Id<PointOfSale>;

/// Typed ID for User entities.
pub type UserId = Id<Account>;

/// Typed ID for Review entities.
pub type ReviewId = Id<PosReview>;
