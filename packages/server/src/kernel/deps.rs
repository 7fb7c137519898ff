//! Server dependencies for the review rules (using traits for testability)
//!
//! This module provides the central dependency container. Every collaborator
//! sits behind a trait so tests can swap in the in-memory implementations.

use sqlx::PgPool;
use std::sync::Arc;

use crate::kernel::postgres::{PostgresPosLookup, PostgresReviewStore, PostgresUserLookup};
use crate::kernel::{BaseApprovalPolicy, BasePosLookup, BaseReviewStore, BaseUserLookup};

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies accessible to the review rule engine
#[derive(Clone)]
pub struct ServerDeps {
    pub review_store: Arc<dyn BaseReviewStore>,
    pub pos_lookup: Arc<dyn BasePosLookup>,
    pub user_lookup: Arc<dyn BaseUserLookup>,
    pub approval_policy: Arc<dyn BaseApprovalPolicy>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        review_store: Arc<dyn BaseReviewStore>,
        pos_lookup: Arc<dyn BasePosLookup>,
        user_lookup: Arc<dyn BaseUserLookup>,
        approval_policy: Arc<dyn BaseApprovalPolicy>,
    ) -> Self {
        Self {
            review_store,
            pos_lookup,
            user_lookup,
            approval_policy,
        }
    }

    /// Wire every store and lookup to the given Postgres pool
    pub fn postgres(pool: PgPool, approval_policy: Arc<dyn BaseApprovalPolicy>) -> Self {
        Self::new(
            Arc::new(PostgresReviewStore::new(pool.clone())),
            Arc::new(PostgresPosLookup::new(pool.clone())),
            Arc::new(PostgresUserLookup::new(pool)),
            approval_policy,
        )
    }
}
