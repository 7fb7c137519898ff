//! Integration tests for the review rules against Postgres.
//!
//! Covers the approval workflow, the one-review-per-POS rule (both the
//! engine check and the unique index behind it) and concurrent approvals
//! and edits.

mod common;

use std::collections::HashSet;

use crate::common::{
    create_test_pos, create_test_user, create_test_users, new_review, TestHarness,
};
use reviews_core::common::{ReviewId, UserId};
use reviews_core::domains::reviews::{Reference, Review, ReviewError};
use reviews_core::kernel::BaseReviewStore;
use test_context::test_context;

// =============================================================================
// Upsert
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_assigns_id_and_timestamps(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();

    let stored = ctx
        .engine
        .upsert(new_review(pos, author, "Great flat white"))
        .await
        .expect("Failed to create review");

    assert!(stored.id.is_some());
    assert!(stored.created_at.is_some());
    assert!(stored.updated_at.is_some());
    assert_eq!(stored.approval_count, 0);
    assert!(!stored.approved);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn second_review_for_same_pos_and_author_is_rejected(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();

    let first = ctx
        .engine
        .upsert(new_review(pos, author, "First visit"))
        .await
        .unwrap();

    let err = ctx
        .engine
        .upsert(new_review(pos, author, "Second visit"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::DuplicateReview { .. }));
    let for_pos: Vec<Review> = ctx
        .engine
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.pos_id == pos)
        .collect();
    assert_eq!(for_pos, vec![first]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unique_index_rejects_duplicates_that_bypass_the_engine(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let store = ctx.store();

    store
        .upsert(new_review(pos, author, "First"))
        .await
        .unwrap();
    let err = store
        .upsert(new_review(pos, author, "Second"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReviewError::DuplicateReview { pos_id, author_id } if pos_id == pos && author_id == author
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_keeps_author_and_refreshes_updated_at(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let other = create_test_user(&ctx.db_pool, "other").await.unwrap();
    let stored = ctx
        .engine
        .upsert(new_review(pos, author, "Before"))
        .await
        .unwrap();

    // The store never rewrites the author column
    let updated = ctx
        .store()
        .upsert(Review {
            author_id: other,
            text: "After".to_string(),
            ..stored.clone()
        })
        .await
        .unwrap();

    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.author_id, author);
    assert_eq!(updated.text, "After");
    assert!(updated.updated_at >= stored.updated_at);
    assert_eq!(updated.created_at, stored.created_at);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upsert_with_unknown_pos_is_not_found(ctx: &TestHarness) {
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();

    let err = ctx
        .engine
        .upsert(new_review(i64::MAX.into(), author, "Nowhere"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::ReferenceNotFound(Reference::Pos(_))));
}

// =============================================================================
// Approve
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn review_is_approved_after_reaching_threshold(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let approvers = create_test_users(&ctx.db_pool, 2).await.unwrap();
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "Worth it"))
        .await
        .unwrap();
    let id = review.id.unwrap();

    let first = ctx.engine.approve(id, approvers[0]).await.unwrap();
    assert_eq!(first.approval_count, 1);
    assert!(!first.approved);

    let second = ctx.engine.approve(id, approvers[1]).await.unwrap();
    assert_eq!(second.approval_count, 2);
    assert!(second.approved);

    let approved = ctx.engine.filter(pos, true).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, Some(id));
    assert!(ctx.engine.filter(pos, false).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn self_approval_leaves_count_unchanged(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "My own"))
        .await
        .unwrap();
    let id = review.id.unwrap();

    let err = ctx.engine.approve(id, author).await.unwrap_err();

    assert!(matches!(err, ReviewError::SelfApproval { .. }));
    let stored = ctx.engine.get_by_id(id).await.unwrap();
    assert_eq!(stored.approval_count, 0);
    assert_eq!(stored.updated_at, review.updated_at);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approving_missing_review_is_not_found(ctx: &TestHarness) {
    let approver = create_test_user(&ctx.db_pool, "approver").await.unwrap();
    let before = ctx.engine.get_all().await.unwrap().len();

    let err = ctx
        .engine
        .approve(ReviewId::new(i64::MAX), approver)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReviewError::ReferenceNotFound(Reference::Review(_))
    ));
    assert_eq!(ctx.engine.get_all().await.unwrap().len(), before);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn approving_as_unknown_user_is_not_found(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "Hello"))
        .await
        .unwrap();

    let err = ctx
        .engine
        .approve(review.id.unwrap(), UserId::new(i64::MAX))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReviewError::ReferenceNotFound(Reference::ApprovingUser(_))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_approvals_are_not_lost(ctx: &TestHarness) {
    const APPROVERS: usize = 8;

    let pos = create_test_pos(&ctx.db_pool, "Busy cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let approvers = create_test_users(&ctx.db_pool, APPROVERS).await.unwrap();
    ctx.approval.set_minimum_count(APPROVERS as i32);
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "Popular"))
        .await
        .unwrap();
    let id = review.id.unwrap();

    let handles: Vec<_> = approvers
        .into_iter()
        .map(|approver| {
            let engine = ctx.engine.clone();
            tokio::spawn(async move { engine.approve(id, approver).await })
        })
        .collect();

    let mut counts = HashSet::new();
    for handle in handles {
        let approved = handle.await.unwrap().unwrap();
        counts.insert(approved.approval_count);
    }

    // Every approval saw a distinct count, and the last one reached the threshold
    assert_eq!(counts.len(), APPROVERS);
    let stored = ctx.engine.get_by_id(id).await.unwrap();
    assert_eq!(stored.approval_count, APPROVERS as i32);
    assert!(stored.approved);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn concurrent_edits_do_not_lose_approvals(ctx: &TestHarness) {
    const APPROVERS: usize = 6;

    let pos = create_test_pos(&ctx.db_pool, "Busy cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let approvers = create_test_users(&ctx.db_pool, APPROVERS).await.unwrap();
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "Draft"))
        .await
        .unwrap();
    let id = review.id.unwrap();

    let mut handles = Vec::new();
    for (round, approver) in approvers.into_iter().enumerate() {
        let engine = ctx.engine.clone();
        handles.push(tokio::spawn(async move {
            engine.approve(id, approver).await.map(|_| ())
        }));
        let engine = ctx.engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .edit(id, pos, format!("Revision {}", round))
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = ctx.engine.get_by_id(id).await.unwrap();
    assert_eq!(stored.approval_count, APPROVERS as i32);
    assert!(stored.approved);
    assert_eq!(stored.author_id, author);
    assert!(stored.text.starts_with("Revision"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn negative_approval_count_is_rejected(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();

    let err = ctx
        .engine
        .upsert(Review {
            approval_count: -1,
            ..new_review(pos, author, "Negative")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::NegativeApprovalCount { count: -1 }));
    assert!(ctx.engine.filter(pos, false).await.unwrap().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn engine_rejects_author_change(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let other = create_test_user(&ctx.db_pool, "other").await.unwrap();
    let stored = ctx
        .engine
        .upsert(new_review(pos, author, "Mine"))
        .await
        .unwrap();

    let err = ctx
        .engine
        .upsert(Review {
            author_id: other,
            ..stored.clone()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::AuthorChange { .. }));
    assert_eq!(ctx.engine.get_by_id(stored.id.unwrap()).await.unwrap(), stored);
}

// =============================================================================
// Delete
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_frees_the_pos_author_pair(ctx: &TestHarness) {
    let pos = create_test_pos(&ctx.db_pool, "Cafe").await.unwrap();
    let author = create_test_user(&ctx.db_pool, "author").await.unwrap();
    let review = ctx
        .engine
        .upsert(new_review(pos, author, "Old opinion"))
        .await
        .unwrap();

    ctx.engine.delete(review.id.unwrap()).await.unwrap();

    let again = ctx
        .engine
        .upsert(new_review(pos, author, "New opinion"))
        .await
        .unwrap();
    assert_ne!(again.id, review.id);
}
