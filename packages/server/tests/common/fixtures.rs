//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.
//! Every call creates new rows, so tests sharing the database do not collide.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use reviews_core::common::{PosId, UserId};
use reviews_core::domains::pos::{CreatePos, Pos};
use reviews_core::domains::reviews::Review;
use reviews_core::domains::users::{CreateUser, User};
use sqlx::PgPool;

static NEXT_FIXTURE: AtomicU64 = AtomicU64::new(1);

fn unique_suffix() -> u64 {
    NEXT_FIXTURE.fetch_add(1, Ordering::SeqCst)
}

/// Create a test point of sale
pub async fn create_test_pos(pool: &PgPool, name: &str) -> Result<PosId> {
    let pos = Pos::create(
        CreatePos {
            name: format!("{} #{}", name, unique_suffix()),
            description: Some("Test POS".to_string()),
        },
        pool,
    )
    .await?;

    Ok(pos.id)
}

/// Create a test user
pub async fn create_test_user(pool: &PgPool, login_name: &str) -> Result<UserId> {
    let suffix = unique_suffix();
    let user = User::create(
        CreateUser {
            login_name: format!("{}-{}", login_name, suffix),
            email_address: format!("{}-{}@example.org", login_name, suffix),
        },
        pool,
    )
    .await?;

    Ok(user.id)
}

/// Create several test users at once
pub async fn create_test_users(pool: &PgPool, count: usize) -> Result<Vec<UserId>> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(create_test_user(pool, "approver").await?);
    }
    Ok(ids)
}

/// A new, unsaved review
pub fn new_review(pos_id: PosId, author_id: UserId, text: &str) -> Review {
    Review::builder()
        .pos_id(pos_id)
        .author_id(author_id)
        .text(text)
        .build()
}
