// TestDependencies - in-memory implementations for testing
//
// Provides in-memory stores and lookups that can be injected into ServerDeps
// for tests that should not need a database.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BasePosLookup, BaseReviewStore, BaseUserLookup, ReviewMutation, ServerDeps};
use crate::common::{PosId, ReviewId, UserId};
use crate::domains::pos::Pos;
use crate::domains::reviews::{ApprovalConfig, Reference, Review, ReviewError};
use crate::domains::users::User;

// =============================================================================
// In-memory Review Store
// =============================================================================

#[derive(Default)]
struct ReviewTable {
    rows: BTreeMap<ReviewId, Review>,
    next_id: i64,
    writes: usize,
}

impl ReviewTable {
    /// Apply the same rules the Postgres schema enforces, then store the row
    fn write(&mut self, review: Review) -> Result<Review, ReviewError> {
        let now = Utc::now();

        let stored = match review.id {
            None => {
                if self.rows.values().any(|r| r.same_pos_and_author(&review)) {
                    return Err(duplicate(&review));
                }
                self.next_id += 1;
                Review {
                    id: Some(ReviewId::new(self.next_id)),
                    created_at: Some(now),
                    updated_at: Some(now),
                    ..review
                }
            }
            Some(id) => {
                let existing = self
                    .rows
                    .get(&id)
                    .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id)))?;
                // Author is immutable once stored
                let updated = Review {
                    id: Some(id),
                    created_at: existing.created_at,
                    updated_at: Some(now),
                    author_id: existing.author_id,
                    ..review
                };
                if self
                    .rows
                    .values()
                    .any(|r| r.id != Some(id) && r.same_pos_and_author(&updated))
                {
                    return Err(duplicate(&updated));
                }
                updated
            }
        };

        if let Some(id) = stored.id {
            self.rows.insert(id, stored.clone());
        }
        self.writes += 1;
        Ok(stored)
    }
}

fn duplicate(review: &Review) -> ReviewError {
    ReviewError::DuplicateReview {
        pos_id: review.pos_id,
        author_id: review.author_id,
    }
}

pub struct InMemoryReviewStore {
    table: Mutex<ReviewTable>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(ReviewTable::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ReviewTable>> {
        self.table
            .lock()
            .map_err(|_| anyhow!("review store lock poisoned"))
    }

    /// Number of successful writes (inserts and updates) so far
    pub fn write_count(&self) -> usize {
        self.lock().map(|t| t.writes).unwrap_or_default()
    }

    /// Current stored rows ordered by id
    pub fn snapshot(&self) -> Vec<Review> {
        self.lock()
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseReviewStore for InMemoryReviewStore {
    async fn get_all(&self) -> Result<Vec<Review>> {
        Ok(self.lock()?.rows.values().cloned().collect())
    }

    async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    async fn upsert(&self, review: Review) -> Result<Review, ReviewError> {
        self.lock()?.write(review)
    }

    async fn filter(&self, pos_id: PosId, approved: bool) -> Result<Vec<Review>> {
        Ok(self
            .lock()?
            .rows
            .values()
            .filter(|r| r.pos_id == pos_id && r.approved == approved)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ReviewId) -> Result<bool> {
        Ok(self.lock()?.rows.remove(&id).is_some())
    }

    async fn update_locked(
        &self,
        id: ReviewId,
        mutation: ReviewMutation,
    ) -> Result<Review, ReviewError> {
        // The guard is held across load, mutation and write
        let mut table = self.lock()?;
        let current = table
            .rows
            .get(&id)
            .cloned()
            .ok_or(ReviewError::ReferenceNotFound(Reference::Review(id)))?;
        let next = mutation(current)?;
        table.write(Review {
            id: Some(id),
            ..next
        })
    }
}

// =============================================================================
// In-memory Lookups
// =============================================================================

pub struct InMemoryPosLookup {
    rows: Mutex<HashMap<PosId, Pos>>,
}

impl InMemoryPosLookup {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Register a point of sale with the given id
    pub fn insert(&self, id: PosId) -> Result<Pos> {
        let now = Utc::now();
        let pos = Pos {
            id,
            name: format!("POS {}", id),
            description: None,
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .map_err(|_| anyhow!("POS lookup lock poisoned"))?
            .insert(id, pos.clone());
        Ok(pos)
    }
}

impl Default for InMemoryPosLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePosLookup for InMemoryPosLookup {
    async fn find_by_id(&self, id: PosId) -> Result<Option<Pos>> {
        Ok(self
            .rows
            .lock()
            .map_err(|_| anyhow!("POS lookup lock poisoned"))?
            .get(&id)
            .cloned())
    }
}

pub struct InMemoryUserLookup {
    rows: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserLookup {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Register a user with the given id
    pub fn insert(&self, id: UserId) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id,
            login_name: format!("user{}", id),
            email_address: format!("user{}@example.org", id),
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .map_err(|_| anyhow!("user lookup lock poisoned"))?
            .insert(id, user.clone());
        Ok(user)
    }
}

impl Default for InMemoryUserLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseUserLookup for InMemoryUserLookup {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .map_err(|_| anyhow!("user lookup lock poisoned"))?
            .get(&id)
            .cloned())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// In-memory collaborators plus a handle on the approval threshold
pub struct TestDependencies {
    pub reviews: Arc<InMemoryReviewStore>,
    pub pos: Arc<InMemoryPosLookup>,
    pub users: Arc<InMemoryUserLookup>,
    pub approval: Arc<ApprovalConfig>,
}

impl TestDependencies {
    pub fn new(approval_min_count: i32) -> Self {
        Self {
            reviews: Arc::new(InMemoryReviewStore::new()),
            pos: Arc::new(InMemoryPosLookup::new()),
            users: Arc::new(InMemoryUserLookup::new()),
            approval: Arc::new(ApprovalConfig::new(approval_min_count)),
        }
    }

    /// Register points of sale
    pub fn with_pos(self, ids: &[i64]) -> Result<Self> {
        for id in ids {
            self.pos.insert(PosId::new(*id))?;
        }
        Ok(self)
    }

    /// Register users
    pub fn with_users(self, ids: &[i64]) -> Result<Self> {
        for id in ids {
            self.users.insert(UserId::new(*id))?;
        }
        Ok(self)
    }

    /// Build ServerDeps that share these in-memory collaborators
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.reviews.clone(),
            self.pos.clone(),
            self.users.clone(),
            self.approval.clone(),
        )
    }
}
