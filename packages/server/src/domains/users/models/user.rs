use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

/// User model - review authors and approvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub login_name: String,
    pub email_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub login_name: String,
    pub email_address: String,
}

impl User {
    /// Find user by ID, returning None if not found
    pub async fn find_by_id_optional(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Create a new user
    pub async fn create(input: CreateUser, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (login_name, email_address)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&input.login_name)
        .bind(&input.email_address)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }
}
