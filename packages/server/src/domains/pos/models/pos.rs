use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::PosId;

/// Point of sale - the entity reviews are written about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pos {
    pub id: PosId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new point of sale
#[derive(Debug, Clone)]
pub struct CreatePos {
    pub name: String,
    pub description: Option<String>,
}

impl Pos {
    /// Find POS by ID, returning None if not found
    pub async fn find_by_id_optional(id: PosId, pool: &PgPool) -> Result<Option<Self>> {
        let pos = sqlx::query_as::<_, Self>("SELECT * FROM pos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(pos)
    }

    /// Create a new point of sale
    pub async fn create(input: CreatePos, pool: &PgPool) -> Result<Self> {
        let pos = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO pos (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(pool)
        .await?;
        Ok(pos)
    }
}
