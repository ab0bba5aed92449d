//! User repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, UserIdentity};
use crate::utils::errors::BaropotError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the user unless a row with the same id or email already exists
    pub async fn insert_if_absent(&self, identity: &UserIdentity) -> Result<bool, BaropotError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT DO NOTHING
            "#
        )
        .bind(identity.id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, BaropotError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update the display name
    pub async fn update_name(&self, id: i64, name: &str) -> Result<Option<User>, BaropotError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
