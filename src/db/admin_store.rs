use chrono::Utc;

use crate::{
    db::DbPool,
    error::Result,
    models::auth::Admin,
    services::auth_service::hash_password,
};

/// Admin account store for database operations
#[derive(Clone)]
pub struct AdminStore {
    pool: DbPool,
}

impl AdminStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get an admin by email, if one exists
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ? COLLATE NOCASE")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    /// Store a new admin with an argon2 hash of the password
    pub async fn create_admin(&self, email: &str, name: &str, password: &str) -> Result<Admin> {
        let password_hash = hash_password(password)?;

        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (email, name, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(email.trim())
        .bind(name)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }
}
