use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::debug;

use crate::users::{errors::UserError, repo_types::User};

/// Storage capability for user records.
///
/// Lookups return `UserError::NotFound` when no live (not soft-deleted) row
/// matches. `create` and `update` fill in ids and timestamps on the passed
/// user and persist only the hashed credential columns.
#[async_trait]
pub trait UserDb: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<User, UserError>;
    async fn by_email(&self, email: &str) -> Result<User, UserError>;
    /// Looks up by the stored digest, not the raw token.
    async fn by_remember(&self, remember_hash: &str) -> Result<User, UserError>;
    async fn create(&self, user: &mut User) -> Result<(), UserError>;
    async fn update(&self, user: &mut User) -> Result<(), UserError>;
    async fn delete(&self, id: i64) -> Result<(), UserError>;
}

#[async_trait]
impl<T: UserDb + ?Sized> UserDb for Arc<T> {
    async fn by_id(&self, id: i64) -> Result<User, UserError> {
        (**self).by_id(id).await
    }
    async fn by_email(&self, email: &str) -> Result<User, UserError> {
        (**self).by_email(email).await
    }
    async fn by_remember(&self, remember_hash: &str) -> Result<User, UserError> {
        (**self).by_remember(remember_hash).await
    }
    async fn create(&self, user: &mut User) -> Result<(), UserError> {
        (**self).create(user).await
    }
    async fn update(&self, user: &mut User) -> Result<(), UserError> {
        (**self).update(user).await
    }
    async fn delete(&self, id: i64) -> Result<(), UserError> {
        (**self).delete(id).await
    }
}

macro_rules! select_user_by {
    ($column:literal) => {
        concat!(
            "SELECT id, created_at, updated_at, deleted_at, name, email, password_hash, remember_hash ",
            "FROM users WHERE ",
            $column,
            " = $1 AND deleted_at IS NULL LIMIT 1"
        )
    };
}

/// Postgres-backed `UserDb`.
#[derive(Clone)]
pub struct PgUserDb {
    pool: PgPool,
}

impl PgUserDb {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn auto_migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Wipes every user and restarts ids at 1.
    pub async fn destructive_reset(&self) -> Result<(), sqlx::Error> {
        sqlx::query("TRUNCATE TABLE users RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn write_error(e: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db) = &e {
        match db.constraint() {
            Some("users_email_key") => return UserError::EmailTaken,
            Some("users_remember_hash_key") => return UserError::RememberHashTaken,
            _ => {}
        }
    }
    UserError::Database(e)
}

#[async_trait]
impl UserDb for PgUserDb {
    async fn by_id(&self, id: i64) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(select_user_by!("id"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn by_email(&self, email: &str) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(select_user_by!("email"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn by_remember(&self, remember_hash: &str) -> Result<User, UserError> {
        sqlx::query_as::<_, User>(select_user_by!("remember_hash"))
            .bind(remember_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn create(&self, user: &mut User) -> Result<(), UserError> {
        let (id, created_at, updated_at) =
            sqlx::query_as::<_, (i64, OffsetDateTime, OffsetDateTime)>(
                r#"
                INSERT INTO users (name, email, password_hash, remember_hash)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, updated_at
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.remember_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        user.id = id;
        user.created_at = created_at;
        user.updated_at = updated_at;
        debug!(user_id = id, "user row inserted");
        Ok(())
    }

    async fn update(&self, user: &mut User) -> Result<(), UserError> {
        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, remember_hash = $4, updated_at = now()
            WHERE id = $5 AND deleted_at IS NULL
            RETURNING updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.remember_hash)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?
        .ok_or(UserError::NotFound)?;
        user.updated_at = updated_at;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), UserError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }
        debug!(user_id = id, "user soft-deleted");
        Ok(())
    }
}
