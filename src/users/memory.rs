use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::users::{errors::UserError, repo::UserDb, repo_types::User};

/// In-process `UserDb` with the same observable behavior as `PgUserDb`:
/// sequential ids from 1, unique emails and remember hashes, soft deletes.
#[derive(Default)]
pub struct MemoryUserDb {
    table: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<User>,
}

impl Table {
    fn live(&self) -> impl Iterator<Item = &User> {
        self.rows.iter().filter(|u| u.deleted_at.is_none())
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Result<User, UserError> {
        self.live().find(|&u| pred(u)).cloned().ok_or(UserError::NotFound)
    }

    /// Uniqueness spans soft-deleted rows too, like the table constraints.
    fn check_unique(&self, user: &User, except_id: i64) -> Result<(), UserError> {
        let others = || self.rows.iter().filter(move |u| u.id != except_id);
        if others().any(|u| u.email == user.email) {
            return Err(UserError::EmailTaken);
        }
        if others().any(|u| u.remember_hash == user.remember_hash) {
            return Err(UserError::RememberHashTaken);
        }
        Ok(())
    }
}

/// Only the persisted columns; plaintext fields are not stored.
fn stored(user: &User) -> User {
    User {
        password: String::new(),
        remember: String::new(),
        ..user.clone()
    }
}

impl MemoryUserDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row, soft-deleted ones included.
    pub async fn rows(&self) -> Vec<User> {
        self.table.lock().await.rows.clone()
    }
}

#[async_trait]
impl UserDb for MemoryUserDb {
    async fn by_id(&self, id: i64) -> Result<User, UserError> {
        self.table.lock().await.find(|u| u.id == id)
    }

    async fn by_email(&self, email: &str) -> Result<User, UserError> {
        self.table.lock().await.find(|u| u.email == email)
    }

    async fn by_remember(&self, remember_hash: &str) -> Result<User, UserError> {
        self.table
            .lock()
            .await
            .find(|u| u.remember_hash == remember_hash)
    }

    async fn create(&self, user: &mut User) -> Result<(), UserError> {
        let mut table = self.table.lock().await;
        table.check_unique(user, 0)?;
        table.next_id += 1;
        let now = OffsetDateTime::now_utc();
        user.id = table.next_id;
        user.created_at = now;
        user.updated_at = now;
        user.deleted_at = None;
        table.rows.push(stored(user));
        Ok(())
    }

    async fn update(&self, user: &mut User) -> Result<(), UserError> {
        let mut table = self.table.lock().await;
        table.check_unique(user, user.id)?;
        let row = table
            .rows
            .iter_mut()
            .find(|u| u.id == user.id && u.deleted_at.is_none())
            .ok_or(UserError::NotFound)?;
        user.updated_at = OffsetDateTime::now_utc();
        user.created_at = row.created_at;
        *row = stored(user);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), UserError> {
        let mut table = self.table.lock().await;
        let row = table
            .rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .ok_or(UserError::NotFound)?;
        row.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}
