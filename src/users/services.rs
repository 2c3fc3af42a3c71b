use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    auth::{token, Credentials},
    users::{errors::UserError, repo::UserDb, repo_types::User, validator::UserValidator},
};

/// Entry point the HTTP layer talks to.
///
/// Lookups and mutations go through the validator chain; `authenticate` and
/// `remember` build on top of them.
pub struct UserService {
    db: UserValidator<Arc<dyn UserDb>>,
    credentials: Credentials,
}

impl UserService {
    pub fn new(db: Arc<dyn UserDb>, credentials: Credentials) -> Self {
        Self {
            db: UserValidator::new(db, credentials.clone()),
            credentials,
        }
    }

    pub async fn by_id(&self, id: i64) -> Result<User, UserError> {
        self.db.by_id(id).await
    }

    pub async fn by_email(&self, email: &str) -> Result<User, UserError> {
        self.db.by_email(email).await
    }

    /// `token` is the raw cookie value.
    pub async fn by_remember(&self, token: &str) -> Result<User, UserError> {
        self.db.by_remember(token).await
    }

    pub async fn create(&self, user: &mut User) -> Result<(), UserError> {
        self.db.create(user).await
    }

    pub async fn update(&self, user: &mut User) -> Result<(), UserError> {
        self.db.update(user).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        self.db.delete(id).await
    }

    /// `NotFound` for an unknown email, `InvalidPassword` for a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let user = self.db.by_email(email).await?;
        if !self.credentials.passwords.verify(password, &user.password_hash)? {
            warn!(user_id = user.id, "password mismatch");
            return Err(UserError::InvalidPassword);
        }
        Ok(user)
    }

    /// Plaintext remember token for `user`, issuing and persisting a new one
    /// when the user does not carry one. `user` is left untouched if the
    /// new token cannot be stored.
    pub async fn remember(&self, user: &mut User) -> Result<String, UserError> {
        if user.remember.is_empty() {
            let mut issued = user.clone();
            issued.remember = token::remember_token()?;
            self.db.update(&mut issued).await?;
            *user = issued;
            debug!(user_id = user.id, "remember token issued");
        }
        Ok(user.remember.clone())
    }
}
