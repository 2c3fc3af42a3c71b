use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    auth::{token, Credentials},
    users::{errors::UserError, repo::UserDb, repo_types::User},
};

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,16}$").unwrap();
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes and validates input, hashes credentials, then hands the call
/// to the wrapped `UserDb` unchanged.
pub struct UserValidator<D> {
    db: D,
    credentials: Credentials,
}

impl<D: UserDb> UserValidator<D> {
    pub fn new(db: D, credentials: Credentials) -> Self {
        Self { db, credentials }
    }

    fn id_positive(id: i64) -> Result<(), UserError> {
        if id <= 0 {
            return Err(UserError::InvalidId);
        }
        Ok(())
    }

    fn password_required(user: &User) -> Result<(), UserError> {
        if user.password.is_empty() {
            return Err(UserError::PasswordRequired);
        }
        Ok(())
    }

    fn password_min_length(user: &User) -> Result<(), UserError> {
        if !user.password.is_empty() && user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::PasswordTooShort);
        }
        Ok(())
    }

    fn password_max_length(&self, user: &User) -> Result<(), UserError> {
        if user.password.len() > self.credentials.passwords.max_password_len() {
            return Err(UserError::PasswordTooLong);
        }
        Ok(())
    }

    fn bcrypt_password(&self, user: &mut User) -> Result<(), UserError> {
        if user.password.is_empty() {
            return Ok(());
        }
        user.password_hash = self.credentials.passwords.hash(&user.password)?;
        user.password.clear();
        Ok(())
    }

    fn password_hash_required(user: &User) -> Result<(), UserError> {
        if user.password_hash.is_empty() {
            return Err(UserError::PasswordHashRequired);
        }
        Ok(())
    }

    fn set_remember_if_unset(user: &mut User) -> Result<(), UserError> {
        if user.remember.is_empty() {
            user.remember = token::remember_token()?;
        }
        Ok(())
    }

    fn remember_min_bytes(user: &User) -> Result<(), UserError> {
        if user.remember.is_empty() {
            return Ok(());
        }
        match token::n_bytes(&user.remember) {
            Ok(n) if n >= token::REMEMBER_TOKEN_BYTES => Ok(()),
            _ => Err(UserError::RememberTooShort),
        }
    }

    fn hmac_remember(&self, user: &mut User) {
        if !user.remember.is_empty() {
            user.remember_hash = self.credentials.tokens.hash(&user.remember);
        }
    }

    fn remember_hash_required(user: &User) -> Result<(), UserError> {
        if user.remember_hash.is_empty() {
            return Err(UserError::RememberHashRequired);
        }
        Ok(())
    }

    fn email_format(user: &mut User) -> Result<(), UserError> {
        user.email = normalize_email(&user.email);
        if user.email.is_empty() {
            return Err(UserError::EmailRequired);
        }
        if !EMAIL_RE.is_match(&user.email) {
            return Err(UserError::EmailInvalid);
        }
        Ok(())
    }

    async fn email_available(&self, user: &User) -> Result<(), UserError> {
        match self.db.by_email(&user.email).await {
            Ok(existing) if existing.id != user.id => Err(UserError::EmailTaken),
            Ok(_) | Err(UserError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Checks shared by create and update once plaintext fields are settled.
    async fn finish(&self, user: &mut User) -> Result<(), UserError> {
        Self::password_min_length(user)?;
        self.password_max_length(user)?;
        self.bcrypt_password(user)?;
        Self::password_hash_required(user)?;
        Self::remember_min_bytes(user)?;
        self.hmac_remember(user);
        Self::remember_hash_required(user)?;
        Self::email_format(user)?;
        self.email_available(user).await
    }
}

#[async_trait]
impl<D: UserDb> UserDb for UserValidator<D> {
    async fn by_id(&self, id: i64) -> Result<User, UserError> {
        Self::id_positive(id)?;
        self.db.by_id(id).await
    }

    async fn by_email(&self, email: &str) -> Result<User, UserError> {
        self.db.by_email(&normalize_email(email)).await
    }

    /// Takes the raw token; only its digest reaches the inner layer.
    async fn by_remember(&self, token: &str) -> Result<User, UserError> {
        if token.is_empty() {
            return Err(UserError::RememberRequired);
        }
        let digest = self.credentials.tokens.hash(token);
        self.db.by_remember(&digest).await
    }

    async fn create(&self, user: &mut User) -> Result<(), UserError> {
        Self::password_required(user)?;
        Self::set_remember_if_unset(user)?;
        self.finish(user).await?;
        debug!(email = %user.email, "user passed validation");
        self.db.create(user).await
    }

    async fn update(&self, user: &mut User) -> Result<(), UserError> {
        Self::id_positive(user.id)?;
        self.finish(user).await?;
        self.db.update(user).await
    }

    async fn delete(&self, id: i64) -> Result<(), UserError> {
        Self::id_positive(id)?;
        self.db.delete(id).await
    }
}
