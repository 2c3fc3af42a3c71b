use bcrypt::BcryptError;
use tracing::{error, warn};

/// bcrypt reads at most this many bytes of its input and ignores the rest.
pub const BCRYPT_MAX_INPUT: usize = 72;

/// Peppered bcrypt hashing for user passwords.
///
/// The pepper is appended to the plaintext before hashing, so a leaked
/// `users` table is useless without the application secret as well.
#[derive(Clone)]
pub struct PasswordHasher {
    pepper: String,
    cost: u32,
}

impl PasswordHasher {
    pub fn new(pepper: impl Into<String>, cost: u32) -> Self {
        Self {
            pepper: pepper.into(),
            cost,
        }
    }

    /// Longest plaintext, in bytes, whose pepper still reaches bcrypt.
    pub fn max_password_len(&self) -> usize {
        BCRYPT_MAX_INPUT.saturating_sub(self.pepper.len())
    }

    /// Callers must reject passwords longer than `max_password_len` first;
    /// past that bcrypt drops the pepper.
    pub fn hash(&self, plain: &str) -> Result<String, BcryptError> {
        bcrypt::hash(self.peppered(plain), self.cost).map_err(|e| {
            error!(error = %e, "bcrypt hash error");
            e
        })
    }

    /// `Ok(false)` on mismatch, including plaintexts too long to have been
    /// hashed. Errors only when `digest` is not a bcrypt hash.
    pub fn verify(&self, plain: &str, digest: &str) -> Result<bool, BcryptError> {
        if plain.len() > self.max_password_len() {
            warn!(len = plain.len(), "password longer than bcrypt input");
            return Ok(false);
        }
        bcrypt::verify(self.peppered(plain), digest).map_err(|e| {
            error!(error = %e, "bcrypt verify error");
            e
        })
    }

    fn peppered(&self, plain: &str) -> String {
        let mut s = String::with_capacity(plain.len() + self.pepper.len());
        s.push_str(plain);
        s.push_str(&self.pepper);
        s
    }
}
