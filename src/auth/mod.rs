use anyhow::anyhow;

use crate::config::AuthConfig;

pub mod hash;
pub mod password;
pub mod token;

pub use hash::TokenHasher;
pub use password::PasswordHasher;

/// Everything needed to turn user-supplied secrets into storable digests.
#[derive(Clone)]
pub struct Credentials {
    pub passwords: PasswordHasher,
    pub tokens: TokenHasher,
}

impl Credentials {
    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let tokens = TokenHasher::new(&cfg.hmac_secret)
            .map_err(|e| anyhow!("build remember token hmac: {e}"))?;
        Ok(Self {
            passwords: PasswordHasher::new(cfg.pepper.clone(), cfg.bcrypt_cost),
            tokens,
        })
    }
}
