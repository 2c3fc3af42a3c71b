use anyhow::{bail, Context};
use serde::Deserialize;

use crate::{auth::password::BCRYPT_MAX_INPUT, users::validator::MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub pepper: String,
    pub hmac_secret: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub template_dir: String,
    pub cookie_secure: bool,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            pepper: parse_pepper(std::env::var("USER_PW_PEPPER")?)?,
            hmac_secret: std::env::var("HMAC_SECRET_KEY")?,
            bcrypt_cost: parse_bcrypt_cost(std::env::var("BCRYPT_COST").ok())?,
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3000),
            template_dir: std::env::var("TEMPLATE_DIR").unwrap_or_else(|_| "templates".into()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            auth,
        })
    }
}

/// Unset means `bcrypt::DEFAULT_COST`; anything set must be a cost bcrypt accepts.
fn parse_bcrypt_cost(raw: Option<String>) -> anyhow::Result<u32> {
    let Some(raw) = raw else {
        return Ok(bcrypt::DEFAULT_COST);
    };
    let cost = raw
        .trim()
        .parse::<u32>()
        .with_context(|| format!("BCRYPT_COST must be an integer, got {raw:?}"))?;
    if !(4..=31).contains(&cost) {
        bail!("BCRYPT_COST must be between 4 and 31, got {cost}");
    }
    Ok(cost)
}

/// The pepper shares bcrypt's 72-byte input with the password, so it must
/// leave room for at least a minimum-length one.
fn parse_pepper(pepper: String) -> anyhow::Result<String> {
    if pepper.len() + MIN_PASSWORD_LEN > BCRYPT_MAX_INPUT {
        bail!(
            "USER_PW_PEPPER is {} bytes; at most {} allowed",
            pepper.len(),
            BCRYPT_MAX_INPUT - MIN_PASSWORD_LEN
        );
    }
    Ok(pepper)
}
