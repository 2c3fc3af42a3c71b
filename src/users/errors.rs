use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("resource not found")]
    NotFound,

    #[error("ID provided was invalid")]
    InvalidId,

    #[error("incorrect password provided")]
    InvalidPassword,

    #[error("email address is required")]
    EmailRequired,

    #[error("email address is not valid")]
    EmailInvalid,

    #[error("email address is already taken")]
    EmailTaken,

    #[error("password is required")]
    PasswordRequired,

    #[error("password must be at least 8 characters long")]
    PasswordTooShort,

    #[error("password is too long")]
    PasswordTooLong,

    #[error("password hash is required")]
    PasswordHashRequired,

    #[error("remember token is required")]
    RememberRequired,

    #[error("remember token must be at least 32 bytes")]
    RememberTooShort,

    #[error("remember hash is required")]
    RememberHashRequired,

    #[error("remember hash already belongs to another user")]
    RememberHashTaken,

    #[error("bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("entropy source: {0}")]
    Entropy(#[from] rand::Error),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl UserError {
    /// Errors caused by what the client sent, safe to echo back.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UserError::InvalidId
                | UserError::EmailRequired
                | UserError::EmailInvalid
                | UserError::EmailTaken
                | UserError::PasswordRequired
                | UserError::PasswordTooShort
                | UserError::PasswordTooLong
                | UserError::RememberRequired
                | UserError::RememberTooShort
        )
    }
}
