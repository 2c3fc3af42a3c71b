use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
///
/// `password` and `remember` are never read from or written to a row; they
/// carry plaintext from the client until the validator has hashed them.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub remember_hash: String,
    #[sqlx(skip)]
    pub password: String,
    #[sqlx(skip)]
    pub remember: String,
}

impl User {
    /// A not-yet-persisted user; `id` and timestamps are filled in by `create`.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            deleted_at: None,
            name: name.into(),
            email: email.into(),
            password_hash: String::new(),
            remember_hash: String::new(),
            password: password.into(),
            remember: String::new(),
        }
    }
}
