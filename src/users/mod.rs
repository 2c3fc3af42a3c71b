use crate::state::AppState;
use axum::Router;

mod dto;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validator;

pub use errors::UserError;
pub use memory::MemoryUserDb;
pub use repo::{PgUserDb, UserDb};
pub use repo_types::User;
pub use services::UserService;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
