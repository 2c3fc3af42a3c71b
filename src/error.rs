use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::users::UserError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    User(#[from] UserError),

    #[error("template: {0}")]
    Template(#[from] tera::Error),

    #[error("sign in required")]
    Unauthenticated,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::User(UserError::NotFound) => StatusCode::NOT_FOUND,
            AppError::User(UserError::InvalidPassword) | AppError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AppError::User(UserError::EmailTaken) => StatusCode::CONFLICT,
            AppError::User(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            AppError::User(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "Something went wrong. Please try again.").into_response();
        }
        warn!(error = %self, %status, "request rejected");
        (status, self.to_string()).into_response()
    }
}
