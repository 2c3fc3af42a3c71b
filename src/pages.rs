use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use tera::Context;
use tracing::instrument;

use crate::{error::AppError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/contact", get(contact))
}

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(state.views.render("static/home.html", &Context::new())?)
}

#[instrument(skip(state))]
pub async fn contact(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(state.views.render("static/contact.html", &Context::new())?)
}

/// Fallback for every unmatched route.
pub async fn not_found(
    State(state): State<AppState>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let page = state.views.render("static/not_found.html", &Context::new())?;
    Ok((StatusCode::NOT_FOUND, page))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;

    async fn get(uri: &str) -> (StatusCode, String) {
        let app = build_app(AppState::fake().unwrap());
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn home_page() {
        let (status, body) = get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Welcome"));
    }

    #[tokio::test]
    async fn contact_page() {
        let (status, body) = get("/contact").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("mailto:"));
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found_page() {
        let (status, body) = get("/no/such/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
    }
}
