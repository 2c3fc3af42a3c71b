use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use tera::Context;
use tracing::{info, instrument};

use crate::{
    error::AppError,
    state::AppState,
    users::{
        dto::{LoginForm, PublicUser, SignupForm},
        extractors::{remember_set_cookie, CurrentUser},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", get(new).post(create))
        .route("/login", get(login_form).post(login))
        .route("/me", get(me))
}

/// GET /signup
#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(state.views.render("users/new.html", &Context::new())?)
}

/// POST /signup
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let mut user = User::new(form.name, form.email, form.password);
    state.users.create(&mut user).await?;
    info!(user_id = user.id, email = %user.email, "user signed up");
    sign_in(&state, &mut user).await
}

/// GET /login
#[instrument(skip(state))]
pub async fn login_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(state.views.render("users/login.html", &Context::new())?)
}

/// POST /login
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut user = state.users.authenticate(&form.email, &form.password).await?;
    info!(user_id = user.id, "user logged in");
    sign_in(&state, &mut user).await
}

/// GET /me
#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}

/// Hands the user's remember token to the browser and sends them home.
async fn sign_in(state: &AppState, user: &mut User) -> Result<Response, AppError> {
    let token = state.users.remember(user).await?;
    let cookie = remember_set_cookie(&token, state.config.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{app::build_app, users::extractors::remember_cookie};

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn token_from(res: &Response) -> Option<String> {
        let set = res.headers().get(header::SET_COOKIE)?.to_str().ok()?;
        let mut h = axum::http::HeaderMap::new();
        h.insert(header::COOKIE, set.split(';').next()?.parse().ok()?);
        remember_cookie(&h)
    }

    async fn body_text(res: Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn signup(app: &Router) -> Response {
        app.clone()
            .oneshot(form(
                "/signup",
                "name=Vinny&email=vinny%40gmail.com&password=red-wings-77",
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn signup_form_renders() {
        let app = build_app(AppState::fake().unwrap());
        let res = app
            .oneshot(Request::get("/signup").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("action=\"/signup\""));
    }

    #[tokio::test]
    async fn signup_sets_cookie_and_redirects() {
        let app = build_app(AppState::fake().unwrap());
        let res = signup(&app).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");
        let token = token_from(&res).expect("remember cookie");
        assert_eq!(token.len(), 44);
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let app = build_app(AppState::fake().unwrap());
        let res = app
            .oneshot(form("/signup", "name=V&email=v%40gmail.com&password=short"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let app = build_app(AppState::fake().unwrap());
        signup(&app).await;
        let res = signup(&app).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_with_correct_password_issues_cookie() {
        let state = AppState::fake().unwrap();
        let app = build_app(state.clone());
        let first = token_from(&signup(&app).await).unwrap();

        let res = app
            .oneshot(form("/login", "email=VINNY%40gmail.com&password=red-wings-77"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let token = token_from(&res).expect("remember cookie");
        assert_ne!(token, first);
        assert_eq!(state.users.by_remember(&token).await.unwrap().email, "vinny@gmail.com");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized_without_cookie() {
        let app = build_app(AppState::fake().unwrap());
        signup(&app).await;
        let res = app
            .oneshot(form("/login", "email=vinny%40gmail.com&password=not-my-password"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let app = build_app(AppState::fake().unwrap());
        let res = app
            .oneshot(form("/login", "email=ghost%40gmail.com&password=whatever123"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn me_resolves_remember_cookie() {
        let app = build_app(AppState::fake().unwrap());
        let token = token_from(&signup(&app).await).unwrap();

        let res = app
            .oneshot(
                Request::get("/me")
                    .header(header::COOKIE, format!("remember_token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["name"], "Vinny");
        assert_eq!(json["email"], "vinny@gmail.com");
        assert!(json["id"].as_i64().is_some_and(|id| id > 0));
        let created_at = json["created_at"].as_str().unwrap();
        assert!(time::OffsetDateTime::parse(
            created_at,
            &time::format_description::well_known::Rfc3339
        )
        .is_ok());
        assert!(json.get("password_hash").is_none());
        assert!(json.get("remember_hash").is_none());
    }

    #[tokio::test]
    async fn me_requires_a_known_cookie() {
        let app = build_app(AppState::fake().unwrap());
        let res = app
            .clone()
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .oneshot(
                Request::get("/me")
                    .header(header::COOKIE, "remember_token=bm90LWEtcmVhbC10b2tlbg==")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
