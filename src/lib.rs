pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod services;
pub mod statics;
pub mod store;
pub mod utils;
pub mod views;

use axum::{middleware, Router};

use services::auth::AuthService;
use services::codes::CodeService;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub auth: AuthService,
    pub codes: CodeService,
    pub quizzes: store::QuizStore,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: db::Db, secure_cookies: bool) -> Self {
        AppState {
            auth: AuthService::new(db.clone()),
            codes: CodeService::new(db.clone()),
            quizzes: store::QuizStore::new(),
            db,
            secure_cookies,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::quiz::routes())
        .merge(handlers::calendar::routes())
        .merge(handlers::profile::routes())
        .merge(handlers::users::routes())
        .merge(handlers::questions::routes())
        .merge(handlers::codes::routes())
        .merge(handlers::admins::routes())
        .layer(middleware::from_fn(csrf_check))
        .nest("/static", statics::routes())
        .with_state(state)
}

/// State-changing requests must come from the htmx frontend; plain
/// cross-site form posts are refused.
async fn csrf_check(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;

    let state_changing = [Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

    if state_changing.contains(req.method()) {
        let has_hx_request = req
            .headers()
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        if !has_hx_request {
            return (StatusCode::FORBIDDEN, "CSRF check failed").into_response();
        }
    }

    next.run(req).await
}
