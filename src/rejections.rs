use axum::{
    http::{header::HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{names, views};

/// Application-level error, rendered as an HTML error page with the
/// matching status code. `Unauthorized` additionally instructs htmx to
/// redirect to the login page, which is the one centrally handled error:
/// a dead session is recoverable only by logging in again.
#[derive(Debug)]
pub enum AppError {
    Internal(&'static str),
    Unauthorized,
    Forbidden,
    NotFound(&'static str),
    Input(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "session expired"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "admin privileges required"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Input(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let page = views::titled(
            "Error",
            html! {
                h1 { (message) }
                @if code == StatusCode::UNAUTHORIZED {
                    p { a href=(names::LOGIN_URL) { "Log in" } }
                }
            },
        );

        let mut resp = (code, page).into_response();
        if code == StatusCode::UNAUTHORIZED {
            resp.headers_mut()
                .insert("HX-Redirect", HeaderValue::from_static(names::LOGIN_URL));
        }
        resp
    }
}

/// Adapter from `color_eyre::Result` to `AppError`: logs the underlying
/// error and replaces it with a static, user-safe message.
pub trait ResultExt<T> {
    fn reject(self, msg: &'static str) -> Result<T, AppError>;
    fn reject_input(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{msg}: {e}");
            AppError::Internal(msg)
        })
    }

    fn reject_input(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{msg}: {e}");
            AppError::Input(msg)
        })
    }
}
