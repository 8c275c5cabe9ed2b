pub mod admins;
pub mod auth;
pub mod calendar;
pub mod codes;
pub mod profile;
pub mod questions;
pub mod quiz;
pub mod users;

use axum::{
    http::{
        header::{HeaderValue, LOCATION, SET_COOKIE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};

/// See-other redirect that also works for htmx requests (HX-Redirect
/// triggers a full-page navigation), optionally carrying a Set-Cookie.
pub(crate) fn redirect(to: &'static str, cookie: Option<String>) -> Response {
    let mut resp = StatusCode::SEE_OTHER.into_response();
    resp.headers_mut().insert(LOCATION, HeaderValue::from_static(to));
    resp.headers_mut()
        .insert("HX-Redirect", HeaderValue::from_static(to));
    if let Some(cookie) = cookie {
        if let Ok(value) = cookie.parse() {
            resp.headers_mut().insert(SET_COOKIE, value);
        }
    }
    resp
}
