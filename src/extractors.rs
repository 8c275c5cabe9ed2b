use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::{db::models::AuthUser, names, rejections::AppError, AppState};

/// Extracts whether the request is an HTMX request by checking the
/// `HX-Request` header.
pub struct IsHtmx(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for IsHtmx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get("HX-Request")
            .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
            .is_some_and(|v| v == "true");
        Ok(IsHtmx(is_htmx))
    }
}

/// Guard extractor that verifies the user session cookie against the
/// database. Carries the authenticated user's info for use in handlers.
pub struct AuthGuard(pub AuthUser);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        if let Some(session_id) = jar
            .get(names::USER_SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
        {
            if let Ok(Some(user)) = state.db.get_user_by_session(&session_id).await {
                return Ok(AuthGuard(user));
            }
        }

        Err(AppError::Unauthorized)
    }
}

/// Guard extractor for the admin back office: an authenticated user whose
/// role is one of the admin roles. Per-operation permission checks go
/// through [`AdminGuard::require`].
pub struct AdminGuard(pub AuthUser);

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthGuard(user) = AuthGuard::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden);
        }

        Ok(AdminGuard(user))
    }
}

impl AdminGuard {
    /// Check one permission key against the admin account's stored list.
    /// A super_admin implicitly holds the full catalog; this is enforced
    /// here, server-side, never synthesized by a client.
    pub async fn require(&self, state: &AppState, permission: &str) -> Result<(), AppError> {
        if self.0.is_super_admin() {
            return Ok(());
        }

        let account = state
            .db
            .get_admin_account_by_user(self.0.id)
            .await
            .map_err(|e| {
                tracing::error!("could not load admin account for {}: {e}", self.0.id);
                AppError::Internal("could not load admin account")
            })?;

        let allowed = account
            .map(|a| a.permission_list().iter().any(|p| p == permission))
            .unwrap_or(false);

        if allowed {
            Ok(())
        } else {
            tracing::warn!("user {} denied permission {permission}", self.0.id);
            Err(AppError::Forbidden)
        }
    }
}
