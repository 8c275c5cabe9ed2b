use axum::{
    extract::{Form, State},
    routing::{get, post},
    Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::{
    db::code::RedeemOutcome,
    extractors::{AuthGuard, IsHtmx},
    rejections::{AppError, ResultExt},
    services::auth::ChangePasswordOutcome,
    views, AppState,
};

use crate::views::profile as profile_views;
use crate::views::profile::{PasswordState, RedeemState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/student/profile", get(profile_page))
        .route("/change-password", post(change_password))
        .route("/redeem-code", post(redeem_code))
}

async fn profile_page(
    AuthGuard(user): AuthGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    Ok(views::render(
        is_htmx,
        "Profile",
        render_profile(&state, user.id, RedeemState::NoMessage, PasswordState::NoMessage).await?,
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct ChangePasswordPost {
    current_password: String,
    new_password: String,
}

async fn change_password(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Form(body): Form<ChangePasswordPost>,
) -> Result<Markup, AppError> {
    let outcome = state
        .auth
        .change_password(user.id, &body.current_password, &body.new_password)
        .await
        .reject("could not change password")?;

    let password_state = match outcome {
        ChangePasswordOutcome::Success => PasswordState::Success,
        ChangePasswordOutcome::EmptyFields => PasswordState::EmptyFields,
        ChangePasswordOutcome::WeakPassword => PasswordState::WeakPassword,
        ChangePasswordOutcome::IncorrectPassword => PasswordState::IncorrectPassword,
    };

    Ok(views::titled(
        "Profile",
        render_profile(&state, user.id, RedeemState::NoMessage, password_state).await?,
    ))
}

#[derive(Deserialize)]
struct RedeemPost {
    code: String,
}

async fn redeem_code(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Form(body): Form<RedeemPost>,
) -> Result<Markup, AppError> {
    let outcome = state
        .auth
        .redeem(user.id, body.code.trim())
        .await
        .reject("could not redeem code")?;

    let redeem_state = match outcome {
        RedeemOutcome::Redeemed { package } => RedeemState::Redeemed(package),
        RedeemOutcome::NotFound => RedeemState::NotFound,
        RedeemOutcome::AlreadyUsed => RedeemState::AlreadyUsed,
        RedeemOutcome::Expired => RedeemState::Expired,
    };

    Ok(views::titled(
        "Profile",
        render_profile(&state, user.id, redeem_state, PasswordState::NoMessage).await?,
    ))
}

async fn render_profile(
    state: &AppState,
    user_id: i64,
    redeem: RedeemState,
    password: PasswordState,
) -> Result<Markup, AppError> {
    let user = state.db.get_user(user_id).await.reject("could not load user")?;
    let attempts = state
        .db
        .list_attempts(user_id)
        .await
        .reject("could not load attempt history")?;

    Ok(profile_views::profile(profile_views::ProfileData {
        user,
        attempts,
        redeem,
        password,
    }))
}
