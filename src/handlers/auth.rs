use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    db::code::RedeemOutcome,
    extractors::IsHtmx,
    names,
    rejections::{AppError, ResultExt},
    services::auth::{LoginOutcome, RegisterOutcome},
    utils, views, AppState,
};

use crate::views::auth as auth_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(homepage))
        .route("/login", get(login_page).post(login_post))
        .route("/register", get(register_page).post(register_post))
        .route("/logout", post(logout_post))
}

async fn homepage(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_id) = jar
        .get(names::USER_SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
    {
        if let Ok(Some(user)) = state.db.get_user_by_session(&session_id).await {
            let target = if user.is_admin() {
                names::ADMIN_USERS_URL
            } else {
                names::QUIZ_SETUP_URL
            };
            return Redirect::to(target);
        }
    }

    Redirect::to(names::LOGIN_URL)
}

async fn login_page(IsHtmx(is_htmx): IsHtmx) -> maud::Markup {
    views::render(is_htmx, "Log In", auth_views::login(auth_views::LoginState::NoError), None)
}

#[derive(Deserialize)]
struct LoginPost {
    email: String,
    password: String,
}

async fn login_post(
    State(state): State<AppState>,
    Form(body): Form<LoginPost>,
) -> Result<axum::response::Response, AppError> {
    let outcome = state
        .auth
        .login(&body.email, &body.password)
        .await
        .reject("login failed")?;

    let error_state = match outcome {
        LoginOutcome::Success(session_token) => {
            let cookie = utils::cookie(
                names::USER_SESSION_COOKIE_NAME,
                &session_token,
                state.secure_cookies,
            );
            return Ok(super::redirect("/", Some(cookie)));
        }
        LoginOutcome::InvalidCredentials => auth_views::LoginState::InvalidCredentials,
        LoginOutcome::Pending => auth_views::LoginState::Pending,
        LoginOutcome::Blocked => auth_views::LoginState::Blocked,
    };

    Ok(views::titled("Log In", auth_views::login(error_state)).into_response())
}

async fn register_page(IsHtmx(is_htmx): IsHtmx) -> maud::Markup {
    views::render(
        is_htmx,
        "Register",
        auth_views::register(auth_views::RegisterState::NoError),
        None,
    )
}

#[derive(Deserialize)]
struct RegisterPost {
    email: String,
    full_name: String,
    #[serde(default)]
    university: String,
    #[serde(default)]
    year: String,
    password: String,
    #[serde(default)]
    access_code: String,
}

async fn register_post(
    State(state): State<AppState>,
    Form(body): Form<RegisterPost>,
) -> Result<axum::response::Response, AppError> {
    let year = body.year.parse::<i64>().ok().filter(|y| (1..=5).contains(y));
    let access_code = (!body.access_code.is_empty()).then_some(body.access_code.as_str());

    let outcome = state
        .auth
        .register(
            &body.email,
            &body.password,
            &body.full_name,
            &body.university,
            year,
            access_code,
        )
        .await
        .reject("registration failed")?;

    let page = match outcome {
        RegisterOutcome::LoggedIn(session_token) => {
            let cookie = utils::cookie(
                names::USER_SESSION_COOKIE_NAME,
                &session_token,
                state.secure_cookies,
            );
            return Ok(super::redirect("/", Some(cookie)));
        }
        RegisterOutcome::PendingActivation => {
            views::titled("Registered", auth_views::registration_pending())
        }
        RegisterOutcome::CodeRejected(rejected) => {
            let reason = match rejected {
                RedeemOutcome::NotFound => "unknown code",
                RedeemOutcome::AlreadyUsed => "code already used",
                RedeemOutcome::Expired => "code expired",
                RedeemOutcome::Redeemed { .. } => unreachable!("redeemed is not a rejection"),
            };
            views::titled(
                "Register",
                auth_views::register(auth_views::RegisterState::CodeRejected(reason)),
            )
        }
        RegisterOutcome::EmptyFields => views::titled(
            "Register",
            auth_views::register(auth_views::RegisterState::EmptyFields),
        ),
        RegisterOutcome::WeakPassword => views::titled(
            "Register",
            auth_views::register(auth_views::RegisterState::WeakPassword),
        ),
        RegisterOutcome::EmailTaken => views::titled(
            "Register",
            auth_views::register(auth_views::RegisterState::EmailTaken),
        ),
    };

    Ok(page.into_response())
}

async fn logout_post(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    if let Some(session_id) = jar
        .get(names::USER_SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
    {
        state.auth.logout(&session_id).await.reject("logout failed")?;
    }

    Ok(super::redirect(
        names::LOGIN_URL,
        Some(utils::clear_cookie(names::USER_SESSION_COOKIE_NAME)),
    ))
}
