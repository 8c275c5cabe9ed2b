use axum::{
    extract::{Path, RawForm, State},
    routing::{get, post},
    Router,
};
use maud::Markup;

use crate::{
    extractors::{AdminGuard, IsHtmx},
    names,
    rejections::{AppError, ResultExt},
    views, AppState,
};

use crate::views::admins as admins_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/accounts", get(admins_page).post(create_admin))
        .route("/admin/accounts/{id}", post(update_admin))
        .route("/admin/accounts/{id}/delete", post(delete_admin))
}

async fn admins_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    require_super_admin(&guard)?;

    Ok(views::render(
        is_htmx,
        "Admin Accounts",
        render_list(&state, None).await?,
        Some(&guard.0),
    ))
}

/// The permission checkboxes repeat the `permissions` key, which the
/// standard form extractor folds down to one value, so the raw body is
/// parsed by hand here.
struct CreateAdminPost {
    email: String,
    role: String,
    permissions: Vec<String>,
}

fn parse_create_form(body: &[u8]) -> CreateAdminPost {
    let mut form = CreateAdminPost {
        email: String::new(),
        role: String::new(),
        permissions: Vec::new(),
    };

    let body = String::from_utf8_lossy(body);
    for pair in body.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = value.replace('+', " ");
        let Ok(value) = urlencoding::decode(&value) else {
            continue;
        };
        match key {
            "email" => form.email = value.into_owned(),
            "role" => form.role = value.into_owned(),
            "permissions" => form.permissions.push(value.into_owned()),
            _ => {}
        }
    }

    form
}

async fn create_admin(
    guard: AdminGuard,
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Markup, AppError> {
    require_super_admin(&guard)?;

    let form = parse_create_form(&body);

    if !names::ADMIN_ROLES.contains(&form.role.as_str()) {
        return error_page(&state, "Unknown admin role").await;
    }

    let user = state
        .db
        .find_user_by_email(&form.email)
        .await
        .reject("could not look up user")?;

    let Some(user) = user else {
        return error_page(&state, "No user with that email").await;
    };

    if user.is_admin() {
        return error_page(&state, "That user is already an admin").await;
    }

    // Unknown permission keys are dropped rather than stored.
    let permissions: Vec<String> = form
        .permissions
        .into_iter()
        .filter(|p| names::PERMISSIONS.iter().any(|(key, _)| key == p))
        .collect();

    state
        .db
        .create_admin_account(user.id, &form.role, &permissions)
        .await
        .reject("could not create admin account")?;

    Ok(views::titled("Admin Accounts", render_list(&state, None).await?))
}

async fn update_admin(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    RawForm(body): RawForm,
) -> Result<Markup, AppError> {
    require_super_admin(&guard)?;

    let form = parse_create_form(&body);

    if !names::ADMIN_ROLES.contains(&form.role.as_str()) {
        return error_page(&state, "Unknown admin role").await;
    }

    let permissions: Vec<String> = form
        .permissions
        .into_iter()
        .filter(|p| names::PERMISSIONS.iter().any(|(key, _)| key == p))
        .collect();

    state
        .db
        .update_admin_account(account_id, &form.role, &permissions)
        .await
        .reject("could not update admin account")?;

    Ok(views::titled("Admin Accounts", render_list(&state, None).await?))
}

async fn delete_admin(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Markup, AppError> {
    require_super_admin(&guard)?;

    let account = state
        .db
        .get_admin_account(account_id)
        .await
        .reject("could not load admin account")?;

    if account.user_id == guard.0.id {
        return error_page(&state, "You cannot remove your own admin account").await;
    }

    state
        .db
        .delete_admin_account(account_id)
        .await
        .reject("could not delete admin account")?;

    Ok(views::titled("Admin Accounts", render_list(&state, None).await?))
}

fn require_super_admin(guard: &AdminGuard) -> Result<(), AppError> {
    if guard.0.is_super_admin() {
        Ok(())
    } else {
        tracing::warn!("user {} denied admin account management", guard.0.id);
        Err(AppError::Forbidden)
    }
}

async fn error_page(state: &AppState, error: &'static str) -> Result<Markup, AppError> {
    Ok(views::titled("Admin Accounts", render_list(state, Some(error)).await?))
}

async fn render_list(state: &AppState, error: Option<&'static str>) -> Result<Markup, AppError> {
    let accounts = state
        .db
        .list_admin_accounts()
        .await
        .reject("could not list admin accounts")?;

    Ok(admins_views::admins(admins_views::AdminsData { accounts, error }))
}
