use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::{
    db::user::UserFilter,
    extractors::{AdminGuard, IsHtmx},
    names,
    rejections::{AppError, ResultExt},
    views, AppState,
};

use crate::views::users as users_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(users_page))
        .route("/admin/users/{id}/activate", post(activate_user))
        .route("/admin/users/{id}/block", post(block_user))
        .route("/admin/users/{id}/delete", post(delete_user))
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(names::DEFAULT_PAGE_SIZE)
            .clamp(1, names::MAX_PAGE_SIZE)
    }
}

async fn users_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Markup, AppError> {
    guard.require(&state, "users.view").await?;

    Ok(views::render(
        is_htmx,
        "Users",
        render_list(&state, &query).await?,
        Some(&guard.0),
    ))
}

async fn activate_user(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "users.edit").await?;

    state
        .db
        .set_user_status(user_id, "active")
        .await
        .reject("could not activate user")?;

    Ok(views::titled("Users", render_list(&state, &ListQuery::default()).await?))
}

async fn block_user(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "users.suspend").await?;

    state
        .db
        .set_user_status(user_id, "blocked")
        .await
        .reject("could not block user")?;

    Ok(views::titled("Users", render_list(&state, &ListQuery::default()).await?))
}

async fn delete_user(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "users.edit").await?;

    state
        .db
        .delete_user(user_id)
        .await
        .reject("could not delete user")?;

    Ok(views::titled("Users", render_list(&state, &ListQuery::default()).await?))
}

/// Fetch-and-render shared by the page and every refetch-after-write.
async fn render_list(state: &AppState, query: &ListQuery) -> Result<Markup, AppError> {
    let year = query.year.parse::<i64>().ok();
    let filter = UserFilter {
        search: query.search.clone(),
        status: query.status.clone(),
        year,
    };

    let page = state
        .db
        .list_users(&filter, query.page(), query.page_size())
        .await
        .reject("could not list users")?;

    let stats = state
        .db
        .user_statistics()
        .await
        .reject("could not load user statistics")?;

    Ok(users_views::users(users_views::UsersData {
        page,
        stats,
        search: query.search.clone(),
        status: query.status.clone(),
        year,
    }))
}
