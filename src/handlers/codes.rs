use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use chrono::Utc;
use maud::{html, Markup};
use serde::Deserialize;

use crate::{
    db::code::CodeFilter,
    extractors::{AdminGuard, IsHtmx},
    names,
    rejections::{AppError, ResultExt},
    services::codes::{self, GenerateOutcome},
    views, AppState,
};

use crate::views::codes as codes_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/codes", get(codes_page))
        .route("/admin/codes/generate", post(generate_codes))
        .route("/admin/codes/download", get(download_codes))
        .route("/admin/codes/{id}/expire", post(expire_code))
}

#[derive(Deserialize, Default)]
struct ListQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    package: String,
    #[serde(default)]
    page: Option<i64>,
}

async fn codes_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Markup, AppError> {
    guard.require(&state, "codes.view").await?;

    Ok(views::render(
        is_htmx,
        "Access Codes",
        render_list(&state, &query, None).await?,
        Some(&guard.0),
    ))
}

#[derive(Deserialize)]
struct GeneratePost {
    #[serde(default)]
    package: String,
    #[serde(default)]
    count: String,
}

async fn generate_codes(
    guard: AdminGuard,
    State(state): State<AppState>,
    Form(body): Form<GeneratePost>,
) -> Result<Markup, AppError> {
    guard.require(&state, "codes.generate").await?;

    let count = body.count.parse::<i64>().unwrap_or(0);

    let outcome = state
        .codes
        .generate(&body.package, count)
        .await
        .reject("could not generate codes")?;

    let notice = match outcome {
        GenerateOutcome::Generated(codes) => codes_views::GenerateNotice::Generated(codes.len()),
        GenerateOutcome::UnknownPackage => codes_views::GenerateNotice::UnknownPackage,
        GenerateOutcome::InvalidCount => codes_views::GenerateNotice::InvalidCount,
    };

    Ok(views::titled(
        "Access Codes",
        render_list(&state, &ListQuery::default(), Some(notice)).await?,
    ))
}

#[derive(Deserialize, Default)]
struct DownloadQuery {
    #[serde(default)]
    package: String,
}

/// Plain-text export of the code list, served as a download.
async fn download_codes(
    guard: AdminGuard,
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<axum::response::Response, AppError> {
    guard.require(&state, "codes.download").await?;

    let codes = state
        .db
        .codes_for_export(&query.package)
        .await
        .reject("could not load codes for export")?;

    let body = codes::export_text(&codes);
    let filename = codes::export_filename(&query.package, Utc::now().date_naive());

    tracing::info!("exporting {} access codes to {filename}", codes.len());

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

async fn expire_code(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(code_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "codes.generate").await?;

    state
        .db
        .expire_code(code_id)
        .await
        .reject("could not expire code")?;

    Ok(views::titled(
        "Access Codes",
        render_list(&state, &ListQuery::default(), None).await?,
    ))
}

async fn render_list(
    state: &AppState,
    query: &ListQuery,
    notice: Option<codes_views::GenerateNotice>,
) -> Result<Markup, AppError> {
    let filter = CodeFilter {
        search: query.search.clone(),
        status: query.status.clone(),
        package: query.package.clone(),
    };

    let page = state
        .db
        .list_codes(&filter, query.page.unwrap_or(1).max(1), names::DEFAULT_PAGE_SIZE)
        .await
        .reject("could not list codes")?;

    let stats = state
        .db
        .code_statistics()
        .await
        .reject("could not load code statistics")?;

    let list = codes_views::codes(codes_views::CodesData {
        page,
        stats,
        search: query.search.clone(),
        status: query.status.clone(),
        package: query.package.clone(),
    });

    Ok(match notice {
        Some(notice) => html! {
            (codes_views::generate_notice(&notice))
            (list)
        },
        None => list,
    })
}
