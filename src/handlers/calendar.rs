use axum::{
    extract::{Form, Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use maud::Markup;
use serde::Deserialize;

use crate::{
    db::models::CalendarEventRow,
    extractors::{AuthGuard, IsHtmx},
    models::EventForm,
    rejections::{AppError, ResultExt},
    views, AppState,
};

use crate::views::calendar as calendar_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/student/calendar", get(calendar_page).post(create_event))
        .route("/student/calendar/events/{id}", post(update_event))
        .route("/student/calendar/events/{id}/toggle", post(toggle_event))
        .route("/student/calendar/events/{id}/delete", post(delete_event))
}

#[derive(Deserialize, Default)]
struct FilterQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    upcoming: Option<String>,
    #[serde(default)]
    hide_completed: Option<String>,
}

async fn calendar_page(
    AuthGuard(user): AuthGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Markup, AppError> {
    let events = state
        .db
        .list_events(user.id)
        .await
        .reject("could not list events")?;

    Ok(views::render(
        is_htmx,
        "Calendar",
        render_filtered(events, &query),
        Some(&user),
    ))
}

async fn create_event(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Form(form): Form<EventForm>,
) -> Result<Markup, AppError> {
    if form.title.trim().is_empty() {
        return refetch(&state, user.id).await;
    }

    state
        .db
        .create_event(user.id, &form)
        .await
        .reject("could not create event")?;

    refetch(&state, user.id).await
}

async fn update_event(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Form(form): Form<EventForm>,
) -> Result<Markup, AppError> {
    state
        .db
        .update_event(event_id, user.id, &form)
        .await
        .reject("could not update event")?;

    refetch(&state, user.id).await
}

async fn toggle_event(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .toggle_event_completed(event_id, user.id)
        .await
        .reject("could not toggle event")?;

    refetch(&state, user.id).await
}

async fn delete_event(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .delete_event(event_id, user.id)
        .await
        .reject("could not delete event")?;

    refetch(&state, user.id).await
}

async fn refetch(state: &AppState, user_id: i64) -> Result<Markup, AppError> {
    let events = state
        .db
        .list_events(user_id)
        .await
        .reject("could not list events")?;

    Ok(views::titled(
        "Calendar",
        render_filtered(events, &FilterQuery::default()),
    ))
}

/// In-process filtering over the student's full event list, mirroring
/// the original's in-browser filtering: text match, type, priority,
/// completion, upcoming-only, tag.
fn render_filtered(events: Vec<CalendarEventRow>, query: &FilterQuery) -> Markup {
    let upcoming_only = query.upcoming.is_some();
    let hide_completed = query.hide_completed.is_some();
    let needle = query.search.to_lowercase();
    let now = Utc::now();

    let events: Vec<CalendarEventRow> = events
        .into_iter()
        .filter(|e| {
            needle.is_empty()
                || e.title.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
                || e.location.to_lowercase().contains(&needle)
        })
        .filter(|e| query.event_type.is_empty() || e.event_type == query.event_type)
        .filter(|e| query.priority.is_empty() || e.priority == query.priority)
        .filter(|e| query.tag.is_empty() || e.tag_list().iter().any(|t| *t == query.tag))
        .filter(|e| !upcoming_only || e.event_date >= now)
        .filter(|e| !hide_completed || !e.is_completed)
        .collect();

    calendar_views::calendar(calendar_views::CalendarData {
        events,
        search: query.search.clone(),
        event_type: query.event_type.clone(),
        priority: query.priority.clone(),
        upcoming_only,
        hide_completed,
        tag: query.tag.clone(),
    })
}
