use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::{
    db::question::QuestionFilter,
    extractors::{AdminGuard, IsHtmx},
    models::{OptionForm, QuestionForm},
    names,
    rejections::{AppError, ResultExt},
    services::questions as question_rules,
    views, AppState,
};

use crate::views::questions as questions_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/questions", get(questions_page).post(create_question))
        .route("/admin/questions/new", get(new_question_page))
        .route("/admin/questions/bulk", post(bulk_create))
        .route("/admin/questions/{id}", get(edit_question_page).post(update_question))
        .route("/admin/questions/{id}/delete", post(delete_question))
}

#[derive(Deserialize, Default)]
struct ListQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    module: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    page: Option<i64>,
}

async fn questions_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.view").await?;

    Ok(views::render(
        is_htmx,
        "Questions",
        render_list(&state, &query).await?,
        Some(&guard.0),
    ))
}

async fn new_question_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.create").await?;

    Ok(views::render(
        is_htmx,
        "New Question",
        questions_views::editor(questions_views::EditorData { existing: None, error: None }),
        Some(&guard.0),
    ))
}

async fn edit_question_page(
    guard: AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.edit").await?;

    let existing = state
        .db
        .get_question(question_id)
        .await
        .reject("could not load question")?;

    Ok(views::render(
        is_htmx,
        "Edit Question",
        questions_views::editor(questions_views::EditorData {
            existing: Some(existing),
            error: None,
        }),
        Some(&guard.0),
    ))
}

/// Flat form fields from the editor, reshaped into a [`QuestionForm`].
#[derive(Deserialize)]
struct EditorPost {
    question_text: String,
    module_name: String,
    #[serde(default)]
    course_name: String,
    year: i64,
    difficulty: String,
    #[serde(default)]
    explanation: String,
    option_a: String,
    option_b: String,
    option_c: String,
    option_d: String,
    #[serde(default)]
    correct: String,
}

impl EditorPost {
    fn into_form(self) -> QuestionForm {
        let options = [
            ("a", self.option_a),
            ("b", self.option_b),
            ("c", self.option_c),
            ("d", self.option_d),
        ]
        .into_iter()
        .map(|(letter, text)| OptionForm {
            letter: letter.to_string(),
            text,
            is_correct: self.correct == letter,
        })
        .collect();

        QuestionForm {
            question_text: self.question_text,
            module_name: self.module_name,
            course_name: self.course_name,
            year: self.year,
            difficulty: self.difficulty,
            explanation: self.explanation,
            options,
        }
    }
}

async fn create_question(
    guard: AdminGuard,
    State(state): State<AppState>,
    axum::extract::Form(body): axum::extract::Form<EditorPost>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.create").await?;

    let form = body.into_form();
    if let Err(error) = question_rules::validate(&form) {
        return Ok(views::titled(
            "New Question",
            questions_views::editor(questions_views::EditorData {
                existing: None,
                error: Some(error.message()),
            }),
        ));
    }

    state
        .db
        .create_question(&form)
        .await
        .reject("could not create question")?;

    Ok(views::titled(
        "Questions",
        render_list(&state, &ListQuery::default()).await?,
    ))
}

async fn update_question(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
    axum::extract::Form(body): axum::extract::Form<EditorPost>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.edit").await?;

    let form = body.into_form();
    if let Err(error) = question_rules::validate(&form) {
        let existing = state
            .db
            .get_question(question_id)
            .await
            .reject("could not load question")?;
        return Ok(views::titled(
            "Edit Question",
            questions_views::editor(questions_views::EditorData {
                existing: Some(existing),
                error: Some(error.message()),
            }),
        ));
    }

    state
        .db
        .update_question(question_id, &form)
        .await
        .reject("could not update question")?;

    Ok(views::titled(
        "Questions",
        render_list(&state, &ListQuery::default()).await?,
    ))
}

async fn delete_question(
    guard: AdminGuard,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.moderate").await?;

    state
        .db
        .delete_question(question_id)
        .await
        .reject("could not delete question")?;

    Ok(views::titled(
        "Questions",
        render_list(&state, &ListQuery::default()).await?,
    ))
}

/// Bulk import: each item is validated and submitted independently, in
/// order. Failures are reported per item and earlier successes stand.
async fn bulk_create(
    guard: AdminGuard,
    State(state): State<AppState>,
    Json(forms): Json<Vec<QuestionForm>>,
) -> Result<Markup, AppError> {
    guard.require(&state, "questions.create").await?;

    let mut results = Vec::with_capacity(forms.len());
    for (index, form) in forms.iter().enumerate() {
        let outcome = match question_rules::validate(form) {
            Err(error) => Err(error.message().to_string()),
            Ok(()) => state
                .db
                .create_question(form)
                .await
                .map_err(|e| {
                    tracing::warn!("bulk item {index} failed: {e}");
                    "database error".to_string()
                }),
        };
        results.push(questions_views::BulkItemResult { index, outcome });
    }

    Ok(views::titled("Bulk import", questions_views::bulk_report(&results)))
}

async fn render_list(state: &AppState, query: &ListQuery) -> Result<Markup, AppError> {
    let year = query.year.parse::<i64>().ok();
    let filter = QuestionFilter {
        search: query.search.clone(),
        module: query.module.clone(),
        difficulty: query.difficulty.clone(),
        year,
    };

    let page = state
        .db
        .list_questions(&filter, query.page.unwrap_or(1).max(1), names::DEFAULT_PAGE_SIZE)
        .await
        .reject("could not list questions")?;

    let modules = state.db.module_names().await.reject("could not get modules")?;

    Ok(questions_views::questions(questions_views::QuestionsData {
        page,
        modules,
        search: query.search.clone(),
        module: query.module.clone(),
        difficulty: query.difficulty.clone(),
        year,
    }))
}
