use axum::{
    extract::{Form, Path, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use maud::Markup;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;

use crate::{
    extractors::{AuthGuard, IsHtmx},
    names,
    rejections::{AppError, ResultExt},
    services::quiz::{QuizQuestion, QuizSession},
    utils, views, AppState,
};

use crate::views::quiz as quiz_views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/student/quiz", get(setup_page))
        .route("/student/quiz/start", post(start_quiz))
        .route("/student/quiz/question/{idx}", get(show_question))
        .route("/student/quiz/select", post(select_option))
        .route("/student/quiz/eliminate", post(eliminate_option))
        .route("/student/quiz/reveal", post(reveal_answer))
        .route("/student/quiz/flag", post(toggle_flag))
        .route("/student/quiz/finish", post(finish_quiz))
        .route("/student/quiz/results", get(results_page))
        .route("/student/quiz/review", post(review_quiz))
        .route("/student/quiz/abandon", get(abandon_quiz))
}

// ---------------------------------------------------------------------------
// Session setup
// ---------------------------------------------------------------------------

async fn setup_page(
    AuthGuard(user): AuthGuard,
    IsHtmx(is_htmx): IsHtmx,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    let modules = state.db.module_names().await.reject("could not get modules")?;
    let total_questions = state
        .db
        .questions_count()
        .await
        .reject("could not get question count")?;

    Ok(views::render(
        is_htmx,
        "Quizzes",
        quiz_views::setup(quiz_views::SetupData { modules, total_questions }),
        Some(&user),
    ))
}

#[derive(Deserialize)]
struct StartQuizBody {
    #[serde(default)]
    module: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    question_count: String,
}

async fn start_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Form(body): Form<StartQuizBody>,
) -> Result<axum::response::Response, AppError> {
    let year = body.year.parse::<i64>().ok();
    let count = body
        .question_count
        .parse::<i64>()
        .unwrap_or(names::DEFAULT_QUESTION_COUNT)
        .clamp(names::MIN_QUESTION_COUNT, names::MAX_QUESTION_COUNT);

    let mut ids = state
        .db
        .question_ids_for_quiz(&body.module, year)
        .await
        .reject("could not select questions")?;

    if ids.is_empty() {
        return Ok(views::titled("Quiz Not Found", quiz_views::not_found()).into_response());
    }

    let mut rng = StdRng::seed_from_u64(rand::random());
    ids.shuffle(&mut rng);
    ids.truncate(count as usize);

    let questions: Vec<QuizQuestion> = state
        .db
        .get_questions_with_options(&ids)
        .await
        .reject("could not load questions")?
        .into_iter()
        .map(QuizQuestion::from)
        .filter(|q| !q.answer.is_empty())
        .collect();

    if questions.is_empty() {
        return Ok(views::titled("Quiz Not Found", quiz_views::not_found()).into_response());
    }

    let title = if body.module.is_empty() {
        "All Modules".to_string()
    } else {
        body.module.clone()
    };

    tracing::info!(
        "quiz started for user {}: {} questions, module='{}'",
        user.id,
        questions.len(),
        title,
    );

    let session = QuizSession::new(title, questions);
    let token = state.quizzes.insert(user.id, session, Utc::now());

    let page = state
        .quizzes
        .with_session(&token, user.id, Utc::now(), question_markup)
        .ok_or(AppError::Internal("quiz session vanished"))?;

    let cookie = utils::cookie(names::QUIZ_SESSION_COOKIE_NAME, &token, state.secure_cookies);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie.parse().expect("cookie header value"));

    Ok((headers, views::titled("Quiz", page)).into_response())
}

// ---------------------------------------------------------------------------
// In-progress operations
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OptionBody {
    question_id: i64,
    letter: String,
}

#[derive(Deserialize)]
struct QuestionBody {
    question_id: i64,
}

async fn show_question(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    Path(idx): Path<usize>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, move |session| session.go_to(idx)).await
}

async fn select_option(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(body): Form<OptionBody>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, move |session| {
        session.select_option(body.question_id, &body.letter)
    })
    .await
}

async fn eliminate_option(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(body): Form<OptionBody>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, move |session| {
        session.eliminate_option(body.question_id, &body.letter)
    })
    .await
}

async fn reveal_answer(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(body): Form<QuestionBody>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, move |session| {
        session.reveal_answer(body.question_id)
    })
    .await
}

async fn toggle_flag(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(body): Form<QuestionBody>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, move |session| {
        session.toggle_flag(body.question_id)
    })
    .await
}

async fn finish_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, QuizSession::finish).await
}

async fn results_page(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, |session| session.leave_review()).await
}

async fn review_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, &user, &jar, |session| session.enter_review()).await
}

async fn abandon_quiz(
    AuthGuard(user): AuthGuard,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<axum::response::Response, AppError> {
    if let Some(token) = quiz_token(&jar) {
        state.quizzes.remove(&token);
        tracing::info!("user {} abandoned their quiz", user.id);
    }

    let modules = state.db.module_names().await.reject("could not get modules")?;
    let total_questions = state
        .db
        .questions_count()
        .await
        .reject("could not get question count")?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        utils::clear_cookie(names::QUIZ_SESSION_COOKIE_NAME)
            .parse()
            .expect("cookie header value"),
    );

    Ok((
        headers,
        views::titled(
            "Quizzes",
            quiz_views::setup(quiz_views::SetupData { modules, total_questions }),
        ),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn quiz_token(jar: &CookieJar) -> Option<String> {
    jar.get(names::QUIZ_SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Outcome of one operation against the live session: what to render,
/// plus the summary to persist the first time the session is seen
/// completed.
struct Rendered {
    page: Markup,
    summary: Option<AttemptSummary>,
}

struct AttemptSummary {
    title: String,
    score_percent: i64,
    questions_count: i64,
    time_spent_seconds: i64,
}

/// Apply `op` to the session behind the quiz cookie, then render either
/// the current question or, once completed, the results page. The
/// wall-clock delta is fed to the countdown before `op` runs, so timer
/// expiry wins over any in-flight interaction.
async fn dispatch(
    state: &AppState,
    user: &crate::db::models::AuthUser,
    jar: &CookieJar,
    op: impl FnOnce(&mut QuizSession),
) -> Result<axum::response::Response, AppError> {
    let Some(token) = quiz_token(jar) else {
        return Ok(views::titled("Quiz Not Found", quiz_views::not_found()).into_response());
    };

    let rendered = state
        .quizzes
        .with_session(&token, user.id, Utc::now(), |session| {
            op(session);

            if session.is_completed() && !session.is_reviewing() {
                Rendered {
                    page: results_markup(session),
                    summary: Some(AttemptSummary {
                        title: session.title().to_string(),
                        score_percent: session.score().percent,
                        questions_count: session.len() as i64,
                        time_spent_seconds: session.time_spent_seconds() as i64,
                    }),
                }
            } else {
                Rendered { page: question_markup(session), summary: None }
            }
        });

    let Some(rendered) = rendered else {
        return Ok(views::titled("Quiz Not Found", quiz_views::not_found()).into_response());
    };

    if let Some(summary) = rendered.summary {
        if state.quizzes.record_once(&token, user.id) {
            state
                .db
                .record_attempt(
                    user.id,
                    &summary.title,
                    summary.score_percent,
                    summary.questions_count,
                    summary.time_spent_seconds,
                )
                .await
                .reject("could not record attempt")?;
        }
        return Ok(views::titled("Quiz Results", rendered.page).into_response());
    }

    Ok(views::titled("Quiz", rendered.page).into_response())
}

fn question_markup(session: &mut QuizSession) -> Markup {
    let question = session.current().clone();
    let qid = question.id;

    let palette = (0..session.len())
        .map(|i| {
            let entry_qid = session.question_at(i).map(|q| q.id).unwrap_or_default();
            quiz_views::PaletteEntry {
                answered: session.is_answered(entry_qid),
                flagged: session.is_flagged(entry_qid),
                current: i == session.current_index(),
            }
        })
        .collect();

    quiz_views::question(quiz_views::QuestionData {
        title: session.title().to_string(),
        index: session.current_index(),
        total: session.len(),
        selected: session.selected_letter(qid).map(str::to_string),
        eliminated: question
            .options
            .iter()
            .map(|o| o.letter.clone())
            .filter(|letter| session.is_eliminated(qid, letter))
            .collect(),
        revealed: session.is_revealed(qid),
        flagged: session.is_flagged(qid),
        remaining_seconds: session.remaining_seconds(),
        progress_percent: session.progress_percent(),
        palette,
        reviewing: session.is_reviewing(),
        question,
    })
}

fn results_markup(session: &mut QuizSession) -> Markup {
    let rows = session
        .questions()
        .iter()
        .enumerate()
        .map(|(index, q)| quiz_views::ResultRow {
            index,
            text: q.text.clone(),
            selected: session.selected_letter(q.id).map(str::to_string),
            answer: q.answer.clone(),
            correct: session.selected_letter(q.id) == Some(q.answer.as_str()),
            flagged: session.is_flagged(q.id),
        })
        .collect();

    quiz_views::results(quiz_views::ResultsData {
        title: session.title().to_string(),
        score: session.score(),
        feedback: session.feedback(),
        time_spent_seconds: session.time_spent_seconds(),
        rows,
    })
}
