use maud::{html, Markup};

use crate::names;
use crate::services::quiz::{Feedback, QuizQuestion, Score};
use crate::utils;

pub struct SetupData {
    pub modules: Vec<String>,
    pub total_questions: i64,
}

pub fn setup(data: SetupData) -> Markup {
    html! {
        h1 { "Start a quiz" }
        p { (data.total_questions) " questions in the bank." }
        form hx-post=(names::START_QUIZ_URL) hx-target="main" {
            label {
                "Module"
                select name="module" {
                    option value="" { "All modules" }
                    @for module in &data.modules {
                        option value=(module) { (module) }
                    }
                }
            }
            label {
                "Year"
                select name="year" {
                    option value="" { "All years" }
                    @for year in 1..=5 {
                        option value=(year) { (year) }
                    }
                }
            }
            label {
                "Number of questions"
                input type="number" name="question_count"
                      value=(names::DEFAULT_QUESTION_COUNT)
                      min=(names::MIN_QUESTION_COUNT)
                      max=(names::MAX_QUESTION_COUNT);
            }
            button type="submit" { "Start quiz" }
        }
    }
}

pub fn not_found() -> Markup {
    html! {
        h1 { "Quiz Not Found" }
        p { "No questions match this selection, or the session has ended." }
        p {
            a href=(names::QUIZ_SETUP_URL)
              hx-get=(names::QUIZ_SETUP_URL)
              hx-target="main" { "Back to quizzes" }
        }
    }
}

pub struct PaletteEntry {
    pub answered: bool,
    pub flagged: bool,
    pub current: bool,
}

pub struct QuestionData {
    pub title: String,
    pub question: QuizQuestion,
    pub index: usize,
    pub total: usize,
    pub selected: Option<String>,
    pub eliminated: Vec<String>,
    pub revealed: bool,
    pub flagged: bool,
    pub remaining_seconds: u32,
    pub progress_percent: i64,
    pub palette: Vec<PaletteEntry>,
    pub reviewing: bool,
}

pub fn question(data: QuestionData) -> Markup {
    let qid = data.question.id;
    let show_result = data.revealed || data.reviewing;

    html! {
        p { "Quiz: " mark { (data.title) } }
        article {
            div class="quiz-header" {
                p {
                    "Question " strong { (data.index + 1) } " of " (data.total)
                    " · " (data.progress_percent) "% answered"
                }
                @if !data.reviewing {
                    span class="timer" id="quiz-timer"
                         data-remaining=(data.remaining_seconds) {
                        (utils::format_time(data.remaining_seconds))
                    }
                }
                button type="button"
                       class=(if data.flagged { "flag-btn active" } else { "flag-btn" })
                       hx-post=(names::QUIZ_FLAG_URL)
                       hx-vals=(format!(r#"{{"question_id": {qid}}}"#))
                       hx-target="main"
                       title=(if data.flagged { "Unflag question" } else { "Flag for review" }) {
                    "\u{2691}"
                }
            }

            h3 { (data.question.text) }
            p class="module-tag" { (data.question.module) }

            fieldset {
                @for opt in &data.question.options {
                    @let is_selected = data.selected.as_deref() == Some(opt.letter.as_str());
                    @let is_eliminated = data.eliminated.contains(&opt.letter);
                    @let css_class = if show_result && opt.letter == data.question.answer {
                        "option-correct"
                    } else if show_result && is_selected {
                        "option-incorrect"
                    } else if is_eliminated {
                        "option-eliminated"
                    } else {
                        "option-neutral"
                    };

                    div class=(css_class) {
                        @if show_result {
                            label {
                                input type="radio" name="option" value=(opt.letter)
                                      checked[is_selected] disabled;
                                strong { (opt.letter.to_uppercase()) ". " }
                                (opt.text)
                                @if opt.letter == data.question.answer {
                                    span class="badge badge-correct" { "Correct" }
                                } @else if is_selected {
                                    span class="badge badge-incorrect" { "Your answer" }
                                }
                            }
                        } @else {
                            label {
                                input type="radio" name="option" value=(opt.letter)
                                      checked[is_selected] disabled[is_eliminated]
                                      hx-post=(names::QUIZ_SELECT_URL)
                                      hx-vals=(format!(r#"{{"question_id": {qid}, "letter": "{}"}}"#, opt.letter))
                                      hx-target="main";
                                strong { (opt.letter.to_uppercase()) ". " }
                                (opt.text)
                            }
                            button type="button" class="eliminate-btn"
                                   hx-post=(names::QUIZ_ELIMINATE_URL)
                                   hx-vals=(format!(r#"{{"question_id": {qid}, "letter": "{}"}}"#, opt.letter))
                                   hx-target="main"
                                   title=(if is_eliminated { "Restore option" } else { "Eliminate option" }) {
                                "\u{2715}"
                            }
                        }
                    }
                }
            }

            @if show_result && !data.question.explanation.is_empty() {
                div class="explanation" { (data.question.explanation) }
            }

            div class="quiz-nav" {
                @if data.index > 0 {
                    button type="button"
                           hx-get=(names::quiz_question_url(data.index - 1))
                           hx-target="main" { "Previous" }
                }
                @if !show_result && data.selected.is_some() {
                    button type="button"
                           hx-post=(names::QUIZ_REVEAL_URL)
                           hx-vals=(format!(r#"{{"question_id": {qid}}}"#))
                           hx-target="main" { "Show answer" }
                }
                @if data.index + 1 < data.total {
                    button type="button"
                           hx-get=(names::quiz_question_url(data.index + 1))
                           hx-target="main" { "Next" }
                } @else if data.reviewing {
                    button type="button"
                           hx-get=(names::QUIZ_RESULTS_URL)
                           hx-target="main" { "Back to results" }
                } @else {
                    (super::components::confirm_button(
                        "finish-dialog",
                        "Finish Quiz",
                        "Finish the quiz now? Unanswered questions count as incorrect.",
                        names::QUIZ_FINISH_URL,
                    ))
                }
            }
        }

        nav class="palette" {
            @for (i, entry) in data.palette.iter().enumerate() {
                @let class = match (entry.current, entry.answered, entry.flagged) {
                    (true, _, _) => "palette-current",
                    (_, true, true) => "palette-answered palette-flagged",
                    (_, true, false) => "palette-answered",
                    (_, false, true) => "palette-flagged",
                    _ => "palette-open",
                };
                button type="button" class=(class)
                       hx-get=(names::quiz_question_url(i))
                       hx-target="main" {
                    (i + 1)
                }
            }
        }

        @if !data.reviewing {
            p {
                a hx-get=(names::QUIZ_ABANDON_URL) hx-target="main"
                  style="cursor: pointer; text-decoration: underline;" {
                    "Abandon quiz"
                }
            }
            // Client-side countdown is cosmetic; the server clock decides.
            script {
                (maud::PreEscaped(r#"
                (function () {
                  var el = document.getElementById('quiz-timer');
                  if (!el || el.dataset.armed) return;
                  el.dataset.armed = '1';
                  var left = parseInt(el.dataset.remaining, 10);
                  setInterval(function () {
                    if (left > 0) left -= 1;
                    var m = String(Math.floor(left / 60)).padStart(2, '0');
                    var s = String(left % 60).padStart(2, '0');
                    el.textContent = m + ':' + s;
                  }, 1000);
                })();
                "#))
            }
        }
    }
}

pub struct ResultRow {
    pub index: usize,
    pub text: String,
    pub selected: Option<String>,
    pub answer: String,
    pub correct: bool,
    pub flagged: bool,
}

pub struct ResultsData {
    pub title: String,
    pub score: Score,
    pub feedback: Feedback,
    pub time_spent_seconds: u32,
    pub rows: Vec<ResultRow>,
}

pub fn results(data: ResultsData) -> Markup {
    html! {
        h1 { "Quiz Results" }
        p { mark { (data.title) } }

        article class=(format!("score-card score-{:?}", data.feedback)) {
            h2 { (data.score.percent) "%" }
            p { (data.score.correct) " of " (data.score.total) " correct" }
            p { "Time spent: " (utils::format_time(data.time_spent_seconds)) }
            p { (data.feedback.message()) }
        }

        table {
            thead {
                tr {
                    th { "#" }
                    th { "Question" }
                    th { "Your answer" }
                    th { "Correct answer" }
                    th { "Result" }
                }
            }
            tbody {
                @for row in &data.rows {
                    tr {
                        td {
                            (row.index + 1)
                            @if row.flagged { " \u{2691}" }
                        }
                        td { (row.text) }
                        td {
                            @match &row.selected {
                                Some(letter) => { (letter.to_uppercase()) },
                                None => { "-" },
                            }
                        }
                        td { (row.answer.to_uppercase()) }
                        td {
                            @if row.correct {
                                span class="badge badge-correct" { "Correct" }
                            } @else {
                                span class="badge badge-incorrect" { "Incorrect" }
                            }
                        }
                    }
                }
            }
        }

        div class="quiz-nav" {
            button type="button" hx-post=(names::QUIZ_REVIEW_URL) hx-target="main" {
                "Review answers"
            }
            button type="button" hx-get=(names::QUIZ_SETUP_URL) hx-target="main" {
                "Back to quizzes"
            }
        }
    }
}
