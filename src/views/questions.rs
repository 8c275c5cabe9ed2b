use maud::{html, Markup};

use crate::db::models::{Page, QuestionRow, QuestionWithOptions};
use crate::names;

use super::components;

pub struct QuestionsData {
    pub page: Page<QuestionRow>,
    pub modules: Vec<String>,
    pub search: String,
    pub module: String,
    pub difficulty: String,
    pub year: Option<i64>,
}

pub fn questions(data: QuestionsData) -> Markup {
    let base_query = format!(
        "search={}&module={}&difficulty={}&year={}",
        data.search,
        data.module,
        data.difficulty,
        data.year.map(|y| y.to_string()).unwrap_or_default(),
    );

    html! {
        h1 { "Questions" }

        p {
            a hx-get=(format!("{}/new", names::ADMIN_QUESTIONS_URL)) hx-target="main"
              style="cursor: pointer;" { "Add question" }
        }

        form {
            (components::search_input(names::ADMIN_QUESTIONS_URL, "search", &data.search, "Search questions"))
            select name="module"
                   hx-get=(names::ADMIN_QUESTIONS_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.module.is_empty()] { "All modules" }
                @for module in &data.modules {
                    option value=(module) selected[data.module == *module] { (module) }
                }
            }
            select name="difficulty"
                   hx-get=(names::ADMIN_QUESTIONS_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.difficulty.is_empty()] { "All difficulties" }
                @for difficulty in names::DIFFICULTIES {
                    option value=(difficulty) selected[data.difficulty == *difficulty] { (difficulty) }
                }
            }
            select name="year"
                   hx-get=(names::ADMIN_QUESTIONS_URL) hx-target="main" hx-include="closest form" {
                option value="" selected[data.year.is_none()] { "All years" }
                @for year in 1..=5 {
                    option value=(year) selected[data.year == Some(year)] { "Year " (year) }
                }
            }
        }

        table {
            thead {
                tr {
                    th { "Question" }
                    th { "Module" }
                    th { "Course" }
                    th { "Year" }
                    th { "Difficulty" }
                    th { "Actions" }
                }
            }
            tbody {
                @for question in &data.page.items {
                    tr {
                        td { (question.question_text) }
                        td { (question.module_name) }
                        td { (question.course_name) }
                        td { (question.year) }
                        td { (question.difficulty) }
                        td {
                            button hx-get=(names::question_url(question.id))
                                   hx-target="main" { "Edit" }
                            (components::confirm_button(
                                &format!("delete-question-{}", question.id),
                                "Delete",
                                "Delete this question?",
                                &format!("{}/delete", names::question_url(question.id)),
                            ))
                        }
                    }
                }
            }
        }

        @if data.page.items.is_empty() {
            p { "No questions match the current filters." }
        }

        (components::pagination(
            names::ADMIN_QUESTIONS_URL,
            &base_query,
            data.page.page,
            data.page.total_pages(),
        ))
    }
}

pub struct EditorData {
    /// None for the create form.
    pub existing: Option<QuestionWithOptions>,
    pub error: Option<&'static str>,
}

pub fn editor(data: EditorData) -> Markup {
    let (action, heading) = match &data.existing {
        Some(q) => (names::question_url(q.question.id), "Edit question"),
        None => (names::ADMIN_QUESTIONS_URL.to_string(), "New question"),
    };

    let text = data.existing.as_ref().map(|q| q.question.question_text.clone()).unwrap_or_default();
    let module = data.existing.as_ref().map(|q| q.question.module_name.clone()).unwrap_or_default();
    let course = data.existing.as_ref().map(|q| q.question.course_name.clone()).unwrap_or_default();
    let year = data.existing.as_ref().map(|q| q.question.year).unwrap_or(1);
    let difficulty = data
        .existing
        .as_ref()
        .map(|q| q.question.difficulty.clone())
        .unwrap_or_else(|| "medium".to_string());
    let explanation = data.existing.as_ref().map(|q| q.question.explanation.clone()).unwrap_or_default();

    html! {
        h1 { (heading) }
        @if let Some(error) = data.error {
            p class="error" { (error) }
        }
        form hx-post=(action) hx-target="main" {
            label {
                "Question"
                textarea name="question_text" required { (text) }
            }
            label {
                "Module"
                input type="text" name="module_name" value=(module) required;
            }
            label {
                "Course"
                input type="text" name="course_name" value=(course);
            }
            label {
                "Year"
                select name="year" {
                    @for y in 1..=5 {
                        option value=(y) selected[year == y] { (y) }
                    }
                }
            }
            label {
                "Difficulty"
                select name="difficulty" {
                    @for d in names::DIFFICULTIES {
                        option value=(d) selected[difficulty == *d] { (d) }
                    }
                }
            }

            fieldset {
                legend { "Options (mark exactly one as correct)" }
                @for letter in names::OPTION_LETTERS {
                    @let existing_opt = data.existing.as_ref().and_then(|q| {
                        q.options.iter().find(|o| o.option_letter == *letter)
                    });
                    @let opt_text = existing_opt.map(|o| o.option_text.clone()).unwrap_or_default();
                    @let is_correct = existing_opt.is_some_and(|o| o.is_correct);
                    label {
                        strong { (letter.to_uppercase()) }
                        input type="text" name=(format!("option_{letter}")) value=(opt_text) required;
                        input type="radio" name="correct" value=(letter) checked[is_correct];
                        " correct"
                    }
                }
            }

            label {
                "Explanation"
                textarea name="explanation" { (explanation) }
            }

            button type="submit" { "Save question" }
        }
    }
}

pub struct BulkItemResult {
    pub index: usize,
    pub outcome: Result<i64, String>,
}

/// Per-item report for a bulk import: successes and failures side by
/// side, earlier successes never rolled back.
pub fn bulk_report(results: &[BulkItemResult]) -> Markup {
    let created = results.iter().filter(|r| r.outcome.is_ok()).count();
    html! {
        h1 { "Bulk import" }
        p { (created) " of " (results.len()) " questions created." }
        ul {
            @for result in results {
                li {
                    "Item " (result.index + 1) ": "
                    @match &result.outcome {
                        Ok(id) => { "created (id " (id) ")" },
                        Err(reason) => { span class="error" { "failed: " (reason) } },
                    }
                }
            }
        }
        p {
            a hx-get=(names::ADMIN_QUESTIONS_URL) hx-target="main"
              style="cursor: pointer;" { "Back to questions" }
        }
    }
}
