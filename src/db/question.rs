use color_eyre::{eyre::OptionExt, Result};

use super::models::{Page, QuestionOptionRow, QuestionRow, QuestionWithOptions};
use super::Db;
use crate::models::QuestionForm;

/// Filters for the admin question list. Empty strings mean "no filter".
#[derive(Default)]
pub struct QuestionFilter {
    pub search: String,
    pub module: String,
    pub difficulty: String,
    pub year: Option<i64>,
}

impl Db {
    pub async fn create_question(&self, form: &QuestionForm) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (question_text, module_name, course_name, year, difficulty, explanation)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&form.question_text)
        .bind(&form.module_name)
        .bind(&form.course_name)
        .bind(form.year)
        .bind(&form.difficulty)
        .bind(&form.explanation)
        .fetch_one(&mut *tx)
        .await?;

        for opt in &form.options {
            sqlx::query(
                "INSERT INTO question_options (question_id, option_letter, option_text, is_correct) VALUES (?, ?, ?, ?)",
            )
            .bind(question_id)
            .bind(&opt.letter)
            .bind(&opt.text)
            .bind(opt.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("question created: id={question_id}, module={}", form.module_name);
        Ok(question_id)
    }

    pub async fn update_question(&self, question_id: i64, form: &QuestionForm) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE questions
            SET question_text = ?, module_name = ?, course_name = ?, year = ?, difficulty = ?, explanation = ?
            WHERE id = ?
            "#,
        )
        .bind(&form.question_text)
        .bind(&form.module_name)
        .bind(&form.course_name)
        .bind(form.year)
        .bind(&form.difficulty)
        .bind(&form.explanation)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM question_options WHERE question_id = ?")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        for opt in &form.options {
            sqlx::query(
                "INSERT INTO question_options (question_id, option_letter, option_text, is_correct) VALUES (?, ?, ?, ?)",
            )
            .bind(question_id)
            .bind(&opt.letter)
            .bind(&opt.text)
            .bind(opt.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("question {question_id} updated");
        Ok(())
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("deleted question {question_id}");
        Ok(())
    }

    pub async fn get_question(&self, question_id: i64) -> Result<QuestionWithOptions> {
        let question = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, question_text, module_name, course_name, year, difficulty, explanation, is_active
            FROM questions WHERE id = ?
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("question not found")?;

        let options = self.get_options(question_id).await?;

        Ok(QuestionWithOptions { question, options })
    }

    pub async fn get_options(&self, question_id: i64) -> Result<Vec<QuestionOptionRow>> {
        let options = sqlx::query_as::<_, QuestionOptionRow>(
            r#"
            SELECT id, question_id, option_letter, option_text, is_correct
            FROM question_options
            WHERE question_id = ?
            ORDER BY option_letter
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    /// Server-side paginated question list for the admin back office.
    pub async fn list_questions(
        &self,
        filter: &QuestionFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Page<QuestionRow>> {
        let pattern = format!("%{}%", filter.search);

        let where_clause = r#"
            WHERE (question_text LIKE ? OR course_name LIKE ?)
              AND (? = '' OR module_name = ?)
              AND (? = '' OR difficulty = ?)
              AND (? IS NULL OR year = ?)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM questions {where_clause}"))
                .bind(&pattern)
                .bind(&pattern)
                .bind(&filter.module)
                .bind(&filter.module)
                .bind(&filter.difficulty)
                .bind(&filter.difficulty)
                .bind(filter.year)
                .bind(filter.year)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, QuestionRow>(&format!(
            r#"
            SELECT id, question_text, module_name, course_name, year, difficulty, explanation, is_active
            FROM questions {where_clause}
            ORDER BY id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&filter.module)
        .bind(&filter.module)
        .bind(&filter.difficulty)
        .bind(&filter.difficulty)
        .bind(filter.year)
        .bind(filter.year)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, page, page_size })
    }

    /// Question ids eligible for a quiz session, optionally narrowed by
    /// module and year. Only active questions are eligible.
    pub async fn question_ids_for_quiz(
        &self,
        module: &str,
        year: Option<i64>,
    ) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM questions
            WHERE is_active = 1
              AND (? = '' OR module_name = ?)
              AND (? IS NULL OR year = ?)
            ORDER BY id
            "#,
        )
        .bind(module)
        .bind(module)
        .bind(year)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    pub async fn get_questions_with_options(&self, ids: &[i64]) -> Result<Vec<QuestionWithOptions>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.get_question(*id).await?);
        }
        Ok(out)
    }

    pub async fn module_names(&self) -> Result<Vec<String>> {
        let modules: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT module_name FROM questions ORDER BY module_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn course_names(&self) -> Result<Vec<String>> {
        let courses: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT course_name FROM questions WHERE course_name != '' ORDER BY course_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    pub async fn questions_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
