use color_eyre::Result;

use super::models::QuizAttemptRow;
use super::Db;

impl Db {
    /// Append a completed quiz to the attempt history. The history is
    /// append-only: no dedup, no cap.
    pub async fn record_attempt(
        &self,
        user_id: i64,
        title: &str,
        score: i64,
        questions_count: i64,
        time_spent_seconds: i64,
    ) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_attempts (user_id, title, score, questions_count, time_spent_seconds)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(score)
        .bind(questions_count)
        .bind(time_spent_seconds)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("attempt recorded for user {user_id}: score={score}");
        Ok(id)
    }

    pub async fn list_attempts(&self, user_id: i64) -> Result<Vec<QuizAttemptRow>> {
        let attempts = sqlx::query_as::<_, QuizAttemptRow>(
            r#"
            SELECT id, user_id, title, score, questions_count, time_spent_seconds, taken_at
            FROM quiz_attempts
            WHERE user_id = ?
            ORDER BY taken_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn attempts_count(&self, user_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
