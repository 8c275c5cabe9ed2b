use color_eyre::{eyre::OptionExt, Result};

use super::models::CalendarEventRow;
use super::Db;
use crate::models::EventForm;

impl Db {
    pub async fn create_event(&self, user_id: i64, form: &EventForm) -> Result<CalendarEventRow> {
        let tags_json = serde_json::to_string(&form.tag_list())?;

        let event_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO calendar_events
                (user_id, title, description, event_type, event_date, location, priority, reminder_enabled, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.event_type)
        .bind(form.event_date)
        .bind(&form.location)
        .bind(&form.priority)
        .bind(form.reminder_enabled)
        .bind(&tags_json)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("calendar event created: id={event_id}, user_id={user_id}");
        self.get_event(event_id, user_id).await
    }

    pub async fn update_event(
        &self,
        event_id: i64,
        user_id: i64,
        form: &EventForm,
    ) -> Result<CalendarEventRow> {
        let tags_json = serde_json::to_string(&form.tag_list())?;

        sqlx::query(
            r#"
            UPDATE calendar_events
            SET title = ?, description = ?, event_type = ?, event_date = ?,
                location = ?, priority = ?, reminder_enabled = ?, tags = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.event_type)
        .bind(form.event_date)
        .bind(&form.location)
        .bind(&form.priority)
        .bind(form.reminder_enabled)
        .bind(&tags_json)
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_event(event_id, user_id).await
    }

    pub async fn toggle_event_completed(&self, event_id: i64, user_id: i64) -> Result<bool> {
        sqlx::query(
            "UPDATE calendar_events SET is_completed = NOT is_completed WHERE id = ? AND user_id = ?",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let completed: bool = sqlx::query_scalar(
            "SELECT is_completed FROM calendar_events WHERE id = ? AND user_id = ?",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("calendar event not found")?;

        Ok(completed)
    }

    pub async fn delete_event(&self, event_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM calendar_events WHERE id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("deleted calendar event {event_id}");
        Ok(())
    }

    pub async fn get_event(&self, event_id: i64, user_id: i64) -> Result<CalendarEventRow> {
        let event = sqlx::query_as::<_, CalendarEventRow>(
            r#"
            SELECT id, user_id, title, description, event_type, event_date,
                   location, priority, is_completed, reminder_enabled, tags
            FROM calendar_events
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("calendar event not found")?;

        Ok(event)
    }

    /// Every event for one student, ordered by date. Filtering happens in
    /// the handler, mirroring the original's in-browser filtering.
    pub async fn list_events(&self, user_id: i64) -> Result<Vec<CalendarEventRow>> {
        let events = sqlx::query_as::<_, CalendarEventRow>(
            r#"
            SELECT id, user_id, title, description, event_type, event_date,
                   location, priority, is_completed, reminder_enabled, tags
            FROM calendar_events
            WHERE user_id = ?
            ORDER BY event_date ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
