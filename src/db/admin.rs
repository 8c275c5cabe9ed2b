use color_eyre::{eyre::OptionExt, Result};

use super::models::AdminAccountRow;
use super::Db;

impl Db {
    pub async fn create_admin_account(
        &self,
        user_id: i64,
        role: &str,
        permissions: &[String],
    ) -> Result<i64> {
        let permissions_json = serde_json::to_string(permissions)?;

        let mut tx = self.pool.begin().await?;

        let account_id: i64 = sqlx::query_scalar(
            "INSERT INTO admin_accounts (user_id, role, permissions) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(role)
        .bind(&permissions_json)
        .fetch_one(&mut *tx)
        .await?;

        // The users row mirrors the admin role so the session guard can
        // gate admin pages without a join.
        sqlx::query("UPDATE users SET role = ?, status = 'active' WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("admin account created: id={account_id}, user_id={user_id}, role={role}");
        Ok(account_id)
    }

    pub async fn update_admin_account(
        &self,
        account_id: i64,
        role: &str,
        permissions: &[String],
    ) -> Result<()> {
        let permissions_json = serde_json::to_string(permissions)?;

        let mut tx = self.pool.begin().await?;

        let user_id: i64 =
            sqlx::query_scalar("SELECT user_id FROM admin_accounts WHERE id = ?")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_eyre("admin account not found")?;

        sqlx::query("UPDATE admin_accounts SET role = ?, permissions = ? WHERE id = ?")
            .bind(role)
            .bind(&permissions_json)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("admin account {account_id} updated: role={role}");
        Ok(())
    }

    pub async fn delete_admin_account(&self, account_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM admin_accounts WHERE id = ?")
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM admin_accounts WHERE id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        if let Some(user_id) = user_id {
            sqlx::query("UPDATE users SET role = 'student' WHERE id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("deleted admin account {account_id}");
        Ok(())
    }

    pub async fn list_admin_accounts(&self) -> Result<Vec<AdminAccountRow>> {
        let accounts = sqlx::query_as::<_, AdminAccountRow>(
            r#"
            SELECT a.id, a.user_id, u.email, u.full_name, a.role, a.permissions, a.created_at
            FROM admin_accounts a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    pub async fn get_admin_account(&self, account_id: i64) -> Result<AdminAccountRow> {
        let account = sqlx::query_as::<_, AdminAccountRow>(
            r#"
            SELECT a.id, a.user_id, u.email, u.full_name, a.role, a.permissions, a.created_at
            FROM admin_accounts a
            JOIN users u ON u.id = a.user_id
            WHERE a.id = ?
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("admin account not found")?;

        Ok(account)
    }

    pub async fn get_admin_account_by_user(&self, user_id: i64) -> Result<Option<AdminAccountRow>> {
        let account = sqlx::query_as::<_, AdminAccountRow>(
            r#"
            SELECT a.id, a.user_id, u.email, u.full_name, a.role, a.permissions, a.created_at
            FROM admin_accounts a
            JOIN users u ON u.id = a.user_id
            WHERE a.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
