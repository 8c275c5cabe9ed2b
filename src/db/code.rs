use chrono::Utc;
use color_eyre::{eyre::OptionExt, Result};

use super::models::{AccessCodeRow, CodeStatistics, Page};
use super::Db;

/// Filters for the admin access-code list. Empty strings mean "no filter".
#[derive(Default)]
pub struct CodeFilter {
    pub search: String,
    pub status: String,
    pub package: String,
}

/// Outcome of a redemption attempt. Status transitions are one-way and
/// decided here, not by callers.
pub enum RedeemOutcome {
    Redeemed { package: String },
    NotFound,
    AlreadyUsed,
    Expired,
}

impl Db {
    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM access_codes WHERE code = ?)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn insert_code(&self, code: &str, package: &str) -> Result<AccessCodeRow> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO access_codes (code, package) VALUES (?, ?) RETURNING id",
        )
        .bind(code)
        .bind(package)
        .fetch_one(&self.pool)
        .await?;

        self.get_code(id).await
    }

    pub async fn get_code(&self, code_id: i64) -> Result<AccessCodeRow> {
        let row = sqlx::query_as::<_, AccessCodeRow>(
            r#"
            SELECT id, code, package, status, used_by, used_date, created_at
            FROM access_codes WHERE id = ?
            "#,
        )
        .bind(code_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("access code not found")?;

        Ok(row)
    }

    /// Server-side paginated code list for the admin back office.
    pub async fn list_codes(
        &self,
        filter: &CodeFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Page<AccessCodeRow>> {
        let pattern = format!("%{}%", filter.search);

        let where_clause = r#"
            WHERE code LIKE ?
              AND (? = '' OR status = ?)
              AND (? = '' OR package = ?)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM access_codes {where_clause}"))
                .bind(&pattern)
                .bind(&filter.status)
                .bind(&filter.status)
                .bind(&filter.package)
                .bind(&filter.package)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, AccessCodeRow>(&format!(
            r#"
            SELECT id, code, package, status, used_by, used_date, created_at
            FROM access_codes {where_clause}
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(&pattern)
        .bind(&filter.status)
        .bind(&filter.status)
        .bind(&filter.package)
        .bind(&filter.package)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, page, page_size })
    }

    /// All codes matching a package filter, for the text export.
    pub async fn codes_for_export(&self, package: &str) -> Result<Vec<AccessCodeRow>> {
        let codes = sqlx::query_as::<_, AccessCodeRow>(
            r#"
            SELECT id, code, package, status, used_by, used_date, created_at
            FROM access_codes
            WHERE (? = '' OR package = ?)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(package)
        .bind(package)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }

    pub async fn code_statistics(&self) -> Result<CodeStatistics> {
        let stats = sqlx::query_as::<_, CodeStatistics>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN status = 'unused' THEN 1 ELSE 0 END), 0) AS unused,
                COALESCE(SUM(CASE WHEN status = 'used' THEN 1 ELSE 0 END), 0) AS used,
                COALESCE(SUM(CASE WHEN status = 'expired' THEN 1 ELSE 0 END), 0) AS expired
            FROM access_codes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// `unused -> expired`. Expiring a used code is rejected.
    pub async fn expire_code(&self, code_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE access_codes SET status = 'expired' WHERE id = ? AND status = 'unused'",
        )
        .bind(code_id)
        .execute(&self.pool)
        .await?;

        let expired = result.rows_affected() > 0;
        if expired {
            tracing::info!("access code {code_id} expired");
        } else {
            tracing::warn!("refused to expire access code {code_id}: not unused");
        }
        Ok(expired)
    }

    /// `unused -> used`, recording who redeemed it and when. The guarded
    /// UPDATE makes concurrent redemptions of the same code race-safe:
    /// only one caller observes a row change.
    pub async fn redeem_code(&self, code: &str, user_id: i64) -> Result<RedeemOutcome> {
        let row = sqlx::query_as::<_, AccessCodeRow>(
            r#"
            SELECT id, code, package, status, used_by, used_date, created_at
            FROM access_codes WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(RedeemOutcome::NotFound),
        };

        match row.status.as_str() {
            "used" => return Ok(RedeemOutcome::AlreadyUsed),
            "expired" => return Ok(RedeemOutcome::Expired),
            _ => {}
        }

        let result = sqlx::query(
            "UPDATE access_codes SET status = 'used', used_by = ?, used_date = ? WHERE id = ? AND status = 'unused'",
        )
        .bind(user_id)
        .bind(Utc::now())
        .bind(row.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(RedeemOutcome::AlreadyUsed);
        }

        tracing::info!("access code {} redeemed by user {user_id}", row.code);
        Ok(RedeemOutcome::Redeemed { package: row.package })
    }
}
