use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use color_eyre::{eyre::OptionExt, Result};
use ulid::Ulid;

use super::models::{AuthUser, Page, UserRow, UserStatistics};
use super::Db;

/// Filters for the admin user list. Empty strings mean "no filter".
#[derive(Default)]
pub struct UserFilter {
    pub search: String,
    pub status: String,
    pub year: Option<i64>,
}

impl Db {
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        university: &str,
        year: Option<i64>,
    ) -> Result<i64> {
        let password_hash = hash_password(password)?;

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password_hash, full_name, university, year) VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(university)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("new user created: id={user_id}, email={email}");
        Ok(user_id)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, email, full_name, role, status FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        let stored_hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match stored_hash {
            Some(hash) => Ok(verify_password(password, &hash)),
            None => Ok(false),
        }
    }

    pub async fn create_user_session(&self, user_id: i64) -> Result<String> {
        let session = Ulid::new().to_string();

        sqlx::query("INSERT INTO user_sessions (id, user_id) VALUES (?, ?)")
            .bind(&session)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("new user session created for user_id={user_id}");
        Ok(session)
    }

    pub async fn get_user_by_session(&self, session_id: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            r#"
            SELECT u.id, u.email, u.full_name, u.role, u.status
            FROM user_sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn delete_user_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Change password for an authenticated user. Verifies the current
    /// password first; returns false when it does not match.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        let stored_hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let stored_hash = match stored_hash {
            Some(hash) => hash,
            None => return Ok(false),
        };

        if !verify_password(current_password, &stored_hash) {
            return Ok(false);
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(new_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserRow> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, full_name, university, year, role, status,
                   subscription_plan, subscription_expiry, created_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("user not found")?;

        Ok(user)
    }

    /// Server-side paginated user list for the admin back office.
    pub async fn list_users(&self, filter: &UserFilter, page: i64, page_size: i64) -> Result<Page<UserRow>> {
        let pattern = format!("%{}%", filter.search);
        let status = filter.status.clone();
        let year = filter.year;

        let where_clause = r#"
            WHERE role = 'student'
              AND (email LIKE ? OR full_name LIKE ? OR university LIKE ?)
              AND (? = '' OR status = ?)
              AND (? IS NULL OR year = ?)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {where_clause}"))
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&status)
            .bind(&status)
            .bind(year)
            .bind(year)
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT id, email, full_name, university, year, role, status,
                   subscription_plan, subscription_expiry, created_at
            FROM users {where_clause}
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&status)
        .bind(&status)
        .bind(year)
        .bind(year)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { items, total, page, page_size })
    }

    pub async fn user_statistics(&self) -> Result<UserStatistics> {
        let stats = sqlx::query_as::<_, UserStatistics>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END), 0) AS active,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                COALESCE(SUM(CASE WHEN status = 'blocked' THEN 1 ELSE 0 END), 0) AS blocked
            FROM users WHERE role = 'student'
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn set_user_status(&self, user_id: i64, status: &str) -> Result<()> {
        sqlx::query("UPDATE users SET status = ? WHERE id = ?")
            .bind(status)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("user {user_id} status set to {status}");
        Ok(())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("deleted user {user_id}");
        Ok(())
    }

    /// Activate a subscription after a successful code redemption. The
    /// expiry is one year out; a pending account becomes active.
    pub async fn activate_subscription(&self, user_id: i64, package: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET subscription_plan = ?,
                subscription_expiry = datetime('now', '+1 year'),
                status = CASE WHEN status = 'pending' THEN 'active' ELSE status END
            WHERE id = ?
            "#,
        )
        .bind(package)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        tracing::info!("subscription '{package}' activated for user {user_id}");
        Ok(())
    }

    pub async fn set_user_role(&self, user_id: i64, role: &str) -> Result<()> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Run argon2 hashing on a dedicated thread with a large stack to avoid
/// stack overflow in debug builds.
fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024) // 4 MB stack
        .spawn(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::default();
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| color_eyre::eyre::eyre!("failed to hash password: {e}"))
        })?
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("hash thread panicked"))?
}

fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(move || {
            let parsed_hash = match PasswordHash::new(&hash) {
                Ok(h) => h,
                Err(_) => return false,
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .map(|h| h.join().unwrap_or(false))
        .unwrap_or(false)
}
