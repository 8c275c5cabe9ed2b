use color_eyre::Result;

use crate::db::code::RedeemOutcome;
use crate::db::models::AuthUser;
use crate::db::Db;

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn email_exists(&self, email: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        university: &str,
        year: Option<i64>,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn create_user_session(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<AuthUser>>> + Send;

    fn delete_user_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn redeem_code(
        &self,
        code: &str,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<RedeemOutcome>> + Send;

    fn activate_subscription(
        &self,
        user_id: i64,
        package: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl AuthRepository for Db {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        Db::email_exists(self, email).await
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        university: &str,
        year: Option<i64>,
    ) -> Result<i64> {
        Db::create_user(self, email, password, full_name, university, year).await
    }

    async fn create_user_session(&self, user_id: i64) -> Result<String> {
        Db::create_user_session(self, user_id).await
    }

    async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        Db::verify_user_password(self, email, password).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        Db::find_user_by_email(self, email).await
    }

    async fn delete_user_session(&self, session_id: &str) -> Result<()> {
        Db::delete_user_session(self, session_id).await
    }

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        Db::change_password(self, user_id, current_password, new_password).await
    }

    async fn redeem_code(&self, code: &str, user_id: i64) -> Result<RedeemOutcome> {
        Db::redeem_code(self, code, user_id).await
    }

    async fn activate_subscription(&self, user_id: i64, package: &str) -> Result<()> {
        Db::activate_subscription(self, user_id, package).await
    }
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

pub enum LoginOutcome {
    /// Login succeeded. Contains the session token.
    Success(String),
    /// Password was incorrect (or email not found).
    InvalidCredentials,
    /// Credentials correct but the account has not been activated yet.
    Pending,
    /// The account was blocked by an administrator.
    Blocked,
}

pub enum RegisterOutcome {
    /// Account created and activated through an access code; the student
    /// is logged in. Contains the session token.
    LoggedIn(String),
    /// Account created without a code; it stays pending until a code is
    /// redeemed or an admin activates it.
    PendingActivation,
    /// Account created, but the supplied access code was refused. The
    /// account stays pending; earlier work is not rolled back.
    CodeRejected(RedeemOutcome),
    /// Required fields were empty.
    EmptyFields,
    /// Email already in use.
    EmailTaken,
    /// Password does not meet minimum requirements.
    WeakPassword,
}

pub enum ChangePasswordOutcome {
    Success,
    EmptyFields,
    WeakPassword,
    IncorrectPassword,
}

const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AuthService<R: AuthRepository = Db> {
    repo: R,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let verified = self.repo.verify_user_password(email, password).await?;

        if !verified {
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let user = self.repo.find_user_by_email(email).await?.ok_or_else(|| {
            color_eyre::eyre::eyre!("user not found after password verification")
        })?;

        match user.status.as_str() {
            "blocked" => return Ok(LoginOutcome::Blocked),
            "pending" => return Ok(LoginOutcome::Pending),
            _ => {}
        }

        let session_token = self.repo.create_user_session(user.id).await?;

        Ok(LoginOutcome::Success(session_token))
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        university: &str,
        year: Option<i64>,
        access_code: Option<&str>,
    ) -> Result<RegisterOutcome> {
        if email.is_empty() || password.is_empty() || full_name.is_empty() {
            return Ok(RegisterOutcome::EmptyFields);
        }

        if password.len() < MIN_PASSWORD_LENGTH {
            return Ok(RegisterOutcome::WeakPassword);
        }

        if self.repo.email_exists(email).await? {
            return Ok(RegisterOutcome::EmailTaken);
        }

        let user_id = self
            .repo
            .create_user(email, password, full_name, university, year)
            .await?;

        let Some(code) = access_code.filter(|c| !c.is_empty()) else {
            return Ok(RegisterOutcome::PendingActivation);
        };

        match self.repo.redeem_code(code, user_id).await? {
            RedeemOutcome::Redeemed { package } => {
                self.repo.activate_subscription(user_id, &package).await?;
                let session_token = self.repo.create_user_session(user_id).await?;
                Ok(RegisterOutcome::LoggedIn(session_token))
            }
            rejected => Ok(RegisterOutcome::CodeRejected(rejected)),
        }
    }

    pub async fn logout(&self, session_id: &str) -> Result<()> {
        self.repo.delete_user_session(session_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<ChangePasswordOutcome> {
        if current_password.is_empty() || new_password.is_empty() {
            return Ok(ChangePasswordOutcome::EmptyFields);
        }

        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Ok(ChangePasswordOutcome::WeakPassword);
        }

        let changed = self
            .repo
            .change_password(user_id, current_password, new_password)
            .await?;

        if changed {
            Ok(ChangePasswordOutcome::Success)
        } else {
            Ok(ChangePasswordOutcome::IncorrectPassword)
        }
    }

    /// Redeem an access code for an existing account, activating the
    /// matching subscription on success.
    pub async fn redeem(&self, user_id: i64, code: &str) -> Result<RedeemOutcome> {
        let outcome = self.repo.redeem_code(code, user_id).await?;

        if let RedeemOutcome::Redeemed { package } = &outcome {
            self.repo.activate_subscription(user_id, package).await?;
        }

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(status: &str) -> AuthUser {
        AuthUser {
            id: 1,
            email: "student@example.com".to_string(),
            full_name: "Test Student".to_string(),
            role: "student".to_string(),
            status: status.to_string(),
        }
    }

    // ----- login tests -----

    #[tokio::test]
    async fn login_success_returns_session_token() {
        let mut mock = MockAuthRepository::new();
        mock.expect_verify_user_password()
            .returning(|_, _| Box::pin(async { Ok(true) }));
        mock.expect_find_user_by_email()
            .returning(|_| Box::pin(async { Ok(Some(user("active"))) }));
        mock.expect_create_user_session()
            .returning(|_| Box::pin(async { Ok("session-token-123".to_string()) }));

        let svc = AuthService::new(mock);
        let outcome = svc.login("student@example.com", "password").await.unwrap();

        assert!(matches!(outcome, LoginOutcome::Success(ref t) if t == "session-token-123"));
    }

    #[tokio::test]
    async fn login_wrong_password_returns_invalid_credentials() {
        let mut mock = MockAuthRepository::new();
        mock.expect_verify_user_password()
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let svc = AuthService::new(mock);
        let outcome = svc.login("student@example.com", "wrong").await.unwrap();

        assert!(matches!(outcome, LoginOutcome::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_pending_account_is_refused() {
        let mut mock = MockAuthRepository::new();
        mock.expect_verify_user_password()
            .returning(|_, _| Box::pin(async { Ok(true) }));
        mock.expect_find_user_by_email()
            .returning(|_| Box::pin(async { Ok(Some(user("pending"))) }));

        let svc = AuthService::new(mock);
        let outcome = svc.login("student@example.com", "password").await.unwrap();

        assert!(matches!(outcome, LoginOutcome::Pending));
    }

    #[tokio::test]
    async fn login_blocked_account_is_refused() {
        let mut mock = MockAuthRepository::new();
        mock.expect_verify_user_password()
            .returning(|_, _| Box::pin(async { Ok(true) }));
        mock.expect_find_user_by_email()
            .returning(|_| Box::pin(async { Ok(Some(user("blocked"))) }));

        let svc = AuthService::new(mock);
        let outcome = svc.login("student@example.com", "password").await.unwrap();

        assert!(matches!(outcome, LoginOutcome::Blocked));
    }

    // ----- register tests -----

    #[tokio::test]
    async fn register_empty_fields_returns_empty_fields() {
        let svc = AuthService::new(MockAuthRepository::new());
        let outcome = svc
            .register("", "password123", "Name", "", None, None)
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::EmptyFields));

        let svc = AuthService::new(MockAuthRepository::new());
        let outcome = svc
            .register("a@b.com", "password123", "", "", None, None)
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::EmptyFields));
    }

    #[tokio::test]
    async fn register_short_password_returns_weak_password() {
        let svc = AuthService::new(MockAuthRepository::new());
        let outcome = svc
            .register("a@b.com", "short", "Name", "", None, None)
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::WeakPassword));
    }

    #[tokio::test]
    async fn register_email_taken_returns_email_taken() {
        let mut mock = MockAuthRepository::new();
        mock.expect_email_exists()
            .returning(|_| Box::pin(async { Ok(true) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .register("taken@example.com", "password123", "Name", "", None, None)
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterOutcome::EmailTaken));
    }

    #[tokio::test]
    async fn register_without_code_stays_pending() {
        let mut mock = MockAuthRepository::new();
        mock.expect_email_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock.expect_create_user()
            .returning(|_, _, _, _, _| Box::pin(async { Ok(1) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .register("new@example.com", "password123", "Name", "Algiers", Some(3), None)
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterOutcome::PendingActivation));
    }

    #[tokio::test]
    async fn register_with_valid_code_logs_in() {
        let mut mock = MockAuthRepository::new();
        mock.expect_email_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock.expect_create_user()
            .returning(|_, _, _, _, _| Box::pin(async { Ok(7) }));
        mock.expect_redeem_code().returning(|_, _| {
            Box::pin(async {
                Ok(RedeemOutcome::Redeemed { package: "3rd Year Package".to_string() })
            })
        });
        mock.expect_activate_subscription()
            .withf(|user_id, package| *user_id == 7 && package == "3rd Year Package")
            .returning(|_, _| Box::pin(async { Ok(()) }));
        mock.expect_create_user_session()
            .returning(|_| Box::pin(async { Ok("session-abc".to_string()) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .register(
                "new@example.com",
                "password123",
                "Name",
                "Algiers",
                Some(3),
                Some("TQ3-ABC123"),
            )
            .await
            .unwrap();

        assert!(matches!(outcome, RegisterOutcome::LoggedIn(ref t) if t == "session-abc"));
    }

    #[tokio::test]
    async fn register_with_used_code_is_created_but_rejected() {
        let mut mock = MockAuthRepository::new();
        mock.expect_email_exists()
            .returning(|_| Box::pin(async { Ok(false) }));
        mock.expect_create_user()
            .returning(|_, _, _, _, _| Box::pin(async { Ok(1) }));
        mock.expect_redeem_code()
            .returning(|_, _| Box::pin(async { Ok(RedeemOutcome::AlreadyUsed) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .register(
                "new@example.com",
                "password123",
                "Name",
                "",
                None,
                Some("TQ1-USED00"),
            )
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            RegisterOutcome::CodeRejected(RedeemOutcome::AlreadyUsed)
        ));
    }

    // ----- logout tests -----

    #[tokio::test]
    async fn logout_deletes_session() {
        let mut mock = MockAuthRepository::new();
        mock.expect_delete_user_session()
            .withf(|id| id == "session-123")
            .returning(|_| Box::pin(async { Ok(()) }));

        let svc = AuthService::new(mock);
        svc.logout("session-123").await.unwrap();
    }

    // ----- change_password tests -----

    #[tokio::test]
    async fn change_password_empty_fields_returns_empty_fields() {
        let svc = AuthService::new(MockAuthRepository::new());
        let outcome = svc.change_password(1, "", "newpassword").await.unwrap();
        assert!(matches!(outcome, ChangePasswordOutcome::EmptyFields));

        let svc = AuthService::new(MockAuthRepository::new());
        let outcome = svc.change_password(1, "old", "").await.unwrap();
        assert!(matches!(outcome, ChangePasswordOutcome::EmptyFields));
    }

    #[tokio::test]
    async fn change_password_success() {
        let mut mock = MockAuthRepository::new();
        mock.expect_change_password()
            .returning(|_, _, _| Box::pin(async { Ok(true) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .change_password(1, "oldpassword", "newpassword")
            .await
            .unwrap();
        assert!(matches!(outcome, ChangePasswordOutcome::Success));
    }

    #[tokio::test]
    async fn change_password_incorrect_returns_incorrect() {
        let mut mock = MockAuthRepository::new();
        mock.expect_change_password()
            .returning(|_, _, _| Box::pin(async { Ok(false) }));

        let svc = AuthService::new(mock);
        let outcome = svc
            .change_password(1, "wrongpassword", "newpassword")
            .await
            .unwrap();
        assert!(matches!(outcome, ChangePasswordOutcome::IncorrectPassword));
    }

    // ----- redeem tests -----

    #[tokio::test]
    async fn redeem_activates_subscription_on_success() {
        let mut mock = MockAuthRepository::new();
        mock.expect_redeem_code().returning(|_, _| {
            Box::pin(async {
                Ok(RedeemOutcome::Redeemed { package: "Complete Package".to_string() })
            })
        });
        mock.expect_activate_subscription()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let svc = AuthService::new(mock);
        let outcome = svc.redeem(1, "TQC-XYZ789").await.unwrap();
        assert!(matches!(outcome, RedeemOutcome::Redeemed { .. }));
    }

    #[tokio::test]
    async fn redeem_expired_code_does_not_activate() {
        let mut mock = MockAuthRepository::new();
        mock.expect_redeem_code()
            .returning(|_, _| Box::pin(async { Ok(RedeemOutcome::Expired) }));
        mock.expect_activate_subscription().times(0);

        let svc = AuthService::new(mock);
        let outcome = svc.redeem(1, "TQ1-OLDOLD").await.unwrap();
        assert!(matches!(outcome, RedeemOutcome::Expired));
    }
}
