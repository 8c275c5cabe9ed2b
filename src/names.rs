pub const LOGIN_URL: &str = "/login";
pub const REGISTER_URL: &str = "/register";
pub const LOGOUT_URL: &str = "/logout";
pub const PROFILE_URL: &str = "/student/profile";
pub const CHANGE_PASSWORD_URL: &str = "/change-password";
pub const REDEEM_CODE_URL: &str = "/redeem-code";

pub const QUIZ_SETUP_URL: &str = "/student/quiz";
pub const START_QUIZ_URL: &str = "/student/quiz/start";
pub const QUIZ_SELECT_URL: &str = "/student/quiz/select";
pub const QUIZ_ELIMINATE_URL: &str = "/student/quiz/eliminate";
pub const QUIZ_REVEAL_URL: &str = "/student/quiz/reveal";
pub const QUIZ_FLAG_URL: &str = "/student/quiz/flag";
pub const QUIZ_FINISH_URL: &str = "/student/quiz/finish";
pub const QUIZ_RESULTS_URL: &str = "/student/quiz/results";
pub const QUIZ_REVIEW_URL: &str = "/student/quiz/review";
pub const QUIZ_ABANDON_URL: &str = "/student/quiz/abandon";

pub const CALENDAR_URL: &str = "/student/calendar";

pub const ADMIN_USERS_URL: &str = "/admin/users";
pub const ADMIN_QUESTIONS_URL: &str = "/admin/questions";
pub const ADMIN_CODES_URL: &str = "/admin/codes";
pub const ADMIN_ACCOUNTS_URL: &str = "/admin/accounts";
pub const GENERATE_CODES_URL: &str = "/admin/codes/generate";
pub const DOWNLOAD_CODES_URL: &str = "/admin/codes/download";

pub const USER_SESSION_COOKIE_NAME: &str = "tq_session";
pub const QUIZ_SESSION_COOKIE_NAME: &str = "tq_quiz";

pub fn quiz_question_url(idx: usize) -> String {
    format!("/student/quiz/question/{idx}")
}

pub fn calendar_event_url(event_id: i64) -> String {
    format!("/student/calendar/events/{event_id}")
}

pub fn calendar_toggle_url(event_id: i64) -> String {
    format!("/student/calendar/events/{event_id}/toggle")
}

pub fn user_action_url(user_id: i64, action: &str) -> String {
    format!("/admin/users/{user_id}/{action}")
}

pub fn question_url(question_id: i64) -> String {
    format!("/admin/questions/{question_id}")
}

pub fn expire_code_url(code_id: i64) -> String {
    format!("/admin/codes/{code_id}/expire")
}

pub fn admin_account_url(account_id: i64) -> String {
    format!("/admin/accounts/{account_id}")
}

// Quiz session defaults
pub const QUIZ_TIME_BUDGET_SECS: u32 = 30 * 60;
pub const MIN_QUESTION_COUNT: i64 = 5;
pub const MAX_QUESTION_COUNT: i64 = 50;
pub const DEFAULT_QUESTION_COUNT: i64 = 20;

// List pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

// Access code generation
pub const MAX_CODES_PER_BATCH: i64 = 100;
pub const CODE_SUFFIX_LEN: usize = 6;
pub const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Subscription packages: display name, price in DA, code prefix.
pub const PACKAGES: &[(&str, u32, &str)] = &[
    ("1st Year Package", 1200, "TQ1"),
    ("2nd Year Package", 1800, "TQ2"),
    ("3rd Year Package", 2000, "TQ3"),
    ("4th Year Package", 2200, "TQ4"),
    ("5th Year Package", 2500, "TQ5"),
    ("Complete Package", 4500, "TQC"),
];

/// Server-side permission catalog. Role defaults and the super_admin full
/// grant are both derived from this list, so clients can never drift from it.
pub const PERMISSIONS: &[(&str, &str)] = &[
    ("users.view", "View users"),
    ("users.create", "Create users"),
    ("users.edit", "Edit users"),
    ("users.suspend", "Suspend users"),
    ("questions.view", "View questions"),
    ("questions.create", "Create questions"),
    ("questions.edit", "Edit questions"),
    ("questions.moderate", "Moderate questions"),
    ("codes.view", "View access codes"),
    ("codes.generate", "Generate access codes"),
    ("codes.download", "Download access codes"),
    ("stats.view", "View statistics"),
    ("stats.export", "Export statistics"),
];

pub const ADMIN_ROLES: &[&str] = &["super_admin", "admin", "moderator", "viewer"];

pub const EVENT_TYPES: &[&str] = &["exam", "quiz", "study", "assignment", "reminder"];
pub const EVENT_PRIORITIES: &[&str] = &["low", "medium", "high"];

pub const DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];
pub const OPTION_LETTERS: &[&str] = &["a", "b", "c", "d"];
