use toothquest::db::Db;
use toothquest::models::{OptionForm, QuestionForm};

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("toothquest_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

#[allow(dead_code)]
pub fn question_form(text: &str, module: &str, correct_letter: &str) -> QuestionForm {
    QuestionForm {
        question_text: text.to_string(),
        module_name: module.to_string(),
        course_name: String::new(),
        year: 1,
        difficulty: "medium".to_string(),
        explanation: format!("Because {correct_letter} is right."),
        options: ["a", "b", "c", "d"]
            .into_iter()
            .map(|letter| OptionForm {
                letter: letter.to_string(),
                text: format!("Option {letter}"),
                is_correct: letter == correct_letter,
            })
            .collect(),
    }
}

/// Seed `answers.len()` questions whose correct letters are given in
/// order. Returns the created question ids.
#[allow(dead_code)]
pub async fn seed_questions(db: &Db, module: &str, answers: &[&str]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(answers.len());
    for (i, answer) in answers.iter().enumerate() {
        let form = question_form(&format!("Question {}", i + 1), module, answer);
        ids.push(db.create_question(&form).await.expect("create question"));
    }
    ids
}

/// Create an active student and a session token for them.
#[allow(dead_code)]
pub async fn create_logged_in_student(db: &Db, email: &str) -> (i64, String) {
    let user_id = db
        .create_user(email, "password123", "Test Student", "Test University", Some(3))
        .await
        .expect("create user");
    db.set_user_status(user_id, "active").await.expect("activate user");
    let session = db.create_user_session(user_id).await.expect("create session");
    (user_id, session)
}
