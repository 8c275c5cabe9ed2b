mod common;

use common::{create_test_db, question_form, seed_questions};
use toothquest::db::code::RedeemOutcome;
use toothquest::db::question::QuestionFilter;
use toothquest::db::user::UserFilter;
use toothquest::models::EventForm;

// ----- users -----

#[tokio::test]
async fn user_lifecycle_and_login_checks() {
    let db = create_test_db().await;

    let user_id = db
        .create_user("a@b.com", "password123", "Student A", "Uni", Some(2))
        .await
        .unwrap();

    assert!(db.email_exists("a@b.com").await.unwrap());
    assert!(!db.email_exists("other@b.com").await.unwrap());

    assert!(db.verify_user_password("a@b.com", "password123").await.unwrap());
    assert!(!db.verify_user_password("a@b.com", "wrong").await.unwrap());
    assert!(!db.verify_user_password("missing@b.com", "password123").await.unwrap());

    // New accounts start pending.
    let user = db.get_user(user_id).await.unwrap();
    assert_eq!(user.status, "pending");

    db.set_user_status(user_id, "active").await.unwrap();
    let user = db.get_user(user_id).await.unwrap();
    assert_eq!(user.status, "active");

    let session = db.create_user_session(user_id).await.unwrap();
    let found = db.get_user_by_session(&session).await.unwrap().unwrap();
    assert_eq!(found.id, user_id);

    db.delete_user_session(&session).await.unwrap();
    assert!(db.get_user_by_session(&session).await.unwrap().is_none());
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("pw@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    assert!(!db.change_password(user_id, "wrong", "newpassword1").await.unwrap());
    assert!(db.change_password(user_id, "password123", "newpassword1").await.unwrap());
    assert!(db.verify_user_password("pw@b.com", "newpassword1").await.unwrap());
}

#[tokio::test]
async fn user_list_filters_and_paginates() {
    let db = create_test_db().await;

    for i in 0..12 {
        let id = db
            .create_user(
                &format!("student{i}@b.com"),
                "password123",
                &format!("Student {i}"),
                "Algiers",
                Some(if i % 2 == 0 { 1 } else { 2 }),
            )
            .await
            .unwrap();
        if i < 4 {
            db.set_user_status(id, "active").await.unwrap();
        }
    }

    let all = db
        .list_users(&UserFilter::default(), 1, 10)
        .await
        .unwrap();
    assert_eq!(all.total, 12);
    assert_eq!(all.items.len(), 10);
    assert_eq!(all.total_pages(), 2);

    let filter = UserFilter {
        status: "active".to_string(),
        ..Default::default()
    };
    let active = db.list_users(&filter, 1, 10).await.unwrap();
    assert_eq!(active.total, 4);

    let filter = UserFilter {
        search: "student3".to_string(),
        ..Default::default()
    };
    let found = db.list_users(&filter, 1, 10).await.unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].email, "student3@b.com");

    let filter = UserFilter { year: Some(1), ..Default::default() };
    let year_one = db.list_users(&filter, 1, 10).await.unwrap();
    assert_eq!(year_one.total, 6);

    let stats = db.user_statistics().await.unwrap();
    assert_eq!(stats.total, 12);
    assert_eq!(stats.active, 4);
    assert_eq!(stats.pending, 8);
    assert_eq!(stats.blocked, 0);
}

// ----- questions -----

#[tokio::test]
async fn question_crud_round_trip() {
    let db = create_test_db().await;

    let id = db
        .create_question(&question_form("What is enamel?", "Histology", "c"))
        .await
        .unwrap();

    let loaded = db.get_question(id).await.unwrap();
    assert_eq!(loaded.question.question_text, "What is enamel?");
    assert_eq!(loaded.options.len(), 4);
    let correct: Vec<_> = loaded.options.iter().filter(|o| o.is_correct).collect();
    assert_eq!(correct.len(), 1);
    assert_eq!(correct[0].option_letter, "c");

    let mut updated = question_form("What is dentin?", "Histology", "a");
    updated.difficulty = "hard".to_string();
    db.update_question(id, &updated).await.unwrap();

    let loaded = db.get_question(id).await.unwrap();
    assert_eq!(loaded.question.question_text, "What is dentin?");
    assert_eq!(loaded.question.difficulty, "hard");
    let correct: Vec<_> = loaded.options.iter().filter(|o| o.is_correct).collect();
    assert_eq!(correct[0].option_letter, "a");

    db.delete_question(id).await.unwrap();
    assert!(db.get_question(id).await.is_err());
    // Options are cascaded away with the question.
    assert!(db.get_options(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn question_list_filters_by_module_and_difficulty() {
    let db = create_test_db().await;

    seed_questions(&db, "Periodontics", &["a", "b"]).await;
    seed_questions(&db, "Endodontics", &["c"]).await;

    let all = db
        .list_questions(&QuestionFilter::default(), 1, 10)
        .await
        .unwrap();
    assert_eq!(all.total, 3);

    let filter = QuestionFilter {
        module: "Periodontics".to_string(),
        ..Default::default()
    };
    let perio = db.list_questions(&filter, 1, 10).await.unwrap();
    assert_eq!(perio.total, 2);

    let modules = db.module_names().await.unwrap();
    assert_eq!(modules, vec!["Endodontics".to_string(), "Periodontics".to_string()]);

    let ids = db.question_ids_for_quiz("Endodontics", None).await.unwrap();
    assert_eq!(ids.len(), 1);
    let ids = db.question_ids_for_quiz("", Some(1)).await.unwrap();
    assert_eq!(ids.len(), 3);
}

// ----- access codes -----

#[tokio::test]
async fn code_redemption_is_one_way() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("code@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    let code = db.insert_code("TQ1-ABC123", "1st Year Package").await.unwrap();
    assert_eq!(code.status, "unused");

    let outcome = db.redeem_code("TQ1-ABC123", user_id).await.unwrap();
    assert!(matches!(
        outcome,
        RedeemOutcome::Redeemed { ref package } if package == "1st Year Package"
    ));

    let reloaded = db.get_code(code.id).await.unwrap();
    assert_eq!(reloaded.status, "used");
    assert_eq!(reloaded.used_by, Some(user_id));
    assert!(reloaded.used_date.is_some());

    // A second redemption is refused.
    let outcome = db.redeem_code("TQ1-ABC123", user_id).await.unwrap();
    assert!(matches!(outcome, RedeemOutcome::AlreadyUsed));

    let outcome = db.redeem_code("TQ9-NOPE00", user_id).await.unwrap();
    assert!(matches!(outcome, RedeemOutcome::NotFound));
}

#[tokio::test]
async fn expired_codes_cannot_be_redeemed_or_reexpired() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("code2@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    let code = db.insert_code("TQ2-XYZ789", "2nd Year Package").await.unwrap();

    assert!(db.expire_code(code.id).await.unwrap());
    let outcome = db.redeem_code("TQ2-XYZ789", user_id).await.unwrap();
    assert!(matches!(outcome, RedeemOutcome::Expired));

    // Expiring again reports no change.
    assert!(!db.expire_code(code.id).await.unwrap());

    // A used code cannot be expired.
    let used = db.insert_code("TQ2-USED00", "2nd Year Package").await.unwrap();
    db.redeem_code("TQ2-USED00", user_id).await.unwrap();
    assert!(!db.expire_code(used.id).await.unwrap());
}

#[tokio::test]
async fn code_statistics_count_by_status() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("code3@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    db.insert_code("TQC-AAAAA1", "Complete Package").await.unwrap();
    db.insert_code("TQC-AAAAA2", "Complete Package").await.unwrap();
    let expired = db.insert_code("TQC-AAAAA3", "Complete Package").await.unwrap();
    db.expire_code(expired.id).await.unwrap();
    db.redeem_code("TQC-AAAAA1", user_id).await.unwrap();

    let stats = db.code_statistics().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.unused, 1);
    assert_eq!(stats.used, 1);
    assert_eq!(stats.expired, 1);
}

#[tokio::test]
async fn redeeming_activates_pending_subscription() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("sub@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    db.activate_subscription(user_id, "3rd Year Package").await.unwrap();

    let user = db.get_user(user_id).await.unwrap();
    assert_eq!(user.status, "active");
    assert_eq!(user.subscription_plan.as_deref(), Some("3rd Year Package"));
    assert!(user.subscription_expiry.is_some());
}

// ----- calendar -----

fn event_form(title: &str) -> EventForm {
    serde_json::from_value(serde_json::json!({
        "title": title,
        "description": "desc",
        "event_type": "exam",
        "event_date": "2026-09-01T09:00",
        "location": "Room 4",
        "priority": "high",
        "reminder_enabled": true,
        "tags": "perio, final",
    }))
    .expect("valid event form")
}

#[tokio::test]
async fn calendar_event_crud_and_toggle() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("cal@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    let event = db.create_event(user_id, &event_form("Perio final")).await.unwrap();
    assert_eq!(event.title, "Perio final");
    assert_eq!(event.tag_list(), vec!["perio".to_string(), "final".to_string()]);
    assert!(!event.is_completed);

    let mut form = event_form("Perio final (moved)");
    form.priority = "low".to_string();
    let updated = db.update_event(event.id, user_id, &form).await.unwrap();
    assert_eq!(updated.title, "Perio final (moved)");
    assert_eq!(updated.priority, "low");

    assert!(db.toggle_event_completed(event.id, user_id).await.unwrap());
    assert!(!db.toggle_event_completed(event.id, user_id).await.unwrap());

    // Another user cannot see or delete the event.
    let other_id = db
        .create_user("cal2@b.com", "password123", "Other", "", None)
        .await
        .unwrap();
    assert!(db.get_event(event.id, other_id).await.is_err());
    assert!(db.list_events(other_id).await.unwrap().is_empty());

    db.delete_event(event.id, user_id).await.unwrap();
    assert!(db.list_events(user_id).await.unwrap().is_empty());
}

// ----- attempt history -----

#[tokio::test]
async fn attempt_history_is_append_only() {
    let db = create_test_db().await;
    let user_id = db
        .create_user("hist@b.com", "password123", "Student", "", None)
        .await
        .unwrap();

    db.record_attempt(user_id, "Periodontics", 60, 5, 420).await.unwrap();
    db.record_attempt(user_id, "Periodontics", 60, 5, 420).await.unwrap();
    db.record_attempt(user_id, "Endodontics", 80, 10, 900).await.unwrap();

    // Duplicates are kept: the history has no dedup.
    let attempts = db.list_attempts(user_id).await.unwrap();
    assert_eq!(attempts.len(), 3);
    assert_eq!(db.attempts_count(user_id).await.unwrap(), 3);

    assert!(attempts.iter().any(|a| a.title == "Endodontics" && a.score == 80));
}
