mod common;

use axum::{
    body::Body,
    http::{
        header::{COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
};
use toothquest::{names, router, AppState};
use tower::ServiceExt;

struct Client {
    app: axum::Router,
    cookies: Vec<String>,
}

impl Client {
    fn cookie_header(&self) -> String {
        self.cookies.join("; ")
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(COOKIE, self.cookie_header())
            .body(Body::empty())
            .expect("request build should succeed");
        let resp = self.app.clone().oneshot(req).await.expect("router should respond");
        read_response(resp).await
    }

    async fn post(&mut self, uri: &str, body: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .header("HX-Request", "true")
            .header(COOKIE, self.cookie_header())
            .body(Body::from(body.to_string()))
            .expect("request build should succeed");
        let resp = self.app.clone().oneshot(req).await.expect("router should respond");

        for value in resp.headers().get_all(SET_COOKIE) {
            if let Ok(cookie) = value.to_str() {
                let pair = cookie.split(';').next().unwrap_or_default().to_string();
                if !pair.is_empty() {
                    self.cookies.push(pair);
                }
            }
        }

        read_response(resp).await
    }
}

async fn read_response(resp: axum::response::Response) -> (StatusCode, String) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn full_quiz_run_scores_sixty_percent_and_records_history() {
    let db = common::create_test_db().await;
    let (user_id, session) = common::create_logged_in_student(&db, "quiz@example.com").await;
    let answers = ["c", "b", "d", "b", "a"];
    let ids = common::seed_questions(&db, "Periodontics", &answers).await;

    let mut client = Client {
        app: router(AppState::new(db.clone(), false)),
        cookies: vec![format!("{}={}", names::USER_SESSION_COOKIE_NAME, session)],
    };

    // Start a 5-question quiz over the seeded module.
    let (status, body) = client
        .post(
            names::START_QUIZ_URL,
            "module=Periodontics&year=&question_count=5",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("of 5"), "question header should show the total");
    assert!(
        client.cookies.iter().any(|c| c.starts_with(names::QUIZ_SESSION_COOKIE_NAME)),
        "starting a quiz should set the quiz cookie",
    );

    // Answer correctly for the first three questions, incorrectly for
    // the last two, revealing each answer along the way. Selection and
    // reveal address questions by id, independent of display order.
    for (i, qid) in ids.iter().enumerate() {
        let correct = answers[i];
        let letter = if i < 3 {
            correct.to_string()
        } else {
            // Any letter that is not the correct one.
            ["a", "b", "c", "d"]
                .into_iter()
                .find(|l| *l != correct)
                .expect("some wrong letter")
                .to_string()
        };

        let (status, _) = client
            .post(
                names::QUIZ_SELECT_URL,
                &format!("question_id={qid}&letter={letter}"),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = client
            .post(names::QUIZ_REVEAL_URL, &format!("question_id={qid}"))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Every answer is revealed now, so the displayed question marks the
    // correct option.
    let (status, body) = client.get(&names::quiz_question_url(0)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Correct"), "revealed view should mark the answer");

    // Finish: 3/5 correct is 60%, which is the inclusive lower bound of
    // the "on the right track" band.
    let (status, body) = client.post(names::QUIZ_FINISH_URL, "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("60%"), "results should show the score");
    assert!(body.contains("3 of 5 correct"));
    assert!(
        body.contains("on the right track"),
        "60 lands in the on-track band, not the good-job band",
    );

    // The summary is appended to the attempt history exactly once.
    let attempts = db.list_attempts(user_id).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].score, 60);
    assert_eq!(attempts[0].questions_count, 5);
    assert_eq!(attempts[0].title, "Periodontics");

    // Revisiting the results does not append another record.
    let (status, _) = client.get(names::QUIZ_RESULTS_URL).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.list_attempts(user_id).await.unwrap().len(), 1);

    // Review mode walks the questions again with answers intact.
    let (status, body) = client.post(names::QUIZ_REVIEW_URL, "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("of 5"));
    assert!(body.contains("Correct"), "review shows the correct answers");
}

#[tokio::test]
async fn starting_a_quiz_with_no_matching_questions_is_terminal() {
    let db = common::create_test_db().await;
    let (_user_id, session) = common::create_logged_in_student(&db, "empty@example.com").await;

    let mut client = Client {
        app: router(AppState::new(db, false)),
        cookies: vec![format!("{}={}", names::USER_SESSION_COOKIE_NAME, session)],
    };

    let (status, body) = client
        .post(names::START_QUIZ_URL, "module=Nonexistent&year=&question_count=5")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Quiz Not Found"));
}

#[tokio::test]
async fn quiz_operations_without_a_session_render_not_found() {
    let db = common::create_test_db().await;
    let (_user_id, session) = common::create_logged_in_student(&db, "lost@example.com").await;

    let mut client = Client {
        app: router(AppState::new(db, false)),
        cookies: vec![format!("{}={}", names::USER_SESSION_COOKIE_NAME, session)],
    };

    let (status, body) = client.post(names::QUIZ_FINISH_URL, "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Quiz Not Found"));
}
