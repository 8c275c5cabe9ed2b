use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use ulid::Ulid;

use crate::services::quiz::QuizSession;

/// One live quiz plus the instant its countdown was last synced.
struct ActiveQuiz {
    user_id: i64,
    session: QuizSession,
    last_tick: DateTime<Utc>,
    recorded: bool,
}

/// Process-local store of in-flight quiz sessions, keyed by the opaque
/// token carried in the quiz cookie. Sessions are ephemeral and
/// best-effort: a restart loses them, matching the original's in-browser
/// state.
#[derive(Clone, Default)]
pub struct QuizStore {
    inner: Arc<Mutex<HashMap<String, ActiveQuiz>>>,
}

impl QuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and hand back its token.
    pub fn insert(&self, user_id: i64, session: QuizSession, now: DateTime<Utc>) -> String {
        let token = Ulid::new().to_string();
        let mut map = self.inner.lock().expect("quiz store lock poisoned");
        map.insert(
            token.clone(),
            ActiveQuiz { user_id, session, last_tick: now, recorded: false },
        );
        token
    }

    /// Claim the one-shot right to persist this session's summary.
    /// Returns true exactly once per completed session.
    pub fn record_once(&self, token: &str, user_id: i64) -> bool {
        let mut map = self.inner.lock().expect("quiz store lock poisoned");
        let Some(active) = map.get_mut(token) else {
            return false;
        };
        if active.user_id != user_id || active.recorded || !active.session.is_completed() {
            return false;
        }
        active.recorded = true;
        true
    }

    /// Run `f` against the session behind `token`, after feeding the
    /// countdown the wall-clock seconds elapsed since the last sync.
    /// Returns None for unknown tokens and for tokens owned by another
    /// user.
    pub fn with_session<R>(
        &self,
        token: &str,
        user_id: i64,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut QuizSession) -> R,
    ) -> Option<R> {
        let mut map = self.inner.lock().expect("quiz store lock poisoned");
        let active = map.get_mut(token)?;
        if active.user_id != user_id {
            return None;
        }

        let delta = (now - active.last_tick).num_seconds().max(0) as u32;
        active.session.tick(delta);
        active.last_tick = now;

        Some(f(&mut active.session))
    }

    pub fn remove(&self, token: &str) {
        let mut map = self.inner.lock().expect("quiz store lock poisoned");
        map.remove(token);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("quiz store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::services::quiz::{QuizOption, QuizQuestion};

    fn one_question() -> Vec<QuizQuestion> {
        vec![QuizQuestion {
            id: 1,
            text: "Q".to_string(),
            module: "M".to_string(),
            options: vec![
                QuizOption { letter: "a".to_string(), text: "A".to_string() },
                QuizOption { letter: "b".to_string(), text: "B".to_string() },
            ],
            answer: "a".to_string(),
            explanation: String::new(),
        }]
    }

    #[test]
    fn elapsed_wall_clock_drives_the_countdown() {
        let store = QuizStore::new();
        let start = Utc::now();
        let session = QuizSession::new("T".to_string(), one_question());
        let token = store.insert(1, session, start);

        let later = start + Duration::seconds(120);
        let remaining = store
            .with_session(&token, 1, later, |s| s.remaining_seconds())
            .expect("session should exist");
        assert_eq!(remaining, crate::names::QUIZ_TIME_BUDGET_SECS - 120);
    }

    #[test]
    fn expired_budget_completes_the_session() {
        let store = QuizStore::new();
        let start = Utc::now();
        let session = QuizSession::new("T".to_string(), one_question());
        let token = store.insert(1, session, start);

        let later = start + Duration::seconds(31 * 60);
        let completed = store
            .with_session(&token, 1, later, |s| s.is_completed())
            .expect("session should exist");
        assert!(completed);
    }

    #[test]
    fn other_users_cannot_touch_the_session() {
        let store = QuizStore::new();
        let now = Utc::now();
        let token = store.insert(1, QuizSession::new("T".to_string(), one_question()), now);

        assert!(store.with_session(&token, 2, now, |_| ()).is_none());
        assert!(store.with_session("missing", 1, now, |_| ()).is_none());
    }

    #[test]
    fn record_once_fires_exactly_once_after_completion() {
        let store = QuizStore::new();
        let now = Utc::now();
        let token = store.insert(1, QuizSession::new("T".to_string(), one_question()), now);

        // Not completed yet: nothing to record.
        assert!(!store.record_once(&token, 1));

        store.with_session(&token, 1, now, |s| s.finish());
        assert!(store.record_once(&token, 1));
        assert!(!store.record_once(&token, 1));
        assert!(!store.record_once(&token, 2));
    }

    #[test]
    fn remove_forgets_the_token() {
        let store = QuizStore::new();
        let now = Utc::now();
        let token = store.insert(1, QuizSession::new("T".to_string(), one_question()), now);
        assert_eq!(store.len(), 1);

        store.remove(&token);
        assert!(store.is_empty());
        assert!(store.with_session(&token, 1, now, |_| ()).is_none());
    }
}
