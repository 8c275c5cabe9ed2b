use std::collections::{BTreeMap, BTreeSet};

use crate::db::models::QuestionWithOptions;
use crate::names;

// ---------------------------------------------------------------------------
// Question snapshot
// ---------------------------------------------------------------------------

/// An immutable snapshot of one question as the engine sees it. Built once
/// at session start; the engine never touches the database afterwards.
#[derive(Clone)]
pub struct QuizQuestion {
    pub id: i64,
    pub text: String,
    pub module: String,
    pub options: Vec<QuizOption>,
    /// Letter of the correct option.
    pub answer: String,
    pub explanation: String,
}

#[derive(Clone)]
pub struct QuizOption {
    pub letter: String,
    pub text: String,
}

impl From<QuestionWithOptions> for QuizQuestion {
    fn from(q: QuestionWithOptions) -> Self {
        let answer = q
            .options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| o.option_letter.clone())
            .unwrap_or_default();

        QuizQuestion {
            id: q.question.id,
            text: q.question.question_text,
            module: q.question.module_name,
            options: q
                .options
                .into_iter()
                .map(|o| QuizOption { letter: o.option_letter, text: o.option_text })
                .collect(),
            answer,
            explanation: q.question.explanation,
        }
    }
}

// ---------------------------------------------------------------------------
// Score and feedback banding
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percent: i64,
}

/// Feedback bands with inclusive lower bounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feedback {
    Excellent,
    VeryGood,
    Good,
    OnTrack,
    NeedsReview,
}

impl Feedback {
    pub fn from_percent(percent: i64) -> Self {
        match percent {
            p if p >= 90 => Feedback::Excellent,
            p if p >= 80 => Feedback::VeryGood,
            p if p >= 70 => Feedback::Good,
            p if p >= 60 => Feedback::OnTrack,
            _ => Feedback::NeedsReview,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Feedback::Excellent => "Excellent! You have mastered this topic.",
            Feedback::VeryGood => "Very good! Just a few more concepts to solidify.",
            Feedback::Good => "Good job! You have a decent understanding of the material.",
            Feedback::OnTrack => "You're on the right track, but need more practice.",
            Feedback::NeedsReview => "You should review this topic more thoroughly.",
        }
    }
}

// ---------------------------------------------------------------------------
// Session state machine
// ---------------------------------------------------------------------------

/// A single student's walk through a fixed, ordered question list.
///
/// The machine is pure: time only advances through `tick`, which the
/// caller drives from whatever clock it has. Completion is one-way; the
/// "review answers" mode is a display toggle that leaves every recorded
/// answer intact.
pub struct QuizSession {
    title: String,
    questions: Vec<QuizQuestion>,
    current_index: usize,
    selected: BTreeMap<i64, String>,
    eliminated: BTreeMap<i64, BTreeSet<String>>,
    revealed: BTreeSet<i64>,
    flagged: BTreeSet<i64>,
    remaining_seconds: u32,
    elapsed_seconds: u32,
    completed: bool,
    reviewing: bool,
}

impl QuizSession {
    pub fn new(title: String, questions: Vec<QuizQuestion>) -> Self {
        Self::with_time_budget(title, questions, names::QUIZ_TIME_BUDGET_SECS)
    }

    pub fn with_time_budget(title: String, questions: Vec<QuizQuestion>, budget_seconds: u32) -> Self {
        QuizSession {
            title,
            questions,
            current_index: 0,
            selected: BTreeMap::new(),
            eliminated: BTreeMap::new(),
            revealed: BTreeSet::new(),
            flagged: BTreeSet::new(),
            remaining_seconds: budget_seconds,
            elapsed_seconds: 0,
            completed: false,
            reviewing: false,
        }
    }

    // ----- transitions -----

    /// Record a selection. Rejected once the answer is revealed and for
    /// options the student has struck out.
    pub fn select_option(&mut self, question_id: i64, letter: &str) {
        if self.completed || self.revealed.contains(&question_id) {
            return;
        }
        if self
            .eliminated
            .get(&question_id)
            .is_some_and(|set| set.contains(letter))
        {
            return;
        }
        if !self.option_exists(question_id, letter) {
            return;
        }
        self.selected.insert(question_id, letter.to_string());
    }

    /// Toggle an option in the strike-out set. Advisory only: scoring
    /// never looks at eliminations.
    pub fn eliminate_option(&mut self, question_id: i64, letter: &str) {
        if self.completed || self.revealed.contains(&question_id) {
            return;
        }
        if !self.option_exists(question_id, letter) {
            return;
        }
        let set = self.eliminated.entry(question_id).or_default();
        if !set.remove(letter) {
            set.insert(letter.to_string());
        }
    }

    /// Show the correct answer and explanation. Requires a selection;
    /// one-way per question.
    pub fn reveal_answer(&mut self, question_id: i64) {
        if self.completed || !self.selected.contains_key(&question_id) {
            return;
        }
        self.revealed.insert(question_id);
    }

    pub fn toggle_flag(&mut self, question_id: i64) {
        if self.completed {
            return;
        }
        if !self.flagged.remove(&question_id) {
            self.flagged.insert(question_id);
        }
    }

    /// Non-linear navigation: jump to any question, visited or not.
    /// Touches nothing but the index.
    pub fn go_to(&mut self, index: usize) {
        if index < self.questions.len() {
            self.current_index = index;
        }
    }

    /// Advance the countdown by an externally measured delta. Reaching
    /// zero forces completion, exactly once, regardless of unanswered
    /// questions.
    pub fn tick(&mut self, delta_seconds: u32) {
        if self.completed {
            return;
        }
        let consumed = delta_seconds.min(self.remaining_seconds);
        self.elapsed_seconds += consumed;
        self.remaining_seconds -= consumed;
        if self.remaining_seconds == 0 {
            self.completed = true;
        }
    }

    /// Explicit finish. One-way; there is no way back to in-progress.
    pub fn finish(&mut self) {
        self.completed = true;
    }

    /// Display-mode toggle: walk the questions again with every recorded
    /// answer intact. Not a state reversal.
    pub fn enter_review(&mut self) {
        if self.completed {
            self.reviewing = true;
            self.current_index = 0;
        }
    }

    pub fn leave_review(&mut self) {
        self.reviewing = false;
    }

    // ----- derived state -----

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.questions[self.current_index]
    }

    pub fn question_at(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn selected_letter(&self, question_id: i64) -> Option<&str> {
        self.selected.get(&question_id).map(String::as_str)
    }

    pub fn is_eliminated(&self, question_id: i64, letter: &str) -> bool {
        self.eliminated
            .get(&question_id)
            .is_some_and(|set| set.contains(letter))
    }

    pub fn is_revealed(&self, question_id: i64) -> bool {
        self.revealed.contains(&question_id)
    }

    pub fn is_flagged(&self, question_id: i64) -> bool {
        self.flagged.contains(&question_id)
    }

    pub fn is_answered(&self, question_id: i64) -> bool {
        self.selected.contains_key(&question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    pub fn progress_percent(&self) -> i64 {
        if self.questions.is_empty() {
            return 0;
        }
        round_percent(self.answered_count(), self.questions.len())
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn time_spent_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_reviewing(&self) -> bool {
        self.reviewing
    }

    /// Pure function of the final selection map.
    pub fn score(&self) -> Score {
        let correct = self
            .questions
            .iter()
            .filter(|q| self.selected.get(&q.id).is_some_and(|s| *s == q.answer))
            .count();
        let total = self.questions.len();
        let percent = if total == 0 { 0 } else { round_percent(correct, total) };
        Score { correct, total, percent }
    }

    pub fn feedback(&self) -> Feedback {
        Feedback::from_percent(self.score().percent)
    }

    fn option_exists(&self, question_id: i64, letter: &str) -> bool {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .is_some_and(|q| q.options.iter().any(|o| o.letter == letter))
    }
}

/// Round half away from zero, matching the original's `Math.round`.
fn round_percent(part: usize, whole: usize) -> i64 {
    (part as f64 * 100.0 / whole as f64).round() as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn option(letter: &str) -> QuizOption {
        QuizOption { letter: letter.to_string(), text: format!("Option {letter}") }
    }

    fn question(id: i64, answer: &str) -> QuizQuestion {
        QuizQuestion {
            id,
            text: format!("Question {id}"),
            module: "Periodontics".to_string(),
            options: vec![option("a"), option("b"), option("c"), option("d")],
            answer: answer.to_string(),
            explanation: String::new(),
        }
    }

    /// Five questions with answers c, b, d, b, a.
    fn sample_session() -> QuizSession {
        let questions = vec![
            question(1, "c"),
            question(2, "b"),
            question(3, "d"),
            question(4, "b"),
            question(5, "a"),
        ];
        QuizSession::new("Dental Materials and Periodontics".to_string(), questions)
    }

    #[test]
    fn score_is_deterministic_over_selection() {
        let mut session = sample_session();
        for (qid, letter) in [(1, "c"), (2, "b"), (3, "d"), (4, "b"), (5, "a")] {
            session.select_option(qid, letter);
        }
        assert_eq!(session.score(), Score { correct: 5, total: 5, percent: 100 });

        let mut session = sample_session();
        for qid in 1..=5 {
            session.select_option(qid, "a");
        }
        // Only question 5 has answer "a".
        assert_eq!(session.score(), Score { correct: 1, total: 5, percent: 20 });
    }

    #[test]
    fn score_rounds_half_up() {
        let questions = vec![question(1, "a"), question(2, "a"), question(3, "a")];
        let mut session = QuizSession::new("Rounding".to_string(), questions);
        session.select_option(1, "a");
        // 1/3 => 33.33 rounds to 33
        assert_eq!(session.score().percent, 33);
        session.select_option(2, "a");
        // 2/3 => 66.67 rounds to 67
        assert_eq!(session.score().percent, 67);
    }

    #[test]
    fn reveal_is_one_way_and_locks_selection() {
        let mut session = sample_session();
        session.select_option(1, "c");
        session.reveal_answer(1);
        assert!(session.is_revealed(1));

        session.select_option(1, "a");
        assert_eq!(session.selected_letter(1), Some("c"));

        // Elimination is also locked after reveal.
        session.eliminate_option(1, "b");
        assert!(!session.is_eliminated(1, "b"));
    }

    #[test]
    fn reveal_requires_a_selection() {
        let mut session = sample_session();
        session.reveal_answer(1);
        assert!(!session.is_revealed(1));
    }

    #[test]
    fn eliminated_option_cannot_be_selected() {
        let mut session = sample_session();
        session.eliminate_option(1, "c");
        session.select_option(1, "c");
        assert_eq!(session.selected_letter(1), None);

        // Un-eliminating makes it selectable again.
        session.eliminate_option(1, "c");
        session.select_option(1, "c");
        assert_eq!(session.selected_letter(1), Some("c"));
    }

    #[test]
    fn elimination_does_not_affect_scoring() {
        let mut session = sample_session();
        for (qid, letter) in [(1, "c"), (2, "b"), (3, "d")] {
            session.select_option(qid, letter);
        }
        let before = session.score();

        session.eliminate_option(4, "a");
        session.eliminate_option(4, "c");
        session.eliminate_option(5, "d");
        session.eliminate_option(5, "d");
        assert_eq!(session.score(), before);
    }

    #[test]
    fn timer_expiry_forces_completion_exactly_once() {
        let mut session = sample_session();
        assert!(!session.is_completed());

        for _ in 0..1800 {
            session.tick(1);
        }
        assert!(session.is_completed());
        assert_eq!(session.remaining_seconds(), 0);
        assert_eq!(session.time_spent_seconds(), 1800);

        // Further ticks change nothing.
        session.tick(1);
        assert!(session.is_completed());
        assert_eq!(session.time_spent_seconds(), 1800);
    }

    #[test]
    fn time_spent_is_capped_at_the_budget() {
        let mut session = sample_session();
        session.tick(10_000);
        assert!(session.is_completed());
        assert_eq!(session.time_spent_seconds(), crate::names::QUIZ_TIME_BUDGET_SECS);
    }

    #[test]
    fn navigation_changes_only_the_index() {
        let mut session = sample_session();
        session.select_option(1, "c");
        session.eliminate_option(2, "a");
        session.toggle_flag(3);
        session.select_option(4, "b");
        session.reveal_answer(4);

        session.go_to(3);
        assert_eq!(session.current_index(), 3);
        session.go_to(0);
        assert_eq!(session.current_index(), 0);
        // Out of range is a no-op.
        session.go_to(99);
        assert_eq!(session.current_index(), 0);

        assert_eq!(session.selected_letter(1), Some("c"));
        assert!(session.is_eliminated(2, "a"));
        assert!(session.is_flagged(3));
        assert!(session.is_revealed(4));
    }

    #[test]
    fn flag_toggle_is_idempotent_in_pairs() {
        let mut session = sample_session();
        assert!(!session.is_flagged(2));
        session.toggle_flag(2);
        assert!(session.is_flagged(2));
        session.toggle_flag(2);
        assert!(!session.is_flagged(2));
    }

    #[test]
    fn selections_after_completion_are_rejected() {
        let mut session = sample_session();
        session.select_option(1, "c");
        session.finish();
        assert!(session.is_completed());

        session.select_option(2, "b");
        assert_eq!(session.selected_letter(2), None);
        session.toggle_flag(1);
        assert!(!session.is_flagged(1));
    }

    #[test]
    fn review_is_a_display_toggle_not_a_reversal() {
        let mut session = sample_session();
        session.select_option(1, "c");
        session.finish();

        session.enter_review();
        assert!(session.is_reviewing());
        assert!(session.is_completed());
        assert_eq!(session.selected_letter(1), Some("c"));

        // Still no mutations allowed while reviewing.
        session.select_option(2, "b");
        assert_eq!(session.selected_letter(2), None);

        session.leave_review();
        assert!(!session.is_reviewing());
        assert!(session.is_completed());
    }

    #[test]
    fn review_before_completion_is_a_noop() {
        let mut session = sample_session();
        session.enter_review();
        assert!(!session.is_reviewing());
    }

    #[test]
    fn progress_tracks_answered_count() {
        let mut session = sample_session();
        assert_eq!(session.progress_percent(), 0);
        session.select_option(1, "c");
        session.select_option(2, "a");
        assert_eq!(session.progress_percent(), 40);
    }

    #[test]
    fn end_to_end_sixty_percent_lands_on_the_on_track_band() {
        let mut session = sample_session();
        // Correct for questions 1-3, incorrect for 4-5.
        for (qid, letter) in [(1, "c"), (2, "b"), (3, "d"), (4, "a"), (5, "c")] {
            session.select_option(qid, letter);
            session.reveal_answer(qid);
        }
        session.finish();

        let score = session.score();
        assert_eq!(score, Score { correct: 3, total: 5, percent: 60 });
        // 60 is the inclusive lower bound of the "on the right track"
        // band, not the "good job" band.
        assert_eq!(session.feedback(), Feedback::OnTrack);
        assert_eq!(
            session.feedback().message(),
            "You're on the right track, but need more practice."
        );
    }

    #[test]
    fn feedback_band_boundaries_are_inclusive() {
        assert_eq!(Feedback::from_percent(100), Feedback::Excellent);
        assert_eq!(Feedback::from_percent(90), Feedback::Excellent);
        assert_eq!(Feedback::from_percent(89), Feedback::VeryGood);
        assert_eq!(Feedback::from_percent(80), Feedback::VeryGood);
        assert_eq!(Feedback::from_percent(79), Feedback::Good);
        assert_eq!(Feedback::from_percent(70), Feedback::Good);
        assert_eq!(Feedback::from_percent(69), Feedback::OnTrack);
        assert_eq!(Feedback::from_percent(60), Feedback::OnTrack);
        assert_eq!(Feedback::from_percent(59), Feedback::NeedsReview);
        assert_eq!(Feedback::from_percent(0), Feedback::NeedsReview);
    }

    #[test]
    fn unknown_options_are_ignored() {
        let mut session = sample_session();
        session.select_option(1, "z");
        assert_eq!(session.selected_letter(1), None);
        session.eliminate_option(1, "z");
        assert!(!session.is_eliminated(1, "z"));
        session.select_option(999, "a");
        assert_eq!(session.selected_letter(999), None);
    }
}
