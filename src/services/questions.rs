use crate::models::QuestionForm;
use crate::names;

/// Form-level validation failure, surfaced to the author before any
/// write happens.
#[derive(Debug, PartialEq, Eq)]
pub enum QuestionError {
    EmptyQuestionText,
    EmptyModule,
    BadYear,
    BadDifficulty,
    WrongOptionCount,
    BadOptionLetter,
    EmptyOptionText,
    /// Exactly one option must be marked correct.
    NotExactlyOneCorrect,
}

impl QuestionError {
    pub fn message(&self) -> &'static str {
        match self {
            QuestionError::EmptyQuestionText => "Question text is required",
            QuestionError::EmptyModule => "Module is required",
            QuestionError::BadYear => "Year must be between 1 and 5",
            QuestionError::BadDifficulty => "Unknown difficulty",
            QuestionError::WrongOptionCount => "A question needs options a through d",
            QuestionError::BadOptionLetter => "Option letters must be a, b, c, d",
            QuestionError::EmptyOptionText => "Every option needs text",
            QuestionError::NotExactlyOneCorrect => "Exactly one option must be correct",
        }
    }
}

/// Validate an authored question: required fields, the lettering scheme,
/// and the exactly-one-correct invariant.
pub fn validate(form: &QuestionForm) -> Result<(), QuestionError> {
    if form.question_text.trim().is_empty() {
        return Err(QuestionError::EmptyQuestionText);
    }
    if form.module_name.trim().is_empty() {
        return Err(QuestionError::EmptyModule);
    }
    if !(1..=5).contains(&form.year) {
        return Err(QuestionError::BadYear);
    }
    if !names::DIFFICULTIES.contains(&form.difficulty.as_str()) {
        return Err(QuestionError::BadDifficulty);
    }
    if form.options.len() != names::OPTION_LETTERS.len() {
        return Err(QuestionError::WrongOptionCount);
    }

    let mut letters: Vec<&str> = form.options.iter().map(|o| o.letter.as_str()).collect();
    letters.sort_unstable();
    if letters != names::OPTION_LETTERS {
        return Err(QuestionError::BadOptionLetter);
    }

    if form.options.iter().any(|o| o.text.trim().is_empty()) {
        return Err(QuestionError::EmptyOptionText);
    }

    let correct = form.options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err(QuestionError::NotExactlyOneCorrect);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionForm;

    fn option(letter: &str, correct: bool) -> OptionForm {
        OptionForm {
            letter: letter.to_string(),
            text: format!("Option {letter}"),
            is_correct: correct,
        }
    }

    fn valid_form() -> QuestionForm {
        QuestionForm {
            question_text: "What is the primary function of the dental pulp?".to_string(),
            module_name: "Endodontics".to_string(),
            course_name: "Pulp Biology".to_string(),
            year: 2,
            difficulty: "medium".to_string(),
            explanation: "The pulp forms dentin and provides sensation.".to_string(),
            options: vec![
                option("a", false),
                option("b", true),
                option("c", false),
                option("d", false),
            ],
        }
    }

    #[test]
    fn valid_form_passes() {
        assert_eq!(validate(&valid_form()), Ok(()));
    }

    #[test]
    fn empty_question_text_is_rejected() {
        let mut form = valid_form();
        form.question_text = "   ".to_string();
        assert_eq!(validate(&form), Err(QuestionError::EmptyQuestionText));
    }

    #[test]
    fn year_out_of_range_is_rejected() {
        let mut form = valid_form();
        form.year = 0;
        assert_eq!(validate(&form), Err(QuestionError::BadYear));
        form.year = 6;
        assert_eq!(validate(&form), Err(QuestionError::BadYear));
    }

    #[test]
    fn zero_correct_options_is_rejected() {
        let mut form = valid_form();
        form.options = vec![
            option("a", false),
            option("b", false),
            option("c", false),
            option("d", false),
        ];
        assert_eq!(validate(&form), Err(QuestionError::NotExactlyOneCorrect));
    }

    #[test]
    fn two_correct_options_is_rejected() {
        let mut form = valid_form();
        form.options = vec![
            option("a", true),
            option("b", true),
            option("c", false),
            option("d", false),
        ];
        assert_eq!(validate(&form), Err(QuestionError::NotExactlyOneCorrect));
    }

    #[test]
    fn missing_option_letter_is_rejected() {
        let mut form = valid_form();
        form.options = vec![
            option("a", true),
            option("a", false),
            option("c", false),
            option("d", false),
        ];
        assert_eq!(validate(&form), Err(QuestionError::BadOptionLetter));
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let mut form = valid_form();
        form.options.pop();
        assert_eq!(validate(&form), Err(QuestionError::WrongOptionCount));
    }
}
