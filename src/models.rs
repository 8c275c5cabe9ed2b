use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Question authoring payload, shared by single create, edit, and bulk
/// import. Validation lives in `services::questions`.
#[derive(Clone, Deserialize)]
pub struct QuestionForm {
    pub question_text: String,
    pub module_name: String,
    #[serde(default)]
    pub course_name: String,
    pub year: i64,
    pub difficulty: String,
    #[serde(default)]
    pub explanation: String,
    pub options: Vec<OptionForm>,
}

#[derive(Clone, Deserialize)]
pub struct OptionForm {
    pub letter: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// Parse the value of a `datetime-local` input, which carries no timezone
/// and usually no seconds. Full RFC 3339 timestamps are accepted too.
fn deserialize_event_date<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<DateTime<Utc>, D::Error> {
    use chrono::NaiveDateTime;
    use serde::de::Error;

    let raw = String::deserialize(d)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(D::Error::custom(format!("unrecognized date: {raw}")))
}

/// Calendar event payload for create and update.
#[derive(Clone, Deserialize)]
pub struct EventForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_type: String,
    #[serde(deserialize_with = "deserialize_event_date")]
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub priority: String,
    /// Absent when the checkbox is unchecked.
    #[serde(default)]
    pub reminder_enabled: bool,
    /// Comma-separated in the form; stored as a JSON array.
    #[serde(default)]
    pub tags: String,
}

impl EventForm {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
