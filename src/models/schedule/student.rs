use serde::Deserialize;

/// `class_schedule_type` value of students enrolled in short-term classes.
/// Regular-class students carry `常態班` and are scheduled elsewhere.
pub const SHORT_TERM_CLASS: &str = "短期班";

/// The student whose week is being edited, as served by `GET /api/students/{id}`.
/// Only the columns the schedule screen needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Student {
    pub id: i64,
    #[serde(rename = "chinese_name")]
    pub name: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub class_schedule_type: Option<String>,
}

impl Student {
    pub fn is_short_term(&self) -> bool {
        self.class_schedule_type.as_deref().map(str::trim) == Some(SHORT_TERM_CLASS)
    }

    /// `"王小明 (Amy)"`, or just the name when there is no English name.
    pub fn display_name(&self) -> String {
        match self.english_name.as_deref().map(str::trim) {
            Some(english) if !english.is_empty() => format!("{} ({})", self.name, english),
            _ => self.name.clone(),
        }
    }
}
