use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MAX_MARKS: f64 = 100.0;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub teacher_id: String,
    /// Teacher-authored grading guidelines handed to the evaluator.
    pub rubric: String,
    pub max_marks: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(
        title: &str,
        description: &str,
        teacher_id: &str,
        rubric: &str,
        max_marks: Option<f64>,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        Assignment {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            teacher_id: teacher_id.to_string(),
            rubric: rubric.to_string(),
            max_marks: max_marks.unwrap_or(DEFAULT_MAX_MARKS),
            due_date,
            created_at: Some(Utc::now()),
        }
    }

    /// Bounds an evaluator score to `[0, max_marks]`.
    pub fn clamp_score(&self, score: f64) -> f64 {
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, self.max_marks)
    }
}
