use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::topic::Mcq;

/// Copy of a question as it looked when the attempt was started.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionSnapshot {
    pub mcq_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl From<&Mcq> for QuestionSnapshot {
    fn from(mcq: &Mcq) -> Self {
        QuestionSnapshot {
            mcq_id: mcq.id.clone(),
            question: mcq.question.clone(),
            options: mcq.options.clone(),
            answer: mcq.answer.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestAnalysis {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvement_tips: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestAttempt {
    pub id: String,
    pub student_id: String,
    pub topic_id: String,
    pub questions: Vec<QuestionSnapshot>,
    /// Aligned with `questions`; empty until the attempt is submitted.
    pub answers: Vec<String>,
    pub score: u32,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<TestAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TestAttempt {
    pub fn start(student_id: &str, topic_id: &str, questions: Vec<QuestionSnapshot>) -> Self {
        TestAttempt {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            topic_id: topic_id.to_string(),
            questions,
            answers: Vec::new(),
            score: 0,
            completed: false,
            analysis: None,
            created_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    /// The one state transition an attempt has.
    pub fn complete(&mut self, answers: Vec<String>, score: u32, analysis: Option<TestAnalysis>) {
        self.answers = answers;
        self.score = score;
        self.analysis = analysis;
        self.completed = true;
        self.completed_at = Some(Utc::now());
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, answer: &str) -> QuestionSnapshot {
        QuestionSnapshot {
            mcq_id: id.to_string(),
            question: format!("question {}", id),
            options: vec![answer.to_string(), "other".to_string()],
            answer: answer.to_string(),
        }
    }

    #[test]
    fn started_attempt_is_in_progress() {
        let attempt = TestAttempt::start("s-1", "topic-1", vec![snapshot("q1", "A")]);

        assert!(!attempt.completed);
        assert!(attempt.answers.is_empty());
        assert_eq!(attempt.score, 0);
        assert!(attempt.completed_at.is_none());
    }

    #[test]
    fn complete_fills_answers_and_score() {
        let mut attempt =
            TestAttempt::start("s-1", "topic-1", vec![snapshot("q1", "A"), snapshot("q2", "B")]);

        attempt.complete(vec!["A".into(), "C".into()], 1, None);

        assert!(attempt.completed);
        assert_eq!(attempt.answers.len(), attempt.total_questions());
        assert_eq!(attempt.score, 1);
        assert!(attempt.completed_at.is_some());
    }

    #[test]
    fn snapshot_is_independent_of_the_source_question() {
        let mut mcq = Mcq::new(
            "topic-1",
            "Capital of France?".into(),
            vec!["Paris".into(), "Rome".into(), "Oslo".into(), "Bern".into()],
            "Paris".into(),
        );
        let snap = QuestionSnapshot::from(&mcq);

        mcq.answer = "Rome".into();

        assert_eq!(snap.answer, "Paris");
        assert_eq!(snap.mcq_id, mcq.id);
    }
}
