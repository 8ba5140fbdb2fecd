use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::UserRole;

pub const MAX_QUESTIONS_PER_TOPIC: u32 = 20;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(length(min = 1, max = 10000, message = "A grading rubric is required"))]
    pub evaluation_prompt: String,

    #[validate(range(exclusive_min = 0.0, max = 10000.0, message = "maxMarks must be positive"))]
    pub max_marks: Option<f64>,

    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 5000))]
    pub description: String,

    #[validate(range(min = 1, max = 20, message = "numQuestions must be between 1 and 20"))]
    pub num_questions: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartTestRequest {
    #[validate(length(min = 1))]
    pub topic_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_id: String,
    pub answer: String,
}

/// Answers keyed by question id, or a bare list read in question order.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SubmittedAnswers {
    ByQuestion(Vec<AnsweredQuestion>),
    Positional(Vec<String>),
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    #[validate(length(min = 1))]
    pub test_id: String,

    pub answers: SubmittedAnswers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signup_request() {
        let request: SignupRequest = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","password":"secret1","role":"teacher"}"#,
        )
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.role, UserRole::Teacher);
    }

    #[test]
    fn test_signup_rejects_unknown_role() {
        let parsed = serde_json::from_str::<SignupRequest>(
            r#"{"name":"Ada","email":"ada@example.com","password":"secret1","role":"admin"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_invalid_email() {
        let request = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_assignment_request_uses_camel_case() {
        let request: CreateAssignmentRequest = serde_json::from_str(
            r#"{"title":"Essay","evaluationPrompt":"Award 10 points per definition","maxMarks":100}"#,
        )
        .unwrap();

        assert_eq!(request.max_marks, Some(100.0));
        assert!(request.description.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_assignment_rejects_non_positive_marks() {
        let request: CreateAssignmentRequest = serde_json::from_str(
            r#"{"title":"Essay","evaluationPrompt":"rubric","maxMarks":0}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_topic_question_count_bounds() {
        let too_many = CreateTopicRequest {
            title: "Rust".into(),
            description: "Ownership".into(),
            num_questions: MAX_QUESTIONS_PER_TOPIC + 1,
        };
        let none = CreateTopicRequest {
            num_questions: 0,
            ..too_many.clone()
        };

        assert!(too_many.validate().is_err());
        assert!(none.validate().is_err());
    }

    #[test]
    fn submitted_answers_accept_both_shapes() {
        let keyed: SubmitTestRequest = serde_json::from_str(
            r#"{"testId":"t-1","answers":[{"questionId":"q1","answer":"A"}]}"#,
        )
        .unwrap();
        let positional: SubmitTestRequest =
            serde_json::from_str(r#"{"testId":"t-1","answers":["A","B"]}"#).unwrap();

        assert!(matches!(keyed.answers, SubmittedAnswers::ByQuestion(ref a) if a.len() == 1));
        assert_eq!(
            positional.answers,
            SubmittedAnswers::Positional(vec!["A".into(), "B".into()])
        );
    }
}
