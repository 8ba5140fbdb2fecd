#[cfg(test)]
pub mod fixtures {
    use crate::{
        auth::Claims,
        models::domain::{QuestionSnapshot, UserRole},
    };

    /// Claims for a caller that never expires within a test run.
    pub fn claims(id: &str, role: UserRole) -> Claims {
        Claims {
            sub: id.to_string(),
            name: id.to_string(),
            email: format!("{}@example.com", id),
            role,
            iat: 0,
            exp: 9999999999,
        }
    }

    /// One frozen question per answer key, ids `q1..qN`.
    pub fn snapshots(answers: &[&str]) -> Vec<QuestionSnapshot> {
        answers
            .iter()
            .enumerate()
            .map(|(i, answer)| QuestionSnapshot {
                mcq_id: format!("q{}", i + 1),
                question: format!("Question {}", i + 1),
                options: vec![answer.to_string(), "X".into(), "Y".into(), "Z".into()],
                answer: answer.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::UserRole;

    #[test]
    fn test_fixtures_claims() {
        let teacher = claims("t-1", UserRole::Teacher);
        assert!(teacher.is_teacher());
        assert_eq!(teacher.email, "t-1@example.com");
    }

    #[test]
    fn test_fixtures_snapshots() {
        let questions = snapshots(&["A", "B"]);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].mcq_id, "q2");
        assert!(questions[1].options.contains(&"B".to_string()));
    }
}
