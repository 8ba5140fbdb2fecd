use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_by: String,
    /// Number of questions the teacher asked for, not the number generated.
    pub num_questions: u32,
    pub mcq_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Topic {
    pub fn new(title: &str, description: &str, created_by: &str, num_questions: u32) -> Self {
        Topic {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            created_by: created_by.to_string(),
            num_questions,
            mcq_ids: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Mcq {
    pub id: String,
    pub topic_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Mcq {
    pub fn new(topic_id: &str, question: String, options: Vec<String>, answer: String) -> Self {
        Mcq {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.to_string(),
            question,
            options,
            answer,
            created_at: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_topic_starts_without_questions() {
        let topic = Topic::new("Ownership", "Borrowing rules", "t-1", 5);

        assert!(topic.mcq_ids.is_empty());
        assert_eq!(topic.num_questions, 5);
    }

    #[test]
    fn mcq_keeps_parent_reference() {
        let mcq = Mcq::new(
            "topic-1",
            "What is 2 + 2?".to_string(),
            vec!["3".into(), "4".into(), "5".into(), "6".into()],
            "4".to_string(),
        );

        assert_eq!(mcq.topic_id, "topic-1");
        assert!(mcq.options.contains(&mcq.answer));
    }
}
