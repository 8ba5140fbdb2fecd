use std::{collections::HashMap, sync::Arc};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Mcq, Topic},
        dto::{
            request::CreateTopicRequest,
            response::{CreateTopicResponse, McqView, TopicView},
        },
    },
    repositories::{McqRepository, TopicRepository},
    services::evaluation_service::EvaluationService,
};

pub const NO_QUESTIONS_MESSAGE: &str = "Topic created but no questions were generated";

pub struct TopicService {
    topics: Arc<dyn TopicRepository>,
    mcqs: Arc<dyn McqRepository>,
    evaluation: Arc<EvaluationService>,
}

impl TopicService {
    pub fn new(
        topics: Arc<dyn TopicRepository>,
        mcqs: Arc<dyn McqRepository>,
        evaluation: Arc<EvaluationService>,
    ) -> Self {
        Self {
            topics,
            mcqs,
            evaluation,
        }
    }

    /// Generates the questions first, so a failed model call leaves no
    /// half-built topic behind. If the topic itself cannot be stored, the
    /// questions already inserted for it are removed again. An empty
    /// generation still creates the topic.
    pub async fn create(
        &self,
        teacher_id: &str,
        request: CreateTopicRequest,
    ) -> AppResult<CreateTopicResponse> {
        request.validate()?;

        let generated = self
            .evaluation
            .generate_mcqs(&request.title, &request.description, request.num_questions)
            .await?;

        let mut topic = Topic::new(
            request.title.trim(),
            &request.description,
            teacher_id,
            request.num_questions,
        );
        let mcqs: Vec<Mcq> = generated
            .into_iter()
            .map(|g| Mcq::new(&topic.id, g.question, g.options, g.answer))
            .collect();
        topic.mcq_ids = mcqs.iter().map(|m| m.id.clone()).collect();

        let mcqs = self.mcqs.insert_many(mcqs).await?;
        let topic_id = topic.id.clone();
        let topic = match self.topics.create(topic).await {
            Ok(topic) => topic,
            Err(e) => {
                self.discard_questions(&topic_id).await;
                return Err(e);
            }
        };

        let questions_generated = mcqs.len();
        let message = if questions_generated == 0 {
            log::warn!("No questions generated for topic {}", topic.id);
            NO_QUESTIONS_MESSAGE.to_string()
        } else {
            format!("Topic created with {} questions", questions_generated)
        };
        log::info!(
            "Teacher {} created topic {} with {}/{} questions",
            teacher_id,
            topic.id,
            questions_generated,
            topic.num_questions
        );

        let views: Vec<McqView> = mcqs.into_iter().map(|m| McqView::new(m, true)).collect();
        Ok(CreateTopicResponse {
            topic: TopicView::new(topic, views.clone()),
            mcqs: views,
            questions_generated,
            message,
        })
    }

    async fn discard_questions(&self, topic_id: &str) {
        match self.mcqs.delete_by_topic(topic_id).await {
            Ok(removed) => log::warn!(
                "Removed {} questions of unsaved topic {}",
                removed,
                topic_id
            ),
            Err(e) => log::error!(
                "Failed to remove questions of unsaved topic {}: {}",
                topic_id,
                e
            ),
        }
    }

    /// Every topic with its questions. Answer keys are only included for
    /// callers allowed to see them.
    pub async fn list(&self, reveal_answers: bool) -> AppResult<Vec<TopicView>> {
        let topics = self.topics.list_all().await?;
        self.with_questions(topics, reveal_answers).await
    }

    pub async fn list_for_teacher(&self, teacher_id: &str) -> AppResult<Vec<TopicView>> {
        let topics = self.topics.list_by_creator(teacher_id).await?;
        self.with_questions(topics, true).await
    }

    pub async fn find(&self, topic_id: &str) -> AppResult<Topic> {
        self.topics
            .find_by_id(topic_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Topic not found".to_string()))
    }

    /// The topic's questions in the order the topic lists them.
    pub async fn questions_of(&self, topic: &Topic) -> AppResult<Vec<Mcq>> {
        let found = self.mcqs.find_by_ids(&topic.mcq_ids).await?;
        let mut by_id: HashMap<String, Mcq> =
            found.into_iter().map(|m| (m.id.clone(), m)).collect();

        Ok(topic
            .mcq_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    async fn with_questions(
        &self,
        topics: Vec<Topic>,
        reveal_answers: bool,
    ) -> AppResult<Vec<TopicView>> {
        let topic_ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
        let mut by_id: HashMap<String, Mcq> = self
            .mcqs
            .find_by_topic_ids(&topic_ids)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        Ok(topics
            .into_iter()
            .map(|topic| {
                let mcqs = topic
                    .mcq_ids
                    .iter()
                    .filter_map(|id| by_id.remove(id))
                    .map(|m| McqView::new(m, reveal_answers))
                    .collect();
                TopicView::new(topic, mcqs)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::EvaluationError,
        repositories::topic_repository::{MockMcqRepository, MockTopicRepository},
        services::llm_client::MockLlmClient,
    };

    fn request(num_questions: u32) -> CreateTopicRequest {
        CreateTopicRequest {
            title: "Rust".into(),
            description: "Ownership and borrowing".into(),
            num_questions,
        }
    }

    fn service(
        topics: MockTopicRepository,
        mcqs: MockMcqRepository,
        llm: MockLlmClient,
    ) -> TopicService {
        TopicService::new(
            Arc::new(topics),
            Arc::new(mcqs),
            Arc::new(EvaluationService::new(Arc::new(llm))),
        )
    }

    #[actix_web::test]
    async fn test_empty_generation_still_creates_topic() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete()
            .returning(|_| Ok("I could not think of any questions.".to_string()));
        let mut mcqs = MockMcqRepository::new();
        mcqs.expect_insert_many().returning(|m| Ok(m));
        let mut topics = MockTopicRepository::new();
        topics.expect_create().times(1).returning(|t| Ok(t));

        let response = service(topics, mcqs, llm).create("t-1", request(5)).await.unwrap();

        assert!(response.mcqs.is_empty());
        assert_eq!(response.questions_generated, 0);
        assert_eq!(response.message, NO_QUESTIONS_MESSAGE);
        assert_eq!(response.topic.num_questions, 5);
    }

    #[actix_web::test]
    async fn test_generated_questions_are_linked_in_order() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete().returning(|_| {
            Ok(r#"[
                {"question": "Q1", "options": ["a", "b", "c", "d"], "answer": "a"},
                {"question": "Q2", "options": ["a", "b", "c", "d"], "answer": "d"}
            ]"#
            .to_string())
        });
        let mut mcqs = MockMcqRepository::new();
        mcqs.expect_insert_many().returning(|m| Ok(m));
        let mut topics = MockTopicRepository::new();
        topics
            .expect_create()
            .withf(|t| t.mcq_ids.len() == 2)
            .returning(|t| Ok(t));

        let response = service(topics, mcqs, llm).create("t-1", request(2)).await.unwrap();

        assert_eq!(response.questions_generated, 2);
        assert_eq!(response.mcqs[0].question, "Q1");
        assert_eq!(response.mcqs[1].answer.as_deref(), Some("d"));
        assert_eq!(response.topic.mcqs.len(), 2);
    }

    #[actix_web::test]
    async fn test_model_outage_creates_nothing() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete()
            .returning(|_| Err(EvaluationError::Transport("refused".into())));
        let mut topics = MockTopicRepository::new();
        topics.expect_create().never();

        let result = service(topics, MockMcqRepository::new(), llm)
            .create("t-1", request(3))
            .await;

        assert!(matches!(result, Err(AppError::UpstreamError(_))));
    }

    #[actix_web::test]
    async fn test_failed_topic_write_removes_questions() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete().returning(|_| {
            Ok(r#"[{"question": "Q1", "options": ["a", "b", "c", "d"], "answer": "a"}]"#
                .to_string())
        });
        let mut mcqs = MockMcqRepository::new();
        mcqs.expect_insert_many().times(1).returning(|m| Ok(m));
        mcqs.expect_delete_by_topic().times(1).returning(|_| Ok(1));
        let mut topics = MockTopicRepository::new();
        topics
            .expect_create()
            .returning(|_| Err(AppError::DatabaseError("write failed".into())));

        let result = service(topics, mcqs, llm).create("t-1", request(1)).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[actix_web::test]
    async fn test_public_listing_hides_answers() {
        let mut topic = Topic::new("Rust", "desc", "t-1", 1);
        let mcq = Mcq::new(&topic.id, "Q".into(), vec!["a".into()], "a".into());
        topic.mcq_ids = vec![mcq.id.clone()];

        let mut topics = MockTopicRepository::new();
        topics
            .expect_list_all()
            .returning(move || Ok(vec![topic.clone()]));
        let mut mcqs = MockMcqRepository::new();
        mcqs.expect_find_by_topic_ids()
            .returning(move |_| Ok(vec![mcq.clone()]));

        let views = service(topics, mcqs, MockLlmClient::new())
            .list(false)
            .await
            .unwrap();

        assert_eq!(views[0].mcqs.len(), 1);
        assert!(views[0].mcqs[0].answer.is_none());
    }
}
