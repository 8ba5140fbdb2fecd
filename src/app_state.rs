use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::{Database, HealthCheck},
    errors::AppResult,
    repositories::{
        AssignmentRepository, McqRepository, MongoAssignmentRepository, MongoMcqRepository,
        MongoRevokedTokenRepository, MongoSubmissionRepository, MongoTestAttemptRepository,
        MongoTopicRepository, MongoUserRepository, RevokedTokenRepository, SubmissionRepository,
        TestAttemptRepository, TopicRepository, UserRepository,
    },
    services::{
        assignment_service::AssignmentService,
        auth_service::AuthService,
        document_storage::{CloudinaryStorage, DocumentStorage},
        evaluation_service::EvaluationService,
        llm_client::{LlmClient, OpenAiCompatibleLlm},
        ocr_client::{MistralOcrClient, OcrClient},
        submission_pipeline::SubmissionPipeline,
        test_service::TestService,
        topic_service::TopicService,
    },
};

/// Storage seams the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub revoked_tokens: Arc<dyn RevokedTokenRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub topics: Arc<dyn TopicRepository>,
    pub mcqs: Arc<dyn McqRepository>,
    pub tests: Arc<dyn TestAttemptRepository>,
}

/// Outbound services: model, OCR and document storage.
#[derive(Clone)]
pub struct Collaborators {
    pub llm: Arc<dyn LlmClient>,
    pub ocr: Arc<dyn OcrClient>,
    pub storage: Arc<dyn DocumentStorage>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub assignment_service: Arc<AssignmentService>,
    pub submission_pipeline: Arc<SubmissionPipeline>,
    pub topic_service: Arc<TopicService>,
    pub test_service: Arc<TestService>,
    pub health: Arc<dyn HealthCheck>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;
        let revoked_tokens = Arc::new(MongoRevokedTokenRepository::new(&db));
        revoked_tokens.ensure_indexes().await?;
        let purged = revoked_tokens.delete_expired().await?;
        if purged > 0 {
            log::info!("Purged {} expired revoked tokens", purged);
        }

        let assignments = Arc::new(MongoAssignmentRepository::new(&db));
        assignments.ensure_indexes().await?;
        let submissions = Arc::new(MongoSubmissionRepository::new(&db));
        submissions.ensure_indexes().await?;
        let topics = Arc::new(MongoTopicRepository::new(&db));
        topics.ensure_indexes().await?;
        let mcqs = Arc::new(MongoMcqRepository::new(&db));
        mcqs.ensure_indexes().await?;
        let tests = Arc::new(MongoTestAttemptRepository::new(&db));
        tests.ensure_indexes().await?;

        let repositories = Repositories {
            users,
            revoked_tokens,
            assignments,
            submissions,
            topics,
            mcqs,
            tests,
        };

        let collaborators = Collaborators {
            llm: Arc::new(OpenAiCompatibleLlm::new(&config.llm, &config.outbound)),
            ocr: Arc::new(MistralOcrClient::new(&config.ocr, &config.outbound)?),
            storage: Arc::new(CloudinaryStorage::new(&config.storage, &config.outbound)?),
        };

        Ok(Self::from_parts(
            config,
            repositories,
            collaborators,
            Arc::new(db),
        ))
    }

    /// Wires the services over already-built repositories and collaborators.
    pub fn from_parts(
        config: Config,
        repositories: Repositories,
        collaborators: Collaborators,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);
        let evaluation = Arc::new(EvaluationService::new(collaborators.llm));

        let auth_service = Arc::new(AuthService::new(
            repositories.users.clone(),
            repositories.revoked_tokens,
            jwt,
        ));
        let assignment_service = Arc::new(AssignmentService::new(
            repositories.assignments.clone(),
            repositories.submissions.clone(),
            repositories.users.clone(),
        ));
        let submission_pipeline = Arc::new(SubmissionPipeline::new(
            repositories.assignments,
            repositories.submissions,
            collaborators.storage,
            collaborators.ocr,
            evaluation.clone(),
            config.max_upload_bytes,
        ));
        let topic_service = Arc::new(TopicService::new(
            repositories.topics.clone(),
            repositories.mcqs,
            evaluation.clone(),
        ));
        let test_service = Arc::new(TestService::new(
            repositories.tests,
            repositories.topics,
            repositories.users,
            topic_service.clone(),
            evaluation,
            config.allow_test_retakes,
        ));

        Self {
            auth_service,
            assignment_service,
            submission_pipeline,
            topic_service,
            test_service,
            health,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
