#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use classgrade_server::{
    app_state::{AppState, Collaborators, Repositories},
    config::Config,
    constants::prompts::{GRADING_PROMPT, MCQ_GENERATION_PROMPT},
    db::HealthCheck,
    errors::{AppError, AppResult, EvaluationError},
    models::domain::{
        revoked_token::hash_token, Assignment, Mcq, Submission, TestAttempt, Topic, User,
    },
    repositories::{
        AssignmentRepository, McqRepository, RevokedTokenRepository, SubmissionRepository,
        TestAttemptRepository, TopicRepository, UserRepository,
    },
    services::{
        document_storage::{DocumentStorage, StoredDocument},
        llm_client::LlmClient,
        ocr_client::OcrClient,
    },
};

fn newest_first<T: Clone>(items: impl Iterator<Item = T>, created: impl Fn(&T) -> i64) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| std::cmp::Reverse(created(item)));
    items
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRevokedTokenRepository {
    revoked: RwLock<HashMap<String, i64>>,
}

#[async_trait]
impl RevokedTokenRepository for InMemoryRevokedTokenRepository {
    async fn revoke(&self, token: &str, expires_at: i64) -> AppResult<()> {
        self.revoked
            .write()
            .await
            .entry(hash_token(token))
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        Ok(self.revoked.read().await.contains_key(&hash_token(token)))
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at > now);
        Ok((before - revoked.len()) as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAssignmentRepository {
    assignments: RwLock<HashMap<String, Assignment>>,
}

#[async_trait]
impl AssignmentRepository for InMemoryAssignmentRepository {
    async fn create(&self, assignment: Assignment) -> AppResult<Assignment> {
        self.assignments
            .write()
            .await
            .insert(assignment.id.clone(), assignment.clone());
        Ok(assignment)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Assignment>> {
        Ok(self.assignments.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Assignment>> {
        let assignments = self.assignments.read().await;
        Ok(newest_first(assignments.values().cloned(), |a| {
            a.created_at.map(|t| t.timestamp_micros()).unwrap_or(0)
        }))
    }

    async fn list_by_teacher(&self, teacher_id: &str) -> AppResult<Vec<Assignment>> {
        let assignments = self.assignments.read().await;
        Ok(newest_first(
            assignments
                .values()
                .filter(|a| a.teacher_id == teacher_id)
                .cloned(),
            |a| a.created_at.map(|t| t.timestamp_micros()).unwrap_or(0),
        ))
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    submissions: RwLock<Vec<Submission>>,
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn create(&self, submission: Submission) -> AppResult<Submission> {
        self.submissions.write().await.push(submission.clone());
        Ok(submission)
    }

    async fn list_by_assignment(&self, assignment_id: &str) -> AppResult<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(newest_first(
            submissions
                .iter()
                .filter(|s| s.assignment_id == assignment_id)
                .cloned(),
            |s| s.created_at.map(|t| t.timestamp_micros()).unwrap_or(0),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryTopicRepository {
    topics: RwLock<HashMap<String, Topic>>,
}

#[async_trait]
impl TopicRepository for InMemoryTopicRepository {
    async fn create(&self, topic: Topic) -> AppResult<Topic> {
        self.topics
            .write()
            .await
            .insert(topic.id.clone(), topic.clone());
        Ok(topic)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>> {
        Ok(self.topics.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Topic>> {
        let topics = self.topics.read().await;
        Ok(ids.iter().filter_map(|id| topics.get(id).cloned()).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Topic>> {
        let topics = self.topics.read().await;
        Ok(newest_first(topics.values().cloned(), |t| {
            t.created_at.map(|c| c.timestamp_micros()).unwrap_or(0)
        }))
    }

    async fn list_by_creator(&self, teacher_id: &str) -> AppResult<Vec<Topic>> {
        let topics = self.topics.read().await;
        Ok(newest_first(
            topics.values().filter(|t| t.created_by == teacher_id).cloned(),
            |t| t.created_at.map(|c| c.timestamp_micros()).unwrap_or(0),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryMcqRepository {
    mcqs: RwLock<HashMap<String, Mcq>>,
}

#[async_trait]
impl McqRepository for InMemoryMcqRepository {
    async fn insert_many(&self, mcqs: Vec<Mcq>) -> AppResult<Vec<Mcq>> {
        let mut stored = self.mcqs.write().await;
        for mcq in &mcqs {
            stored.insert(mcq.id.clone(), mcq.clone());
        }
        Ok(mcqs)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Mcq>> {
        let mcqs = self.mcqs.read().await;
        Ok(ids.iter().filter_map(|id| mcqs.get(id).cloned()).collect())
    }

    async fn find_by_topic_ids(&self, topic_ids: &[String]) -> AppResult<Vec<Mcq>> {
        let wanted: HashSet<&String> = topic_ids.iter().collect();
        let mcqs = self.mcqs.read().await;
        Ok(mcqs
            .values()
            .filter(|m| wanted.contains(&m.topic_id))
            .cloned()
            .collect())
    }

    async fn delete_by_topic(&self, topic_id: &str) -> AppResult<u64> {
        let mut mcqs = self.mcqs.write().await;
        let before = mcqs.len();
        mcqs.retain(|_, m| m.topic_id != topic_id);
        Ok((before - mcqs.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryTestAttemptRepository {
    attempts: RwLock<HashMap<String, TestAttempt>>,
}

impl InMemoryTestAttemptRepository {
    pub async fn count(&self) -> usize {
        self.attempts.read().await.len()
    }
}

#[async_trait]
impl TestAttemptRepository for InMemoryTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.attempts
            .write()
            .await
            .insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn complete_if_pending(&self, attempt: &TestAttempt) -> AppResult<()> {
        let mut attempts = self.attempts.write().await;
        match attempts.get(&attempt.id) {
            Some(stored) if !stored.completed => {
                attempts.insert(attempt.id.clone(), attempt.clone());
                Ok(())
            }
            _ => Err(AppError::Conflict("Test already submitted".to_string())),
        }
    }

    async fn find_completed_by_student(&self, student_id: &str) -> AppResult<Vec<TestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts
                .values()
                .filter(|a| a.completed && a.student_id == student_id)
                .cloned(),
            |a| a.completed_at.map(|t| t.timestamp_micros()).unwrap_or(0),
        ))
    }

    async fn find_all_completed(&self) -> AppResult<Vec<TestAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(newest_first(
            attempts.values().filter(|a| a.completed).cloned(),
            |a| a.completed_at.map(|t| t.timestamp_micros()).unwrap_or(0),
        ))
    }

    async fn has_completed_attempt(&self, student_id: &str, topic_id: &str) -> AppResult<bool> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .any(|a| a.completed && a.student_id == student_id && a.topic_id == topic_id))
    }
}

/// Answers each prompt kind with a fixed reply.
pub struct ScriptedLlm {
    pub grading: String,
    pub generation: String,
    pub analysis: String,
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self {
            grading: r#"{"score": 30, "summary": "Solid answer", "strengths": ["Clear definitions"], "weaknesses": ["No examples"]}"#.to_string(),
            generation: r#"Here you go:
[
  {"question": "What does `let` declare?", "options": ["A binding", "A loop", "A module", "A trait"], "answer": "A binding"},
  {"question": "Which keyword makes a binding mutable?", "options": ["mut", "var", "mutable", "ref"], "answer": "mut"},
  {"question": "What owns heap memory in a Vec?", "options": ["The Vec", "The stack", "The allocator", "Nobody"], "answer": "The Vec"}
]"#
            .to_string(),
            analysis: r#"{"summary": "Good grasp of bindings", "strengths": ["let"], "weaknesses": ["ownership"], "improvementTips": ["Reread the ownership chapter"]}"#.to_string(),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, EvaluationError> {
        if prompt.starts_with(GRADING_PROMPT) {
            Ok(self.grading.clone())
        } else if prompt.starts_with(MCQ_GENERATION_PROMPT) {
            Ok(self.generation.clone())
        } else {
            Ok(self.analysis.clone())
        }
    }
}

pub struct StubOcr {
    pub text: String,
}

#[async_trait]
impl OcrClient for StubOcr {
    async fn extract_text(&self, _url: &str) -> Result<String, EvaluationError> {
        Ok(self.text.clone())
    }
}

#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: AtomicUsize,
    pub deletes: AtomicUsize,
}

#[async_trait]
impl DocumentStorage for RecordingStorage {
    async fn upload(
        &self,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> Result<StoredDocument, EvaluationError> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(StoredDocument {
            url: format!("https://files.example.com/{}/{}", n, file_name),
            storage_id: format!("assignments/{}", n),
        })
    }

    async fn delete(&self, _storage_id: &str) -> Result<(), EvaluationError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheck for AlwaysHealthy {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Handles kept so tests can inspect what the app did.
pub struct TestContext {
    pub state: AppState,
    pub tests: Arc<InMemoryTestAttemptRepository>,
    pub storage: Arc<RecordingStorage>,
}

pub fn test_context(config: Config, llm: ScriptedLlm) -> TestContext {
    let tests = Arc::new(InMemoryTestAttemptRepository::default());
    let storage = Arc::new(RecordingStorage::default());

    let repositories = Repositories {
        users: Arc::new(InMemoryUserRepository::default()),
        revoked_tokens: Arc::new(InMemoryRevokedTokenRepository::default()),
        assignments: Arc::new(InMemoryAssignmentRepository::default()),
        submissions: Arc::new(InMemorySubmissionRepository::default()),
        topics: Arc::new(InMemoryTopicRepository::default()),
        mcqs: Arc::new(InMemoryMcqRepository::default()),
        tests: tests.clone(),
    };
    let collaborators = Collaborators {
        llm: Arc::new(llm),
        ocr: Arc::new(StubOcr {
            text: "Ownership means every value has a single owner.".to_string(),
        }),
        storage: storage.clone(),
    };

    TestContext {
        state: AppState::from_parts(config, repositories, collaborators, Arc::new(AlwaysHealthy)),
        tests,
        storage,
    }
}
