use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, TESTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::TestAttempt,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestAttemptRepository: Send + Sync {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>>;
    /// Persists a completed attempt only if the stored copy is still in
    /// progress. Returns `Conflict` when another submission got there first.
    async fn complete_if_pending(&self, attempt: &TestAttempt) -> AppResult<()>;
    async fn find_completed_by_student(&self, student_id: &str) -> AppResult<Vec<TestAttempt>>;
    async fn find_all_completed(&self) -> AppResult<Vec<TestAttempt>>;
    async fn has_completed_attempt(&self, student_id: &str, topic_id: &str) -> AppResult<bool>;
}

pub struct MongoTestAttemptRepository {
    collection: Collection<TestAttempt>,
}

impl MongoTestAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(TESTS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for tests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let student_topic_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "topic_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_topic".to_string())
                    .build(),
            )
            .build();

        let completed_index = IndexModel::builder()
            .keys(doc! { "completed": 1, "completed_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("completed_recent".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(student_topic_index).await?;
        self.collection.create_index(completed_index).await?;

        log::info!("Successfully created indexes for tests collection");
        Ok(())
    }
}

#[async_trait]
impl TestAttemptRepository for MongoTestAttemptRepository {
    async fn create(&self, attempt: TestAttempt) -> AppResult<TestAttempt> {
        self.collection.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<TestAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn complete_if_pending(&self, attempt: &TestAttempt) -> AppResult<()> {
        let result = self
            .collection
            .replace_one(doc! { "id": attempt.id.as_str(), "completed": false }, attempt)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::Conflict("Test already submitted".to_string()));
        }

        Ok(())
    }

    async fn find_completed_by_student(&self, student_id: &str) -> AppResult<Vec<TestAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "student_id": student_id, "completed": true })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn find_all_completed(&self) -> AppResult<Vec<TestAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "completed": true })
            .sort(doc! { "completed_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn has_completed_attempt(&self, student_id: &str, topic_id: &str) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(doc! {
                "student_id": student_id,
                "topic_id": topic_id,
                "completed": true,
            })
            .await?;
        Ok(count > 0)
    }
}
