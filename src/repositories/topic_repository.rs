use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, MCQS_COLLECTION, TOPICS_COLLECTION},
    errors::AppResult,
    models::domain::{Mcq, Topic},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicRepository: Send + Sync {
    async fn create(&self, topic: Topic) -> AppResult<Topic>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Topic>>;
    async fn list_all(&self) -> AppResult<Vec<Topic>>;
    async fn list_by_creator(&self, teacher_id: &str) -> AppResult<Vec<Topic>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McqRepository: Send + Sync {
    async fn insert_many(&self, mcqs: Vec<Mcq>) -> AppResult<Vec<Mcq>>;
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Mcq>>;
    async fn find_by_topic_ids(&self, topic_ids: &[String]) -> AppResult<Vec<Mcq>>;
    async fn delete_by_topic(&self, topic_id: &str) -> AppResult<u64>;
}

pub struct MongoTopicRepository {
    collection: Collection<Topic>,
}

impl MongoTopicRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(TOPICS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for topics collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for MongoTopicRepository {
    async fn create(&self, topic: Topic) -> AppResult<Topic> {
        self.collection.insert_one(&topic).await?;
        Ok(topic)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Topic>> {
        let topic = self.collection.find_one(doc! { "id": id }).await?;
        Ok(topic)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Topic>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let topics = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(topics)
    }

    async fn list_all(&self) -> AppResult<Vec<Topic>> {
        let topics = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(topics)
    }

    async fn list_by_creator(&self, teacher_id: &str) -> AppResult<Vec<Topic>> {
        let topics = self
            .collection
            .find(doc! { "created_by": teacher_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(topics)
    }
}

pub struct MongoMcqRepository {
    collection: Collection<Mcq>,
}

impl MongoMcqRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(MCQS_COLLECTION);
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for mcqs collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let topic_index = IndexModel::builder()
            .keys(doc! { "topic_id": 1 })
            .options(IndexOptions::builder().name("topic_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(topic_index).await?;
        Ok(())
    }
}

#[async_trait]
impl McqRepository for MongoMcqRepository {
    async fn insert_many(&self, mcqs: Vec<Mcq>) -> AppResult<Vec<Mcq>> {
        // insert_many rejects an empty batch
        if mcqs.is_empty() {
            return Ok(mcqs);
        }
        self.collection.insert_many(&mcqs).await?;
        Ok(mcqs)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Mcq>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mcqs = self
            .collection
            .find(doc! { "id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(mcqs)
    }

    async fn find_by_topic_ids(&self, topic_ids: &[String]) -> AppResult<Vec<Mcq>> {
        if topic_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mcqs = self
            .collection
            .find(doc! { "topic_id": { "$in": topic_ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(mcqs)
    }

    async fn delete_by_topic(&self, topic_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "topic_id": topic_id })
            .await?;
        Ok(result.deleted_count)
    }
}
