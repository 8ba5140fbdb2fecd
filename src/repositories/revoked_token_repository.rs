use async_trait::async_trait;
use chrono::Utc;
use log::info;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, REVOKED_TOKENS_COLLECTION},
    errors::AppResult,
    models::domain::{revoked_token::hash_token, RevokedToken},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    async fn revoke(&self, token: &str, expires_at: i64) -> AppResult<()>;
    async fn is_revoked(&self, token: &str) -> AppResult<bool>;
    async fn delete_expired(&self) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoRevokedTokenRepository {
    collection: Collection<RevokedToken>,
}

impl MongoRevokedTokenRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(REVOKED_TOKENS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl RevokedTokenRepository for MongoRevokedTokenRepository {
    async fn revoke(&self, token: &str, expires_at: i64) -> AppResult<()> {
        let revoked = RevokedToken::new(token, expires_at);
        // logging out twice with the same token is not an error
        self.collection
            .update_one(
                doc! { "token_hash": revoked.token_hash.as_str() },
                doc! { "$setOnInsert": {
                    "token_hash": revoked.token_hash.as_str(),
                    "expires_at": revoked.expires_at,
                } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let found = self
            .collection
            .find_one(doc! { "token_hash": hash_token(token) })
            .await?;
        Ok(found.is_some())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = Utc::now().timestamp();
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lte": now } })
            .await?;

        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let token_hash_options = IndexOptions::builder().unique(true).build();
        let token_hash_model = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(token_hash_options)
            .build();
        self.collection.create_index(token_hash_model).await?;
        info!("Created unique index on revoked_tokens.token_hash");

        let expires_at_model = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .build();
        self.collection.create_index(expires_at_model).await?;
        info!("Created index on revoked_tokens.expires_at");

        Ok(())
    }
}
