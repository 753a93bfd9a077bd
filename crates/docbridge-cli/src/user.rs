//! Sample user model
//!
//! Stores users in `test.user` with a name, an age and a list of phones.

use anyhow::{Context, Result};
use docbridge_mongodb::bson::{doc, Bson, Document as BsonDocument};
use docbridge_mongodb::{
    DocBridgeError, DocumentModel, DocumentStore, ModelConfig, ModelSchema, QueryOptions,
    WriteResult,
};
use tracing::info;

pub struct User;

impl ModelSchema for User {
    const DATABASE: &'static str = "test";
    const COLLECTION: &'static str = "user";
}

pub struct UserModel<S> {
    model: DocumentModel<S>,
}

impl<S: DocumentStore> UserModel<S> {
    /// `database` replaces the schema's database when given
    pub fn new(store: S, database: Option<String>) -> Self {
        let config = match database {
            Some(name) => ModelConfig::with_database(name),
            None => ModelConfig::for_schema::<User>(),
        };
        Self {
            model: DocumentModel::new(store, config),
        }
    }

    pub fn database(&self) -> &str {
        self.model.database()
    }

    /// Insert John, 30, with a mobile and a home phone
    pub async fn insert_user(&self) -> Result<WriteResult> {
        let user = doc! {
            "name": "John",
            "age": 30,
            "phones": [
                { "area": 11, "number": 983055557, "type": "mobile" },
                { "area": 11, "number": 50722540, "type": "home" },
            ],
        };
        let result = self.model.insert(User::COLLECTION, user).await?;
        info!(ids = ?result.inserted_ids, "Inserted user");
        Ok(result)
    }

    /// Replace the second phone of the first user aged 30
    pub async fn update_user(&self) -> Result<WriteResult> {
        let mut user = self
            .model
            .find_one(User::COLLECTION, doc! { "age": 30 }, QueryOptions::default())
            .await?
            .ok_or_else(|| DocBridgeError::NotFound("no user with age 30".to_string()))?;

        let id = user
            .remove("_id")
            .context("stored user has no _id")?;

        let mut phones = match user.remove("phones") {
            Some(Bson::Array(phones)) => phones,
            _ => Vec::new(),
        };
        let home = Bson::Document(doc! { "area": 11, "number": 12345678, "type": "home" });
        if phones.len() > 1 {
            phones[1] = home;
        } else {
            phones.push(home);
        }
        user.insert("phones", phones);

        let result = self
            .model
            .update(User::COLLECTION, doc! { "_id": id }, user)
            .await?;
        info!(modified = result.modified_count, "Updated user");
        Ok(result)
    }

    pub async fn get_all_users(&self) -> Result<Vec<BsonDocument>> {
        let users = self
            .model
            .find(User::COLLECTION, doc! {}, QueryOptions::default())
            .await?;
        Ok(users)
    }

    /// Delete every user one `_id` at a time; returns how many were removed
    pub async fn remove_all(&self) -> Result<u64> {
        let mut removed = 0;
        for user in self.get_all_users().await? {
            let Some(id) = user.get("_id").cloned() else {
                continue;
            };
            removed += self
                .model
                .delete(User::COLLECTION, doc! { "_id": id })
                .await?
                .deleted_count;
        }
        info!(removed, "Removed users");
        Ok(removed)
    }
}
