//! Document models
//!
//! [`DocumentModel`] turns find/insert/update/delete requests into calls on a
//! [`DocumentStore`], addressed to `database.collection`. The database comes
//! from the model's [`ModelConfig`] and is resolved on every call; the
//! collection is passed with each call.
//!
//! # Example
//!
//! ```rust,ignore
//! use bson::doc;
//! use docbridge_mongodb::{DocumentModel, ModelConfig, ModelSchema};
//!
//! struct User;
//!
//! impl ModelSchema for User {
//!     const DATABASE: &'static str = "crm";
//!     const COLLECTION: &'static str = "user";
//! }
//!
//! let users = DocumentModel::new(connection, ModelConfig::for_schema::<User>());
//! users.insert(User::COLLECTION, doc! { "name": "John", "age": 30 }).await?;
//! let adults = users.find(User::COLLECTION, doc! { "age": { "$gte": 18 } }, Default::default()).await?;
//! ```

use bson::{doc, oid::ObjectId, Bson, Document as BsonDocument};
use docbridge_common::Result;
use tracing::{debug, instrument};

use crate::{
    BulkWrite, Connection, ConnectionRegistry, DocumentStore, Namespace, QueryOptions, WriteResult,
};

/// Database used when a model does not name one
pub const DEFAULT_DATABASE: &str = "test";

/// Static naming for a concrete model
pub trait ModelSchema {
    /// Database override; empty means [`DEFAULT_DATABASE`]
    const DATABASE: &'static str = "";

    /// Collection the model's documents live in
    const COLLECTION: &'static str;
}

/// Per-model configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelConfig {
    /// Database override; `None` or empty means [`DEFAULT_DATABASE`]
    pub database: Option<String>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
        }
    }

    /// Configuration declared by a [`ModelSchema`]
    pub fn for_schema<M: ModelSchema>() -> Self {
        Self {
            database: Some(M::DATABASE.to_string()),
        }
    }

    /// The override when present and non-empty, otherwise [`DEFAULT_DATABASE`]
    pub fn resolved_database(&self) -> &str {
        match self.database.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_DATABASE,
        }
    }
}

/// CRUD access to the collections of one database
pub struct DocumentModel<S = Connection> {
    store: S,
    config: ModelConfig,
}

impl DocumentModel<Connection> {
    /// Model bound to the process-wide shared connection
    pub async fn shared(config: ModelConfig) -> Result<Self> {
        let connection = ConnectionRegistry::get_instance().await?;
        Ok(Self::new(connection, config))
    }
}

impl<S: DocumentStore> DocumentModel<S> {
    pub fn new(store: S, config: ModelConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Change the database override; takes effect on the next call
    pub fn set_database(&mut self, database: Option<String>) {
        self.config.database = database;
    }

    /// Database the next call will address
    pub fn database(&self) -> &str {
        self.config.resolved_database()
    }

    /// Qualified name for `collection` in the current database
    pub fn namespace(&self, collection: &str) -> Result<Namespace> {
        Namespace::new(self.database(), collection)
    }

    /// Every document in `collection` matching `filter`, in server order
    ///
    /// An empty vector means nothing matched.
    #[instrument(skip(self, filter, options), fields(database = self.database()))]
    pub async fn find(
        &self,
        collection: &str,
        filter: BsonDocument,
        options: QueryOptions,
    ) -> Result<Vec<BsonDocument>> {
        let namespace = self.namespace(collection)?;
        self.store.execute_query(&namespace, filter, options).await
    }

    /// The first document matching `filter`, if any
    pub async fn find_one(
        &self,
        collection: &str,
        filter: BsonDocument,
        options: QueryOptions,
    ) -> Result<Option<BsonDocument>> {
        let docs = self.find(collection, filter, options.single()).await?;
        Ok(docs.into_iter().next())
    }

    /// The document whose `_id` equals `id`, if any
    pub async fn find_by_id(&self, collection: &str, id: impl Into<Bson>) -> Result<Option<BsonDocument>> {
        self.find_one(collection, doc! { "_id": id.into() }, QueryOptions::default())
            .await
    }

    /// Insert one document
    ///
    /// A document without `_id` is given a fresh ObjectId; it is reported in
    /// the result's `inserted_ids`.
    #[instrument(skip(self, document), fields(database = self.database()))]
    pub async fn insert(&self, collection: &str, document: BsonDocument) -> Result<WriteResult> {
        let mut bulk = BulkWrite::new();
        bulk.insert(document);
        self.execute(collection, bulk).await
    }

    /// Set `new_fields` on the first document matching `filter`
    ///
    /// At most one document changes and none is ever created.
    #[instrument(skip(self, filter, new_fields), fields(database = self.database()))]
    pub async fn update(
        &self,
        collection: &str,
        filter: BsonDocument,
        new_fields: BsonDocument,
    ) -> Result<WriteResult> {
        let mut bulk = BulkWrite::new();
        bulk.update(filter, doc! { "$set": new_fields }, false, false);
        self.execute(collection, bulk).await
    }

    /// Delete every document matching `filter`
    #[instrument(skip(self, filter), fields(database = self.database()))]
    pub async fn delete(&self, collection: &str, filter: BsonDocument) -> Result<WriteResult> {
        let mut bulk = BulkWrite::new();
        bulk.delete(filter, 0);
        self.execute(collection, bulk).await
    }

    /// Run a caller-built batch; write errors become an `Err`
    pub async fn execute(&self, collection: &str, bulk: BulkWrite) -> Result<WriteResult> {
        let namespace = self.namespace(collection)?;
        let result = self.store.execute_bulk_write(&namespace, bulk).await?;
        debug!(
            namespace = %namespace,
            inserted = result.inserted_count,
            matched = result.matched_count,
            modified = result.modified_count,
            deleted = result.deleted_count,
            "Bulk write finished"
        );
        result.into_result()
    }

    /// Run a command against the current database
    pub async fn run_command(&self, command: BsonDocument) -> Result<BsonDocument> {
        self.store.execute_command(self.database(), command).await
    }

    /// A new identifier for callers that assign `_id` before inserting
    pub fn generate_id(&self) -> ObjectId {
        ObjectId::new()
    }
}
