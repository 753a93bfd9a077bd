//! MongoDB connection management and the driver-backed [`DocumentStore`]

use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use docbridge_common::{DocBridgeError, Result};
use futures::TryStreamExt;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

use crate::{BulkWrite, ConnectionConfig, DocumentStore, Namespace, QueryOptions, WriteOp, WriteResult};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a MongoDB deployment
///
/// Cloning is cheap: every clone shares the driver's client and its pool.
#[derive(Clone)]
pub struct Connection {
    id: u64,
    client: Client,
    config: ConnectionConfig,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("app_name", &self.config.app_name)
            .field("max_pool_size", &self.config.max_pool_size)
            .finish()
    }
}

impl Connection {
    /// Connect with default settings to `uri`
    pub async fn new(uri: &str) -> Result<Self> {
        Self::connect(ConnectionConfig::new(uri)).await
    }

    /// Connect using `config`
    ///
    /// With `verify_on_connect` set the server is pinged before returning, so an
    /// unreachable server is reported here rather than on first use.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid, the URI cannot be parsed,
    /// or the verification ping fails.
    #[instrument(skip(config), fields(
        app_name = config.app_name.as_deref().unwrap_or(""),
        verify = config.verify_on_connect
    ))]
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| DocBridgeError::Config(format!("Invalid connection URI: {}", e)))?;
        config.apply_to(&mut client_options);

        let client = Client::with_options(client_options)?;
        let connection = Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            client,
            config,
        };

        if connection.config.verify_on_connect {
            connection.ping().await?;
        }

        info!(id = connection.id, "MongoDB connection established");
        Ok(connection)
    }

    /// Identity of the underlying client, shared by all clones
    ///
    /// Two handles with the same id use the same driver client and pool.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Get a database handle by name
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Get an untyped collection handle for `namespace`
    pub fn collection(&self, namespace: &Namespace) -> Collection<BsonDocument> {
        self.database(namespace.database())
            .collection(namespace.collection())
    }

    /// Check that the server answers
    pub async fn ping(&self) -> Result<()> {
        self.database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocBridgeError::Connection(format!("Ping failed: {}", e)))?;
        Ok(())
    }

    /// List all collection names in `database`
    pub async fn list_collection_names(&self, database: &str) -> Result<Vec<String>> {
        let names = self.database(database).list_collection_names().await?;
        Ok(names)
    }
}

#[async_trait]
impl DocumentStore for Connection {
    #[instrument(skip(self, filter, options), fields(namespace = %namespace))]
    async fn execute_query(
        &self,
        namespace: &Namespace,
        filter: BsonDocument,
        options: QueryOptions,
    ) -> Result<Vec<BsonDocument>> {
        let cursor = self
            .collection(namespace)
            .find(filter)
            .with_options(options.into_find_options())
            .await?;

        let docs: Vec<BsonDocument> = cursor.try_collect().await?;
        debug!(count = docs.len(), "Query returned documents");
        Ok(docs)
    }

    #[instrument(skip(self, bulk), fields(namespace = %namespace, ops = bulk.len()))]
    async fn execute_bulk_write(&self, namespace: &Namespace, bulk: BulkWrite) -> Result<WriteResult> {
        if bulk.is_empty() {
            return Err(DocBridgeError::Validation(
                "Bulk write must contain at least one operation".to_string(),
            ));
        }

        let collection = self.collection(namespace);
        let mut result = WriteResult::default();

        for (index, op) in bulk.into_ops().into_iter().enumerate() {
            let outcome = match op {
                WriteOp::Insert { document } => collection
                    .insert_one(document)
                    .await
                    .map(|r| result.record_insert(r.inserted_id)),
                WriteOp::Update {
                    filter,
                    update,
                    multi,
                    upsert,
                } => {
                    let updated = if multi {
                        collection.update_many(filter, update).upsert(upsert).await
                    } else {
                        collection.update_one(filter, update).upsert(upsert).await
                    };
                    updated.map(|r| {
                        result.record_update(index, r.matched_count, r.modified_count, r.upserted_id)
                    })
                }
                WriteOp::Delete { filter, limit } => {
                    let deleted = if limit == 1 {
                        collection.delete_one(filter).await
                    } else {
                        collection.delete_many(filter).await
                    };
                    deleted.map(|r| result.record_delete(r.deleted_count))
                }
            };

            if let Err(err) = outcome {
                result.record_driver_error(index, err)?;
                warn!(index, "Bulk write stopped at first failed operation");
                break;
            }
        }

        debug!(
            inserted = result.inserted_count,
            matched = result.matched_count,
            modified = result.modified_count,
            deleted = result.deleted_count,
            "Bulk write finished"
        );
        Ok(result)
    }

    #[instrument(skip(self, command))]
    async fn execute_command(&self, database: &str, command: BsonDocument) -> Result<BsonDocument> {
        let reply = self.database(database).run_command(command).await?;
        Ok(reply)
    }
}
