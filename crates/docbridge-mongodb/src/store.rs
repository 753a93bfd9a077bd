//! The three primitives every model operation is built on

use async_trait::async_trait;
use bson::Document as BsonDocument;
use docbridge_common::Result;
use std::sync::Arc;

use crate::{BulkWrite, Namespace, QueryOptions, WriteResult};

/// Backend executing queries, bulk writes and commands
///
/// [`Connection`](crate::Connection) is the MongoDB implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a find and collect every matching document, in server order
    async fn execute_query(
        &self,
        namespace: &Namespace,
        filter: BsonDocument,
        options: QueryOptions,
    ) -> Result<Vec<BsonDocument>>;

    /// Run an ordered bulk write against one namespace
    ///
    /// Per-operation failures are reported in the returned [`WriteResult`].
    async fn execute_bulk_write(&self, namespace: &Namespace, bulk: BulkWrite) -> Result<WriteResult>;

    /// Run a database command and return the server's reply
    async fn execute_command(&self, database: &str, command: BsonDocument) -> Result<BsonDocument>;
}

#[async_trait]
impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    async fn execute_query(
        &self,
        namespace: &Namespace,
        filter: BsonDocument,
        options: QueryOptions,
    ) -> Result<Vec<BsonDocument>> {
        (**self).execute_query(namespace, filter, options).await
    }

    async fn execute_bulk_write(&self, namespace: &Namespace, bulk: BulkWrite) -> Result<WriteResult> {
        (**self).execute_bulk_write(namespace, bulk).await
    }

    async fn execute_command(&self, database: &str, command: BsonDocument) -> Result<BsonDocument> {
        (**self).execute_command(database, command).await
    }
}
