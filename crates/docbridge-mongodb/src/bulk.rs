//! Ordered bulk writes
//!
//! A [`BulkWrite`] collects insert, update and delete operations for a single
//! namespace. [`Connection`](crate::Connection) hands each operation to the
//! driver's collection API in order, so the client's write concern and
//! retryable-write settings apply, and folds the outcomes into one
//! [`WriteResult`]. Execution stops at the first failed operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use bson::doc;
//! use docbridge_mongodb::BulkWrite;
//!
//! let mut bulk = BulkWrite::new();
//! bulk.insert(doc! { "name": "John", "age": 30 });
//! bulk.update(doc! { "name": "John" }, doc! { "$set": { "age": 31 } }, false, false);
//! bulk.delete(doc! { "age": { "$lt": 18 } }, 0);
//!
//! let result = model.execute("user", bulk).await?;
//! ```

use bson::{oid::ObjectId, Bson, Document as BsonDocument};
use docbridge_common::{DocBridgeError, Result};
use mongodb::error::{ErrorKind, WriteFailure as DriverWriteFailure};

/// A single queued write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert {
        document: BsonDocument,
    },
    Update {
        filter: BsonDocument,
        update: BsonDocument,
        multi: bool,
        upsert: bool,
    },
    Delete {
        filter: BsonDocument,
        /// 0 removes every match, 1 removes the first
        limit: i32,
    },
}

/// Accumulator of write operations executed as one ordered batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkWrite {
    ops: Vec<WriteOp>,
}

impl BulkWrite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert and return the document's `_id`
    ///
    /// Documents without an `_id` get a fresh ObjectId as their first field.
    pub fn insert(&mut self, document: BsonDocument) -> Bson {
        let document = ensure_id(document);
        let id = document.get("_id").cloned().unwrap_or(Bson::Null);
        self.ops.push(WriteOp::Insert { document });
        id
    }

    /// Queue an update
    pub fn update(&mut self, filter: BsonDocument, update: BsonDocument, multi: bool, upsert: bool) {
        self.ops.push(WriteOp::Update {
            filter,
            update,
            multi,
            upsert,
        });
    }

    /// Queue a delete; `limit` 0 removes every match, 1 only the first
    pub fn delete(&mut self, filter: BsonDocument, limit: i32) {
        self.ops.push(WriteOp::Delete {
            filter,
            limit: if limit == 0 { 0 } else { 1 },
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Give `document` an `_id` if it lacks one, keeping `_id` first
fn ensure_id(document: BsonDocument) -> BsonDocument {
    if document.contains_key("_id") {
        return document;
    }
    let mut with_id = BsonDocument::new();
    with_id.insert("_id", ObjectId::new());
    for (key, value) in document {
        with_id.insert(key, value);
    }
    with_id
}

/// A per-operation failure reported by the server
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    /// Position of the failed operation within the bulk
    pub index: usize,
    pub code: i32,
    pub message: String,
}

/// A write concern failure reported by the server
#[derive(Debug, Clone, PartialEq)]
pub struct WriteConcernFailure {
    /// Position of the operation whose write concern failed
    pub index: usize,
    pub code: i32,
    pub message: String,
}

/// Outcome of a bulk write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
    pub upserted_count: u64,
    pub inserted_ids: Vec<Bson>,
    /// `(bulk index, _id)` of each upserted document
    pub upserted_ids: Vec<(usize, Bson)>,
    pub write_errors: Vec<WriteFailure>,
    pub write_concern_error: Option<WriteConcernFailure>,
}

impl WriteResult {
    pub fn record_insert(&mut self, id: Bson) {
        self.inserted_count += 1;
        self.inserted_ids.push(id);
    }

    pub fn record_update(&mut self, index: usize, matched: u64, modified: u64, upserted_id: Option<Bson>) {
        self.matched_count += matched;
        self.modified_count += modified;
        if let Some(id) = upserted_id {
            self.upserted_count += 1;
            self.upserted_ids.push((index, id));
        }
    }

    pub fn record_delete(&mut self, deleted: u64) {
        self.deleted_count += deleted;
    }

    /// Keep a server-side write failure of operation `index`
    ///
    /// Failures that are not about the written data (network, selection,
    /// authentication) come back as an `Err` instead.
    pub fn record_driver_error(&mut self, index: usize, err: mongodb::error::Error) -> Result<()> {
        match err.kind.as_ref() {
            ErrorKind::Write(DriverWriteFailure::WriteError(write)) => {
                self.write_errors.push(WriteFailure {
                    index,
                    code: write.code,
                    message: write.message.clone(),
                });
                Ok(())
            }
            ErrorKind::Write(DriverWriteFailure::WriteConcernError(concern)) => {
                self.write_concern_error = Some(WriteConcernFailure {
                    index,
                    code: concern.code,
                    message: concern.message.clone(),
                });
                Ok(())
            }
            _ => Err(DocBridgeError::from(err)),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.write_errors.is_empty() || self.write_concern_error.is_some()
    }

    /// Turn reported write errors into a typed error
    ///
    /// The first write error wins over a write concern error.
    pub fn into_result(self) -> Result<Self> {
        if let Some(failure) = self.write_errors.first() {
            return Err(DocBridgeError::from_server_code(
                failure.code,
                format!("write error at index {}: {}", failure.index, failure.message),
            ));
        }
        if let Some(concern) = &self.write_concern_error {
            return Err(DocBridgeError::from_server_code(
                concern.code,
                format!("write concern error at index {}: {}", concern.index, concern.message),
            ));
        }
        Ok(self)
    }
}
