//! MongoDB data access for docbridge
//!
//! A thin layer over the official driver: one shared connection and a model
//! type exposing find/insert/update/delete on `database.collection`.
//!
//! # Features
//! - Lazily created, process-wide [`Connection`] via [`ConnectionRegistry`]
//! - [`DocumentModel`] for find, find-one, insert, update and delete
//! - Ordered [`BulkWrite`] batches run through the driver's collection API
//! - Typed errors from [`docbridge_common`]

pub mod bulk;
pub mod config;
pub mod connection;
pub mod model;
pub mod namespace;
pub mod query;
pub mod registry;
pub mod store;

pub use bulk::{BulkWrite, WriteConcernFailure, WriteFailure, WriteOp, WriteResult};
pub use config::ConnectionConfig;
pub use connection::Connection;
pub use docbridge_common::{DocBridgeError, Result};
pub use model::{DocumentModel, ModelConfig, ModelSchema, DEFAULT_DATABASE};
pub use namespace::Namespace;
pub use query::QueryOptions;
pub use registry::{ConnectionRegistry, Registry};
pub use store::DocumentStore;

pub use bson;
