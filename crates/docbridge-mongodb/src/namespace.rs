//! Qualified `database.collection` names

use docbridge_common::{DocBridgeError, Result};
use std::fmt;

/// A collection addressed within a database
///
/// The qualified form is always `database + "." + collection`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    /// Build a namespace from its two parts
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let database = database.into();
        let collection = collection.into();

        if database.is_empty() {
            return Err(DocBridgeError::Validation(
                "Database name cannot be empty".to_string(),
            ));
        }
        if database.contains('.') || database.contains('\0') {
            return Err(DocBridgeError::Validation(format!(
                "Database name cannot contain '.' or null bytes: '{}'",
                database
            )));
        }
        if collection.is_empty() {
            return Err(DocBridgeError::Validation(
                "Collection name cannot be empty".to_string(),
            ));
        }
        if collection.contains('\0') {
            return Err(DocBridgeError::Validation(
                "Collection name cannot contain null bytes".to_string(),
            ));
        }

        Ok(Self {
            database,
            collection,
        })
    }

    /// Split a qualified name at its first `.`
    pub fn parse(qualified: &str) -> Result<Self> {
        match qualified.split_once('.') {
            Some((database, collection)) => Self::new(database, collection),
            None => Err(DocBridgeError::Validation(format!(
                "Qualified name must have the form 'database.collection': '{}'",
                qualified
            ))),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

impl std::str::FromStr for Namespace {
    type Err = DocBridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
