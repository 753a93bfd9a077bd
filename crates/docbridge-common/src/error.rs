//! Error types for docbridge

use thiserror::Error;

/// Result type alias for docbridge operations
pub type Result<T> = std::result::Result<T, DocBridgeError>;

/// Unified error type for all docbridge operations
///
/// Driver failures are classified into a small closed set of kinds so callers
/// can branch on the failure category instead of inspecting message text. The
/// original message is always kept.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocBridgeError {
    /// The server could not be reached or the connection was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation exceeded a driver or server time limit - retryable
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Duplicate key or concurrent write conflict
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    /// Document or argument rejected by the server or by local checks
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver failure that fits no other category
    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Server error codes with a dedicated error kind
mod codes {
    pub const EXCEEDED_TIME_LIMIT: i32 = 50;
    pub const WRITE_CONFLICT: i32 = 112;
    pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
    pub const DUPLICATE_KEY: i32 = 11000;
    pub const DUPLICATE_KEY_LEGACY: i32 = 11001;
}

impl DocBridgeError {
    /// Classifies a server error code reported in a command reply
    pub fn from_server_code(code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            codes::DUPLICATE_KEY | codes::DUPLICATE_KEY_LEGACY | codes::WRITE_CONFLICT => {
                DocBridgeError::WriteConflict(message)
            }
            codes::DOCUMENT_VALIDATION_FAILURE => DocBridgeError::Validation(message),
            codes::EXCEEDED_TIME_LIMIT => DocBridgeError::Timeout(message),
            _ => DocBridgeError::MongoDB(message),
        }
    }

    /// Returns true if this error is potentially retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocBridgeError::Connection(_) | DocBridgeError::Timeout(_)
        )
    }

    /// Returns true if the server rejected the written data itself
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DocBridgeError::WriteConflict(_) | DocBridgeError::Validation(_)
        )
    }
}

impl From<serde_json::Error> for DocBridgeError {
    fn from(err: serde_json::Error) -> Self {
        DocBridgeError::Serialization(err.to_string())
    }
}

#[cfg(feature = "config-errors")]
impl From<toml::de::Error> for DocBridgeError {
    fn from(err: toml::de::Error) -> Self {
        DocBridgeError::Config(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for DocBridgeError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        let message = err.to_string();
        match err.kind.as_ref() {
            // Selection gives up after serverSelectionTimeoutMS when no server
            // answers, so it is reported as unreachable rather than as Timeout.
            ErrorKind::ServerSelection { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Authentication { .. }
            | ErrorKind::InvalidTlsConfig { .. } => DocBridgeError::Connection(message),
            ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                DocBridgeError::Timeout(message)
            }
            ErrorKind::Io(_) => DocBridgeError::Connection(message),
            ErrorKind::InvalidArgument { .. } => DocBridgeError::Validation(message),
            ErrorKind::BsonSerialization(_) => DocBridgeError::Serialization(message),
            ErrorKind::BsonDeserialization(_) | ErrorKind::InvalidResponse { .. } => {
                DocBridgeError::Deserialization(message)
            }
            ErrorKind::Command(command) => DocBridgeError::from_server_code(command.code, message),
            ErrorKind::Write(WriteFailure::WriteError(write)) => {
                DocBridgeError::from_server_code(write.code, message)
            }
            ErrorKind::Write(WriteFailure::WriteConcernError(concern)) => {
                DocBridgeError::from_server_code(concern.code, message)
            }
            ErrorKind::Internal { .. } => DocBridgeError::Internal(message),
            _ => DocBridgeError::MongoDB(message),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for DocBridgeError {
    fn from(err: bson::ser::Error) -> Self {
        DocBridgeError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for DocBridgeError {
    fn from(err: bson::de::Error) -> Self {
        DocBridgeError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = DocBridgeError::Connection("connection refused".to_string());
        assert_eq!(err.to_string(), "Connection error: connection refused");
    }

    #[test]
    fn test_error_display_write_conflict() {
        let err = DocBridgeError::WriteConflict("E11000 duplicate key".to_string());
        assert_eq!(err.to_string(), "Write conflict: E11000 duplicate key");
    }

    #[test]
    fn test_error_display_mongodb() {
        let err = DocBridgeError::MongoDB("unknown failure".to_string());
        assert_eq!(err.to_string(), "MongoDB error: unknown failure");
    }

    #[test]
    fn test_from_server_code_duplicate_key() {
        let err = DocBridgeError::from_server_code(11000, "E11000 duplicate key error");
        assert_eq!(
            err,
            DocBridgeError::WriteConflict("E11000 duplicate key error".to_string())
        );
        assert!(err.is_constraint_violation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_server_code_validation() {
        let err = DocBridgeError::from_server_code(121, "Document failed validation");
        assert!(matches!(err, DocBridgeError::Validation(_)));
    }

    #[test]
    fn test_from_server_code_time_limit() {
        let err = DocBridgeError::from_server_code(50, "operation exceeded time limit");
        assert!(matches!(err, DocBridgeError::Timeout(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_from_server_code_unknown_keeps_message() {
        let err = DocBridgeError::from_server_code(2, "BadValue");
        assert_eq!(err, DocBridgeError::MongoDB("BadValue".to_string()));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: DocBridgeError = json_err.into();
        assert!(matches!(err, DocBridgeError::Serialization(_)));
    }

    #[test]
    fn test_is_retryable() {
        assert!(DocBridgeError::Connection("test".to_string()).is_retryable());
        assert!(DocBridgeError::Timeout("test".to_string()).is_retryable());
        assert!(!DocBridgeError::WriteConflict("test".to_string()).is_retryable());
        assert!(!DocBridgeError::NotFound("test".to_string()).is_retryable());
    }
}

#[cfg(all(test, feature = "mongodb-errors"))]
mod mongodb_conversion_tests {
    use super::*;
    use std::io;

    fn io_error(kind: io::ErrorKind, message: &str) -> DocBridgeError {
        DocBridgeError::from(mongodb::error::Error::from(io::Error::new(kind, message)))
    }

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let err = io_error(io::ErrorKind::TimedOut, "read timed out");
        assert!(matches!(err, DocBridgeError::Timeout(ref m) if m.contains("read timed out")));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_io_maps_to_connection() {
        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::BrokenPipe,
        ] {
            let err = io_error(kind, "socket closed");
            assert!(matches!(err, DocBridgeError::Connection(_)), "{:?} gave {:?}", kind, err);
            assert!(err.is_retryable());
            assert!(!err.is_constraint_violation());
        }
    }

    #[test]
    fn test_bson_errors_map_to_codec_kinds() {
        let de = bson::from_document::<i32>(bson::doc! { "a": 1 }).unwrap_err();
        assert!(matches!(DocBridgeError::from(de), DocBridgeError::Deserialization(_)));
    }
}
