//! Common utilities for docbridge
//!
//! This crate provides the error type shared by every docbridge crate.

pub mod error;

pub use error::{DocBridgeError, Result};
