//! Error types for the `sse` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! optional source plus a tree of error kind enums.
//!
//! Absent clients and empty groups are not errors. They are reported as `None`
//! or empty results by the registry and dispatcher.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error type for the sse crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the sse crate.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Encode(EncodeErrorKind),
    Write(WriteErrorKind),
}

/// Errors raised while turning an event into its wire representation.
/// These are programmer errors and are always returned to the caller.
#[derive(Debug, PartialEq)]
pub enum EncodeErrorKind {
    /// The payload could not be serialized to JSON.
    Serialization,
    /// A text payload contained a line break, which would split the data field.
    MultilineData,
}

/// Errors raised while writing a frame to a single connection.
#[derive(Debug, PartialEq)]
pub enum WriteErrorKind {
    /// The peer side of the stream has gone away.
    Closed,
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn is_encode(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Encode(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Write(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Encode(kind) => write!(f, "SSE encode error: {:?}", kind),
            ErrorKind::Write(kind) => write!(f, "SSE write error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Encode(EncodeErrorKind::Serialization),
        }
    }
}
