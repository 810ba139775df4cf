//! Error taxonomy shared by attributes and command invocation.

use std::io;

use thiserror::Error;

use crate::io::process::Completed;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape or kind of value.
    Type,
    /// Right shape, semantically invalid value.
    Value,
    /// Read of a write-only attribute.
    Unreadable,
    /// Write of a read-only attribute.
    Unwritable,
    /// The OS refused to create the process.
    Spawn,
    /// I/O on an already spawned process.
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{what}: {expected} expected, got {found}")]
    Type {
        what: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{what}: {reason}")]
    Value { what: &'static str, reason: String },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("unreadable attribute")]
    Unreadable,

    #[error("cannot set attribute")]
    Unwritable,

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{stream}: data not representable in {encoding} at byte {offset}")]
    Codec {
        stream: &'static str,
        encoding: &'static str,
        offset: usize,
    },

    /// The process finished but a stream could not be decoded. Streams that
    /// failed are kept as [`Output::Bytes`](crate::io::process::Output::Bytes).
    #[error("{error} ({})", .completed.status)]
    Undecoded {
        completed: Box<Completed>,
        error: Box<Error>,
    },

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn type_mismatch(
        what: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Error::Type {
            what,
            expected,
            found,
        }
    }

    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Error::Value {
            what,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(context: &'static str, source: io::Error) -> Self {
        Error::Io { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Type { .. } | Error::UnknownAttribute(_) => ErrorKind::Type,
            Error::Value { .. } | Error::UnknownEncoding(_) | Error::Codec { .. } => {
                ErrorKind::Value
            }
            Error::Unreadable => ErrorKind::Unreadable,
            Error::Unwritable => ErrorKind::Unwritable,
            Error::Spawn { .. } => ErrorKind::Spawn,
            Error::Io { .. } => ErrorKind::Io,
            Error::Undecoded { error, .. } => error.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
