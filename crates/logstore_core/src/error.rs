//! Error types for the log store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for log store operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in log store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The SQL engine reported a failure.
    ///
    /// Carries the engine's own message text. This covers I/O failures,
    /// malformed SQL (including bad filter fragments), full disks and
    /// constraint violations.
    #[error("sqlite error: {message}")]
    Engine {
        /// Message reported by the engine.
        message: String,
    },

    /// The SQL engine was used in a way it does not allow.
    #[error("programming problem using the sqlite interface: {message}")]
    Misuse {
        /// Message reported by the engine.
        message: String,
    },

    /// The active log file could not be renamed during rotation.
    ///
    /// The store has already reopened the original file when this is
    /// returned, so it remains writable.
    #[error("error renaming log file {} to {}: {source}", from.display(), to.display())]
    Rotation {
        /// The active log file.
        from: PathBuf,
        /// The rotated name that could not be taken.
        to: PathBuf,
        /// The underlying rename failure.
        #[source]
        source: io::Error,
    },

    /// Compressing a rotated file, or removing its uncompressed copy, failed.
    #[error("archive error for {}: {message}", path.display())]
    Archive {
        /// The rotated file being archived.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The file exists but does not hold a log table, and the store was
    /// configured to attach only to existing logs.
    #[error("{} is not a log file: {reason}", path.display())]
    NotALogFile {
        /// The file that was rejected.
        path: PathBuf,
        /// What the engine reported.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store has been closed.
    #[error("log store is closed")]
    StoreClosed,

    /// The configuration cannot be used.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Creates an archive error.
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if this error came from the SQL engine.
    #[must_use]
    pub fn is_engine(&self) -> bool {
        matches!(self, Self::Engine { .. } | Self::Misuse { .. })
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ffi_err, msg)
                if ffi_err.code == rusqlite::ErrorCode::ApiMisuse =>
            {
                Self::Misuse {
                    message: msg.unwrap_or_else(|| ffi_err.to_string()),
                }
            }
            rusqlite::Error::SqliteFailure(ffi_err, Some(msg)) => Self::Engine {
                message: format!("{msg} ({ffi_err})"),
            },
            other => Self::Engine {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_is_classified() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
            Some("bad state".into()),
        );
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::Misuse { ref message } if message == "bad state"));
        assert!(core.is_engine());
    }

    #[test]
    fn engine_message_is_kept() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute("select * from nowhere", []).unwrap_err();
        let core: CoreError = err.into();
        match core {
            CoreError::Engine { message } => assert!(message.contains("no such table")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rotation_error_display() {
        let err = CoreError::Rotation {
            from: PathBuf::from("app.log"),
            to: PathBuf::from("app.log.20240101000000"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = err.to_string();
        assert!(text.contains("app.log.20240101000000"));
        assert!(text.contains("denied"));
    }
}
