//! Core type definitions.

use std::fmt;

/// Identifier of a stored record.
///
/// Assigned by the engine on insert. Ids are strictly increasing within one
/// physical log file and start over when rotation creates a new file, so
/// they are only unique within the active file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Creates a new record ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec:{}", self.0)
    }
}

/// What a write call did, observed as one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The records were committed to the active file.
    Written,
    /// The records were committed, then the file crossed the size limit and
    /// was rotated before the call returned.
    Rotated {
        /// The compressed archive holding the rotated file.
        archive: std::path::PathBuf,
    },
}

impl WriteOutcome {
    /// Returns true if the write triggered a rotation.
    #[must_use]
    pub fn rotated(&self) -> bool {
        matches!(self, Self::Rotated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_ordering() {
        assert!(RecordId::new(1) < RecordId::new(2));
    }

    #[test]
    fn record_id_display() {
        assert_eq!(format!("{}", RecordId::new(42)), "rec:42");
    }

    #[test]
    fn outcome_rotated() {
        assert!(!WriteOutcome::Written.rotated());
        let rotated = WriteOutcome::Rotated {
            archive: "a.zst".into(),
        };
        assert!(rotated.rotated());
    }
}
