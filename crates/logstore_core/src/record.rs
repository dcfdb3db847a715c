//! The stored log entry.

use crate::identity::{current_thread_tag, IdentityProvider};
use crate::types::RecordId;
use chrono::{DateTime, Local, Utc};

/// One diagnostic log entry.
///
/// Records are built by the emitting code, handed to
/// [`LogStore::write`](crate::LogStore::write), and read back by the query
/// operations. The wall-clock time is kept as two integers (seconds and
/// microseconds since the Unix epoch) so the stored form does not depend on
/// any platform time structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Engine-assigned id; `None` until the record has been written.
    pub id: Option<RecordId>,
    /// Source file of the logging call.
    pub source_file: String,
    /// Source line of the logging call.
    pub source_line: u32,
    /// Tag of the emitting thread.
    pub thread_id: u64,
    /// Whole seconds since the Unix epoch.
    pub timestamp_seconds: i64,
    /// Microseconds within `timestamp_seconds`.
    pub timestamp_micros: u32,
    /// Caller-defined severity or category tag.
    pub channel: i32,
    /// Name of the emitting application.
    pub app_name: String,
    /// Name of the emitting host.
    pub machine_name: String,
    /// Free-text payload.
    pub message: String,
}

impl Record {
    /// Creates a record stamped with the current time, the calling thread's
    /// tag and the names from `identity`.
    pub fn new<I>(
        identity: &I,
        source_file: impl Into<String>,
        source_line: u32,
        channel: i32,
        message: impl Into<String>,
    ) -> Self
    where
        I: IdentityProvider + ?Sized,
    {
        let now = Utc::now();
        Self {
            id: None,
            source_file: source_file.into(),
            source_line,
            thread_id: current_thread_tag(),
            timestamp_seconds: now.timestamp(),
            timestamp_micros: now.timestamp_subsec_micros(),
            channel,
            app_name: identity.app_name().to_string(),
            machine_name: identity.machine_name().to_string(),
            message: message.into(),
        }
    }

    /// Returns true once the store has assigned an id.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the record time in UTC.
    ///
    /// Out-of-range stored values map to the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(
            self.timestamp_seconds,
            self.timestamp_micros.saturating_mul(1_000),
        )
        .unwrap_or_default()
    }

    /// Renders the record time in local time as `YYYY/MM/DD HH:MM:SS.mmm`.
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp()
            .with_timezone(&Local)
            .format("%Y/%m/%d %H:%M:%S%.3f")
            .to_string()
    }
}

/// Builds a [`Record`] carrying the caller's `file!()` and `line!()`.
///
/// ```
/// use logstore_core::{log_record, ProcessIdentity};
///
/// let identity = ProcessIdentity::new("demo", "localhost");
/// let record = log_record!(&identity, 2, "cache miss for {}", "user:7");
/// assert_eq!(record.channel, 2);
/// assert_eq!(record.message, "cache miss for user:7");
/// ```
#[macro_export]
macro_rules! log_record {
    ($identity:expr, $channel:expr, $($arg:tt)+) => {
        $crate::Record::new($identity, file!(), line!(), $channel, format!($($arg)+))
    };
}
