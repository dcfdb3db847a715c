//! Property-based test generators using proptest.
//!
//! Provides strategies for generating unwritten records and batches.

use crate::fixtures::{TEST_APP, TEST_MACHINE};
use logstore_core::Record;
use proptest::prelude::*;

/// Strategy for channel tags, including negative ones.
pub fn channel_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![0..8i32, any::<i32>()]
}

/// Strategy for message payloads, including quotes and non-ASCII text.
pub fn message_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[ -~]{0,64}").expect("Invalid regex"),
        any::<String>().prop_map(|s| s.chars().filter(|c| *c != '\0').collect()),
    ]
}

/// Strategy for source file names.
pub fn source_file_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_]{1,16}\\.rs").expect("Invalid regex")
}

/// Strategy for unwritten records with arbitrary field values.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (
        source_file_strategy(),
        any::<u32>(),
        any::<u64>(),
        0i64..4_102_444_800,
        0u32..1_000_000,
        channel_strategy(),
        message_strategy(),
    )
        .prop_map(
            |(source_file, source_line, thread_id, seconds, micros, channel, message)| Record {
                id: None,
                source_file,
                source_line,
                thread_id,
                timestamp_seconds: seconds,
                timestamp_micros: micros,
                channel,
                app_name: TEST_APP.to_string(),
                machine_name: TEST_MACHINE.to_string(),
                message,
            },
        )
}

/// Strategy for batches of up to `max_len` records.
pub fn batch_strategy(max_len: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(record_strategy(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_records_are_unwritten(record in record_strategy()) {
            prop_assert!(record.id.is_none());
            prop_assert!(record.timestamp_micros < 1_000_000);
            prop_assert!(!record.message.contains('\0'));
        }

        #[test]
        fn batch_len_bounded(batch in batch_strategy(8)) {
            prop_assert!(batch.len() <= 8);
        }
    }
}
