//! Append command implementation.

use logstore_core::{IdentityProvider, LogStore, ProcessIdentity, Record, WriteOutcome};
use std::path::Path;

/// Runs the append command.
pub fn run(
    path: &Path,
    max_size: u64,
    channel: i32,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = ProcessIdentity::detect();
    tracing::debug!(
        app = identity.app_name(),
        machine = identity.machine_name(),
        "resolved process identity"
    );
    let store = LogStore::open(path, max_size)?;

    let mut record = Record::new(&identity, "logstore-cli", 0, channel, message);
    let outcome = store.write(&mut record)?;

    if let Some(id) = record.id {
        println!("Wrote record {}", id.as_i64());
    }
    if let WriteOutcome::Rotated { archive } = outcome {
        println!("Log file rotated into {}", archive.display());
    }

    store.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn append_writes_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cli.db");

        run(&path, 1 << 20, 3, "from the command line").unwrap();

        let store = LogStore::open(&path, 1 << 20).unwrap();
        let records = store.get_range("", 0, 0).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].channel, 3);
        assert_eq!(records[0].message, "from the command line");
    }
}
