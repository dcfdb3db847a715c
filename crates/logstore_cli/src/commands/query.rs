//! Count, show and list command implementations.

use super::open_existing;
use logstore_core::{Filter, Record, RecordId};
use serde::Serialize;
use std::path::Path;

/// Record representation for output.
#[derive(Debug, Serialize)]
pub struct RecordView {
    /// Record id.
    pub id: Option<i64>,
    /// Local time, millisecond precision.
    pub time: String,
    /// Channel tag.
    pub channel: i32,
    /// Source location (`file:line`).
    pub source: String,
    /// Thread tag.
    pub thread: u64,
    /// Application name.
    pub app: String,
    /// Machine name.
    pub machine: String,
    /// Message payload.
    pub message: String,
}

impl From<&Record> for RecordView {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id.map(RecordId::as_i64),
            time: r.formatted_timestamp(),
            channel: r.channel,
            source: format!("{}:{}", r.source_file, r.source_line),
            thread: r.thread_id,
            app: r.app_name.clone(),
            machine: r.machine_name.clone(),
            message: r.message.clone(),
        }
    }
}

/// How `list` selects records.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Raw SQL clause, appended verbatim.
    Raw(String),
    /// Bound channel filter.
    Channel(i32),
}

/// Runs the count command.
pub fn count(path: &Path, filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    println!("{}", store.count_where(filter)?);
    Ok(())
}

/// Runs the show command.
pub fn show(path: &Path, id: i64, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let record = store
        .get_by_id(RecordId::new(id))?
        .ok_or_else(|| format!("Record {} not found", id))?;
    print_records(&[record], format)
}

/// Runs the list command.
pub fn list(
    path: &Path,
    selection: &Selection,
    limit: u32,
    offset: u32,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;
    let records = match selection {
        Selection::Raw(clause) => store.get_range(clause, limit, offset)?,
        Selection::Channel(channel) => {
            store.find(&Filter::new().channel(*channel), limit, offset)?
        }
    };
    print_records(&records, format)
}

fn print_records(records: &[Record], format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let views: Vec<RecordView> = records.iter().map(RecordView::from).collect();
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        _ => {
            for v in &views {
                println!("{}", text_line(v));
            }
        }
    }
    Ok(())
}

fn text_line(v: &RecordView) -> String {
    format!(
        "[{}] {} ch={} {} tid={} {}@{}: {}",
        v.id.unwrap_or_default(),
        v.time,
        v.channel,
        v.source,
        v.thread,
        v.app,
        v.machine,
        v.message
    )
}
