//! The on-disk table layout and the statements that touch it.
//!
//! A log file holds a single table:
//!
//! ```text
//! logtable
//! ├─ id           integer primary key autoincrement
//! ├─ file         source file of the logging call
//! ├─ line         source line
//! ├─ tid          thread tag
//! ├─ timestamp_a  seconds since the Unix epoch
//! ├─ timestamp_b  microseconds within the second
//! ├─ channel      severity / category tag
//! ├─ appName      emitting application
//! ├─ machineName  emitting host
//! └─ msg          payload
//! ```
//!
//! Column order and count are load-bearing: readers refuse to decode a
//! table that does not have exactly [`COLUMN_COUNT`] columns.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::types::RecordId;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;

/// Name of the log table.
pub const TABLE_NAME: &str = "logtable";

/// Number of columns in the log table.
pub const COLUMN_COUNT: usize = 10;

const TABLE_EXISTS_SQL: &str =
    "select name from sqlite_master where type = 'table' and name = 'logtable'";

const CREATE_TABLE_SQL: &str = "create table logtable ( \
     id integer primary key autoincrement, \
     file varchar(20), \
     line int, \
     tid int, \
     timestamp_a int, \
     timestamp_b int, \
     channel int, \
     appName varchar(10), \
     machineName varchar(10), \
     msg varchar(10) \
     )";

pub(crate) const INSERT_SQL: &str = "insert into logtable \
     (file, line, tid, timestamp_a, timestamp_b, channel, appName, machineName, msg) \
     values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

pub(crate) const SELECT_COLUMNS: &str = "select id, file, line, tid, timestamp_a, timestamp_b, \
     channel, appName, machineName, msg from logtable";

/// Opens the file at `path` and makes sure the log table exists.
///
/// With `create` set, a missing file or table is created. Without it, the
/// file must already hold the log table and nothing is written to it.
/// An existing table is accepted without looking at its columns; see
/// [`layout_matches`].
///
/// # Errors
///
/// Fails if the file cannot be opened, is not a database, or the table
/// cannot be created. Returns [`CoreError::NotALogFile`] when `create` is
/// off and the file has no log table.
pub(crate) fn bootstrap(
    path: &Path,
    config: &StoreConfig,
    create: bool,
) -> CoreResult<Connection> {
    let conn = if create {
        Connection::open(path)?
    } else {
        let flags = OpenFlags::default().difference(OpenFlags::SQLITE_OPEN_CREATE);
        Connection::open_with_flags(path, flags).map_err(|e| not_a_log(path, e))?
    };

    let existing: Option<String> = conn
        .query_row(TABLE_EXISTS_SQL, [], |row| row.get(0))
        .optional()
        .map_err(|e| if create { e.into() } else { not_a_log(path, e) })?;

    match existing {
        Some(_) => {}
        None if create => {
            tracing::debug!(path = %path.display(), "creating log table");
            conn.execute(CREATE_TABLE_SQL, [])?;
        }
        None => return Err(not_a_log(path, "no log table")),
    }

    conn.busy_timeout(config.busy_timeout)?;
    conn.pragma_update(None, "synchronous", config.synchronous_pragma())?;
    conn.set_prepared_statement_cache_capacity(4);

    Ok(conn)
}

/// Returns true if the log table has the expected number of columns.
pub(crate) fn layout_matches(conn: &Connection) -> CoreResult<bool> {
    let columns: usize = conn.query_row(
        "select count(*) from pragma_table_info('logtable')",
        [],
        |row| row.get(0),
    )?;
    Ok(columns == COLUMN_COUNT)
}

/// Inserts one record through the cached insert statement and returns the
/// id the engine assigned to it.
pub(crate) fn insert(conn: &Connection, record: &Record) -> CoreResult<RecordId> {
    let mut stmt = conn.prepare_cached(INSERT_SQL)?;
    stmt.execute(params![
        record.source_file,
        record.source_line,
        record.thread_id as i64,
        record.timestamp_seconds,
        record.timestamp_micros,
        record.channel,
        record.app_name,
        record.machine_name,
        record.message,
    ])?;
    Ok(RecordId::new(conn.last_insert_rowid()))
}

/// Decodes a row selected with [`SELECT_COLUMNS`].
pub(crate) fn decode_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: Some(RecordId::new(row.get(0)?)),
        source_file: text(row, 1)?,
        source_line: row.get::<_, Option<u32>>(2)?.unwrap_or_default(),
        thread_id: row.get::<_, Option<i64>>(3)?.unwrap_or_default() as u64,
        timestamp_seconds: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        timestamp_micros: row.get::<_, Option<u32>>(5)?.unwrap_or_default(),
        channel: row.get::<_, Option<i32>>(6)?.unwrap_or_default(),
        app_name: text(row, 7)?,
        machine_name: text(row, 8)?,
        message: text(row, 9)?,
    })
}

fn not_a_log(path: &Path, reason: impl ToString) -> CoreError {
    CoreError::NotALogFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// Estimated file size in bytes: page size times page count.
pub(crate) fn estimated_size(conn: &Connection) -> CoreResult<u64> {
    let page_size: i64 = conn.pragma_query_value(None, "page_size", |row| row.get(0))?;
    let page_count: i64 = conn.pragma_query_value(None, "page_count", |row| row.get(0))?;
    Ok(u64::try_from(page_size.saturating_mul(page_count)).unwrap_or(0))
}
