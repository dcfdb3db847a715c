//! The log store: lifecycle, writes, rotation and queries.

use crate::archive::{sync_parent, Archiver, ZstdArchiver};
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::filter::Filter;
use crate::record::Record;
use crate::rotation::rotation_target;
use crate::schema::{self, SELECT_COLUMNS};
use crate::types::{RecordId, WriteOutcome};
use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection, OptionalExtension, TransactionBehavior};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A rotating, queryable store of log records backed by one SQLite file.
///
/// `LogStore` is the primary entry point. It provides:
/// - Batched, transactional writes
/// - Size-triggered rotation with zstd archival
/// - Count, lookup and paged range queries
///
/// Every public operation holds one store-wide mutex for its whole
/// duration, so writes, rotations and reads are totally ordered. A rotation
/// (including compression of the old file) blocks all other callers until
/// it completes.
///
/// # Opening a Store
///
/// ```rust,ignore
/// use logstore_core::{LogStore, ProcessIdentity, Record};
///
/// let identity = ProcessIdentity::detect();
/// let store = LogStore::open("logs/app.db", 10 * 1024 * 1024)?;
///
/// let mut record = Record::new(&identity, file!(), line!(), 1, "started");
/// store.write(&mut record)?;
/// assert!(record.id.is_some());
///
/// let errors = store.count_where("where channel = 1")?;
/// store.close()?;
/// ```
///
/// # Self-healing
///
/// If the file at the configured path cannot be opened as a log file (it is
/// corrupt, or not a database at all), `open` rotates it out of the way
/// exactly as a size-triggered rotation would and starts a fresh file.
pub struct LogStore {
    /// Active log file path.
    path: PathBuf,
    /// Configuration.
    config: StoreConfig,
    /// Compresses rotated files.
    archiver: Box<dyn Archiver>,
    /// Connection state, guarded by the store-wide lock.
    inner: Mutex<Inner>,
}

/// State that only exists while a file is open.
struct Inner {
    /// `None` once the store is closed.
    conn: Option<Connection>,
    /// Cached verdict of the layout check for the open file.
    layout_ok: Option<bool>,
}

impl Inner {
    fn conn(&self) -> CoreResult<&Connection> {
        self.conn.as_ref().ok_or(CoreError::StoreClosed)
    }

    fn conn_mut(&mut self) -> CoreResult<&mut Connection> {
        self.conn.as_mut().ok_or(CoreError::StoreClosed)
    }

    fn attach(&mut self, conn: Connection) {
        self.conn = Some(conn);
        self.layout_ok = None;
    }

    /// Finalizes cached statements and closes the connection.
    fn release(&mut self) -> CoreResult<()> {
        self.layout_ok = None;
        if let Some(conn) = self.conn.take() {
            conn.flush_prepared_statement_cache();
            if let Err((conn, err)) = conn.close() {
                self.conn = Some(conn);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Returns whether the open file has a layout reads can decode.
    fn readable(&mut self, path: &Path) -> CoreResult<bool> {
        let ok = match self.layout_ok {
            Some(ok) => ok,
            None => {
                let ok = schema::layout_matches(self.conn()?)?;
                self.layout_ok = Some(ok);
                ok
            }
        };
        if !ok {
            warn!(
                path = %path.display(),
                "layout of the log table in the current log file is not understood"
            );
        }
        Ok(ok)
    }
}

impl LogStore {
    /// Opens or creates a log store at `path`, rotating once the file grows
    /// past `max_file_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_file_size` is zero or no usable file can be
    /// set up at `path`. A damaged file at `path` is not an error unless
    /// [`StoreConfig::attach_only`] is set, in which case it is left
    /// untouched and [`CoreError::NotALogFile`] is returned.
    pub fn open(path: impl AsRef<Path>, max_file_size: u64) -> CoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default().max_file_size(max_file_size))
    }

    /// Opens a log store with custom configuration, archiving with zstd.
    ///
    /// # Errors
    ///
    /// See [`LogStore::open`].
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> CoreResult<Self> {
        let archiver = ZstdArchiver::new(config.compression_level);
        Self::open_with_archiver(path, config, Box::new(archiver))
    }

    /// Opens a log store with a custom archiver.
    ///
    /// # Errors
    ///
    /// See [`LogStore::open`].
    pub fn open_with_archiver(
        path: impl AsRef<Path>,
        config: StoreConfig,
        archiver: Box<dyn Archiver>,
    ) -> CoreResult<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();

        if config.create_dirs && !config.attach_only {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            path,
            config,
            archiver,
            inner: Mutex::new(Inner {
                conn: None,
                layout_ok: None,
            }),
        };

        let attach_only = store.config.attach_only;
        let conn = match schema::bootstrap(&store.path, &store.config, !attach_only) {
            Ok(conn) => conn,
            Err(err) if attach_only => return Err(err),
            Err(err) => {
                warn!(
                    path = %store.path.display(),
                    error = %err,
                    "log file unusable, moving it aside and starting a new one"
                );
                store.recover_unusable()?
            }
        };
        store.inner.lock().attach(conn);

        debug!(path = %store.path.display(), "log store open");
        Ok(store)
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns true until [`close`](Self::close) is called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.lock().conn.is_some()
    }

    /// Closes the store, finalizing cached statements and the connection.
    ///
    /// Calling `close` again is a no-op. Every other operation on a closed
    /// store returns [`CoreError::StoreClosed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to close the connection; the
    /// store then stays open.
    pub fn close(&self) -> CoreResult<()> {
        self.inner.lock().release()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Writes one record and stamps it with its new id.
    ///
    /// # Errors
    ///
    /// See [`write_batch`](Self::write_batch).
    pub fn write(&self, record: &mut Record) -> CoreResult<WriteOutcome> {
        self.write_batch(std::slice::from_mut(record))
    }

    /// Writes all records in one transaction and stamps each with its id.
    ///
    /// After the commit the file size is checked, and if it exceeds the
    /// configured maximum the file is rotated before this call returns.
    /// At most one rotation happens per call.
    ///
    /// # Errors
    ///
    /// If any insert fails, nothing from the batch is committed and no
    /// record is stamped. If the batch commits but the following rotation
    /// fails, the records are stamped and the rotation error is returned.
    pub fn write_batch(&self, records: &mut [Record]) -> CoreResult<WriteOutcome> {
        let mut inner = self.inner.lock();
        let conn = inner.conn_mut()?;
        if records.is_empty() {
            return Ok(WriteOutcome::Written);
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records.iter() {
            ids.push(schema::insert(&tx, record)?);
        }
        tx.commit()?;

        for (record, id) in records.iter_mut().zip(ids) {
            record.id = Some(id);
        }
        debug!(count = records.len(), "committed log records");

        self.check_size(&mut inner)
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Rotates the active file now, regardless of its size.
    ///
    /// Returns the path of the archive written.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rotation`] if the file cannot be renamed and
    /// [`CoreError::Archive`] if it cannot be compressed. In both cases the
    /// store stays writable.
    pub fn rotate_now(&self) -> CoreResult<PathBuf> {
        let mut inner = self.inner.lock();
        inner.conn()?;
        self.rotate(&mut inner)
    }

    /// Returns the estimated size of the active file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn file_size(&self) -> CoreResult<u64> {
        let inner = self.inner.lock();
        schema::estimated_size(inner.conn()?)
    }

    fn check_size(&self, inner: &mut Inner) -> CoreResult<WriteOutcome> {
        let size = schema::estimated_size(inner.conn()?)?;
        if size <= self.config.max_file_size {
            return Ok(WriteOutcome::Written);
        }

        info!(
            path = %self.path.display(),
            size,
            max = self.config.max_file_size,
            "log file over size limit, rotating"
        );
        let archive = self.rotate(inner)?;
        Ok(WriteOutcome::Rotated { archive })
    }

    /// Closes, retires and reopens the active file.
    ///
    /// A fresh file is bootstrapped even when retiring failed, so the store
    /// never ends up without a writable log.
    fn rotate(&self, inner: &mut Inner) -> CoreResult<PathBuf> {
        inner.release()?;

        let retired = self.retire_active_file();
        match schema::bootstrap(&self.path, &self.config, true) {
            Ok(conn) => inner.attach(conn),
            Err(err) if retired.is_ok() => return Err(err),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not reopen log file after failed rotation"
                );
            }
        }

        let archive = retired?;
        info!(
            path = %self.path.display(),
            archive = %archive.display(),
            "log file rotated"
        );
        Ok(archive)
    }

    /// Renames the (closed) active file, archives it and removes the
    /// uncompressed copy. Returns the archive path.
    fn retire_active_file(&self) -> CoreResult<PathBuf> {
        let target = rotation_target(&self.path, &Local::now(), self.archiver.extension());

        fs::rename(&self.path, &target.rotated).map_err(|source| CoreError::Rotation {
            from: self.path.clone(),
            to: target.rotated.clone(),
            source,
        })?;

        self.archiver.archive(&target.rotated, &target.archive)?;

        fs::remove_file(&target.rotated).map_err(|e| {
            CoreError::archive(&target.rotated, format!("removing uncompressed copy: {e}"))
        })?;
        sync_parent_or_warn(&self.path);

        Ok(target.archive)
    }

    /// Moves an unreadable file aside and bootstraps a fresh one.
    fn recover_unusable(&self) -> CoreResult<Connection> {
        match self.retire_active_file() {
            Ok(archive) => {
                info!(archive = %archive.display(), "archived unusable log file");
            }
            Err(err @ CoreError::Archive { .. }) => {
                warn!(error = %err, "could not archive unusable log file, keeping it uncompressed");
            }
            Err(err) => return Err(err),
        }
        schema::bootstrap(&self.path, &self.config, true)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns the number of records in the active file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn count(&self) -> CoreResult<u64> {
        self.count_where("")
    }

    /// Returns the number of records matching a raw SQL fragment.
    ///
    /// The fragment is appended verbatim after `select count(1) from
    /// logtable`, e.g. `"where channel = 1"`. It is not escaped or
    /// validated; never build it from untrusted input. Prefer
    /// [`count_matching`](Self::count_matching) for bound parameters.
    ///
    /// # Errors
    ///
    /// Returns an engine error for a malformed fragment.
    pub fn count_where(&self, filter: &str) -> CoreResult<u64> {
        let inner = self.inner.lock();
        let conn = inner.conn()?;
        let sql = format!("select count(1) from logtable {filter}");
        let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Returns the number of records matching a structured filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn count_matching(&self, filter: &Filter) -> CoreResult<u64> {
        let inner = self.inner.lock();
        let conn = inner.conn()?;
        let (clause, values) = filter.compile();
        let sql = format!("select count(1) from logtable {clause}");
        let n: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    /// Returns the record with the given id, if present.
    ///
    /// Returns `None` (and logs a warning) if the file's table layout is not
    /// the one this store writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn get_by_id(&self, id: RecordId) -> CoreResult<Option<Record>> {
        let mut inner = self.inner.lock();
        if !inner.readable(&self.path)? {
            return Ok(None);
        }
        let conn = inner.conn()?;
        let sql = format!("{SELECT_COLUMNS} where id = ?1");
        let record = conn
            .query_row(&sql, [id.as_i64()], schema::decode_row)
            .optional()?;
        Ok(record)
    }

    /// Returns records matching a raw SQL fragment, with paging.
    ///
    /// The fragment is appended verbatim after the select (see
    /// [`count_where`](Self::count_where)). Rows come back in insertion
    /// (ascending id) order unless the fragment carries its own `order by`.
    /// `limit == 0` means unbounded, in which case `offset` is ignored.
    ///
    /// Returns an empty list (and logs a warning) if the file's table layout
    /// is not the one this store writes.
    ///
    /// # Errors
    ///
    /// Returns an engine error for a malformed fragment.
    pub fn get_range(&self, filter: &str, limit: u32, offset: u32) -> CoreResult<Vec<Record>> {
        let mut inner = self.inner.lock();
        if !inner.readable(&self.path)? {
            return Ok(Vec::new());
        }
        let conn = inner.conn()?;

        let mut sql = format!("{SELECT_COLUMNS} {filter}");
        if !has_order_by(filter) {
            sql.push_str(" order by id");
        }
        if limit != 0 {
            sql.push_str(&format!(" limit {limit} offset {offset}"));
        }

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], schema::decode_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Returns records matching a structured filter, with paging.
    ///
    /// Paging follows [`get_range`](Self::get_range).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn find(&self, filter: &Filter, limit: u32, offset: u32) -> CoreResult<Vec<Record>> {
        let mut inner = self.inner.lock();
        if !inner.readable(&self.path)? {
            return Ok(Vec::new());
        }
        let conn = inner.conn()?;

        let (clause, values) = filter.compile();
        let mut sql = format!("{SELECT_COLUMNS} {clause} {}", filter.order_by());
        if limit != 0 {
            sql.push_str(&format!(" limit {limit} offset {offset}"));
        }

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values), schema::decode_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Returns the smallest id in the active file, or `None` if it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn oldest_id(&self) -> CoreResult<Option<RecordId>> {
        self.id_bound("min")
    }

    /// Returns the largest id in the active file, or `None` if it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or the engine fails.
    pub fn newest_id(&self) -> CoreResult<Option<RecordId>> {
        self.id_bound("max")
    }

    fn id_bound(&self, aggregate: &str) -> CoreResult<Option<RecordId>> {
        let inner = self.inner.lock();
        let conn = inner.conn()?;
        let sql = format!("select {aggregate}(id) from logtable");
        let id: Option<i64> = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(id.map(RecordId::new))
    }
}

/// Returns true if a raw fragment has its own `order by`.
fn has_order_by(fragment: &str) -> bool {
    let words: Vec<String> = fragment
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    words.windows(2).any(|w| w[0] == "order" && w[1] == "by")
}

/// Syncs the log directory after a completed rotation. The rotation has
/// already happened, so a failure here is only logged.
fn sync_parent_or_warn(path: &Path) -> bool {
    match sync_parent(path) {
        Ok(()) => true,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "rotation finished but the directory could not be synced"
            );
            false
        }
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("path", &self.path)
            .field("config", &self.config)
            .field("archiver", &self.archiver.extension())
            .finish_non_exhaustive()
    }
}
