//! # LogStore Core
//!
//! A rotating, queryable store for structured diagnostic log records.
//!
//! Records accumulate in a single SQLite file. After every committed write
//! batch the store estimates the file size, and once it crosses the
//! configured maximum the file is closed, renamed with a timestamp,
//! compressed with zstd and replaced by a fresh file at the original path.
//!
//! This crate provides:
//! - [`Record`] and the [`log_record!`] constructor macro
//! - [`ProcessIdentity`], resolved once and injected into every record
//! - [`LogStore`] with batched transactional writes, rotation and queries
//! - [`Filter`] for bound-parameter queries
//! - [`Archiver`] / [`ZstdArchiver`] and [`extract`] for rotated files
//!
//! ## Example
//!
//! ```no_run
//! use logstore_core::{log_record, LogStore, ProcessIdentity};
//!
//! let identity = ProcessIdentity::detect();
//! let store = LogStore::open("app-log.db", 8 * 1024 * 1024).unwrap();
//!
//! let mut batch = vec![
//!     log_record!(&identity, 1, "connected to {}", "db-01"),
//!     log_record!(&identity, 2, "slow query: {} ms", 812),
//! ];
//! store.write_batch(&mut batch).unwrap();
//!
//! let slow = store.get_range("where channel = 2", 10, 0).unwrap();
//! assert_eq!(slow.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
mod config;
mod error;
mod filter;
mod identity;
mod record;
pub mod rotation;
mod schema;
mod store;
mod types;

pub use archive::{extract, Archiver, ZstdArchiver};
pub use config::StoreConfig;
pub use error::{CoreError, CoreResult};
pub use filter::{Field, Filter, Op, Predicate, Value};
pub use identity::{current_thread_tag, IdentityProvider, ProcessIdentity};
pub use record::Record;
pub use schema::{COLUMN_COUNT, TABLE_NAME};
pub use store::LogStore;
pub use types::{RecordId, WriteOutcome};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
