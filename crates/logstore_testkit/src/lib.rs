//! # LogStore Testkit
//!
//! Test utilities for LogStore.
//!
//! This crate provides:
//! - Temporary store fixtures with automatic cleanup
//! - Property-based record generators using proptest
//! - Concurrent write stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use logstore_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store(|store| {
//!         let mut record = sample_record(1, "hello");
//!         store.write(&mut record).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
