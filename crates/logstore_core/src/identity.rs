//! Process identity stamped onto every record.
//!
//! The application name and machine name are resolved once, when the
//! process builds its [`ProcessIdentity`], and then copied into each
//! [`Record`](crate::Record) at construction time. Nothing here is a lazy
//! global: callers own the identity value and pass it where records are made.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the application and machine names written into records.
pub trait IdentityProvider: Send + Sync {
    /// Name of the emitting application.
    fn app_name(&self) -> &str;

    /// Name of the host the application runs on.
    fn machine_name(&self) -> &str;
}

/// Identity of the current process, resolved once and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    app_name: Arc<str>,
    machine_name: Arc<str>,
}

impl ProcessIdentity {
    /// Creates an identity from explicit names.
    pub fn new(app_name: impl AsRef<str>, machine_name: impl AsRef<str>) -> Self {
        Self {
            app_name: Arc::from(app_name.as_ref()),
            machine_name: Arc::from(machine_name.as_ref()),
        }
    }

    /// Resolves the identity from the running process.
    ///
    /// The application name is the path of the current executable and the
    /// machine name is the host name. Either falls back to `"unknown"` if
    /// the platform cannot report it.
    #[must_use]
    pub fn detect() -> Self {
        let app_name = std::env::current_exe()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let machine_name = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self::new(app_name, machine_name)
    }
}

impl IdentityProvider for ProcessIdentity {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn machine_name(&self) -> &str {
        &self.machine_name
    }
}

static NEXT_THREAD_TAG: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TAG: Cell<u64> = const { Cell::new(0) };
}

/// Returns a numeric tag for the calling thread.
///
/// Tags are handed out on first use per thread and stay stable for the
/// thread's lifetime. They are never zero.
#[must_use]
pub fn current_thread_tag() -> u64 {
    THREAD_TAG.with(|tag| {
        if tag.get() == 0 {
            tag.set(NEXT_THREAD_TAG.fetch_add(1, Ordering::Relaxed));
        }
        tag.get()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn explicit_identity() {
        let id = ProcessIdentity::new("billing", "host-a");
        assert_eq!(id.app_name(), "billing");
        assert_eq!(id.machine_name(), "host-a");
    }

    #[test]
    fn detected_identity_is_not_empty() {
        let id = ProcessIdentity::detect();
        assert!(!id.app_name().is_empty());
        assert!(!id.machine_name().is_empty());
    }

    #[test]
    fn thread_tag_is_stable() {
        let a = current_thread_tag();
        let b = current_thread_tag();
        assert_eq!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn thread_tags_differ_across_threads() {
        let here = current_thread_tag();
        let there = thread::spawn(current_thread_tag).join().unwrap();
        assert_ne!(here, there);
    }
}
