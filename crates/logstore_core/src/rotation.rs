//! Naming of rotated log files.
//!
//! A rotated file is renamed to `<path>.<YYYYMMDDHHMMSS>` and archived to
//! `<path>.<YYYYMMDDHHMMSS>.<ext>`. Two rotations within the same second
//! would collide, so a `-1`, `-2`, ... counter is appended to the stamp
//! until neither the rotated name nor its archive exists yet.

use crate::archive::{append_suffix, archive_path_for};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Calendar format of the rotation stamp.
pub const ROTATION_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Paths produced by one rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationTarget {
    /// Where the active file is renamed to.
    pub rotated: PathBuf,
    /// Where the compressed copy is written.
    pub archive: PathBuf,
}

/// Picks a free rotation target for `path` at time `now`.
pub fn rotation_target<Tz>(path: &Path, now: &DateTime<Tz>, extension: &str) -> RotationTarget
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stamp = now.format(ROTATION_STAMP_FORMAT).to_string();
    let mut attempt = 0u32;
    loop {
        let suffix = if attempt == 0 {
            stamp.clone()
        } else {
            format!("{stamp}-{attempt}")
        };
        let rotated = append_suffix(path, &suffix);
        let archive = archive_path_for(&rotated, extension);
        if !rotated.exists() && !archive.exists() {
            return RotationTarget { rotated, archive };
        }
        attempt += 1;
    }
}

/// Returns true if `candidate` looks like a rotated name or archive of `path`.
#[must_use]
pub fn is_rotated_name(path: &Path, candidate: &Path) -> bool {
    let (Some(base), Some(name)) = (
        path.file_name().and_then(|n| n.to_str()),
        candidate.file_name().and_then(|n| n.to_str()),
    ) else {
        return false;
    };
    let Some(rest) = name
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };
    rest.len() >= 14 && rest.as_bytes()[..14].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap()
    }

    #[test]
    fn stamp_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.db");

        let target = rotation_target(&path, &fixed_time(), "zst");
        assert_eq!(target.rotated, dir.path().join("app.db.20240305070809"));
        assert_eq!(target.archive, dir.path().join("app.db.20240305070809.zst"));
    }

    #[test]
    fn collision_gets_counter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.db");
        fs::write(dir.path().join("app.db.20240305070809.zst"), b"x").unwrap();
        fs::write(dir.path().join("app.db.20240305070809-1"), b"x").unwrap();

        let target = rotation_target(&path, &fixed_time(), "zst");
        assert_eq!(target.rotated, dir.path().join("app.db.20240305070809-2"));
    }

    #[test]
    fn rotated_names_recognized() {
        let path = Path::new("/logs/app.db");
        assert!(is_rotated_name(path, Path::new("/logs/app.db.20240305070809.zst")));
        assert!(is_rotated_name(path, Path::new("/logs/app.db.20240305070809-1")));
        assert!(!is_rotated_name(path, Path::new("/logs/app.db")));
        assert!(!is_rotated_name(path, Path::new("/logs/app.db-journal")));
        assert!(!is_rotated_name(path, Path::new("/logs/other.db.20240305070809")));
    }

    proptest::proptest! {
        #[test]
        fn targets_are_recognized(secs in 0i64..4_102_444_800) {
            let dir = tempdir().unwrap();
            let path = dir.path().join("app.db");
            let now = Utc.timestamp_opt(secs, 0).unwrap();

            let target = rotation_target(&path, &now, "zst");
            proptest::prop_assert!(is_rotated_name(&path, &target.rotated));
            proptest::prop_assert!(is_rotated_name(&path, &target.archive));
        }
    }
}
