//! Inspect command implementation.

use super::open_existing;
use logstore_core::rotation::is_rotated_name;
use serde::Serialize;
use std::path::Path;

/// Log file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Active log file path.
    pub path: String,
    /// Size on disk in bytes.
    pub file_size: u64,
    /// Size estimated from page size and page count.
    pub estimated_size: u64,
    /// Number of records.
    pub record_count: u64,
    /// Smallest record id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_id: Option<i64>,
    /// Largest record id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_id: Option<i64>,
    /// Rotated files next to the active one.
    pub rotated: Vec<RotatedFile>,
}

/// A rotated file found next to the active log.
#[derive(Debug, Serialize)]
pub struct RotatedFile {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(path)?;

    let result = InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        estimated_size: store.file_size()?,
        record_count: store.count()?,
        oldest_id: store.oldest_id()?.map(|id| id.as_i64()),
        newest_id: store.newest_id()?.map(|id| id.as_i64()),
        rotated: find_rotated(path)?,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn find_rotated(path: &Path) -> Result<Vec<RotatedFile>, Box<dyn std::error::Error>> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir,
        None => Path::new("."),
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let candidate = entry.path();
        if is_rotated_name(path, &candidate) {
            found.push(RotatedFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: entry.metadata()?.len(),
            });
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

fn print_text_output(result: &InspectResult) {
    println!("LogStore Inspection");
    println!("===================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Storage:");
    println!("  File size:      {}", format_size(result.file_size));
    println!("  Estimated size: {}", format_size(result.estimated_size));
    println!();
    println!("Records:");
    println!("  Count:  {}", result.record_count);
    match (result.oldest_id, result.newest_id) {
        (Some(oldest), Some(newest)) => println!("  Ids:    {} ..= {}", oldest, newest),
        _ => println!("  Ids:    (empty)"),
    }

    if !result.rotated.is_empty() {
        println!();
        println!("Rotated files:");
        for file in &result.rotated {
            println!("  {} ({})", file.name, format_size(file.size));
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logstore_core::LogStore;
    use tempfile::tempdir;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn rotated_files_listed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.db");
        let store = LogStore::open(&path, 1 << 20).unwrap();
        store.rotate_now().unwrap();
        store.close().unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), b"x").unwrap();

        let rotated = find_rotated(&path).unwrap();
        assert_eq!(rotated.len(), 1);
        assert!(rotated[0].name.starts_with("app.db."));
        assert!(rotated[0].name.ends_with(".zst"));
    }
}
