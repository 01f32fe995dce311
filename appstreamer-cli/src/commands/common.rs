//! Formatting helpers shared across CLI commands.

use appstreamer::VersionEntry;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size using binary multiples, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// `YYYY-MM-DD HH:MM:SS  <version>`, marking the live entry.
pub fn format_version(entry: &VersionEntry) -> String {
    let line = format!(
        "{}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.build_version
    );
    if entry.is_live() {
        format!("{}  (live)", line)
    } else {
        line
    }
}
