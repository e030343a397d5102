//! Formatting helpers for presenting extracted metadata.

use chrono::{DateTime, Utc};

/// Format a byte count for display (1024-based, one decimal place).
pub fn format_file_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f < KIB {
        format!("{bytes} B")
    } else if bytes_f < MIB {
        format!("{:.1} KB", bytes_f / KIB)
    } else if bytes_f < GIB {
        format!("{:.1} MB", bytes_f / MIB)
    } else {
        format!("{:.1} GB", bytes_f / GIB)
    }
}

/// Format a millisecond epoch timestamp as a short date, e.g. `Mar 4, 2024`.
///
/// Out-of-range timestamps fall back to the raw number.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes_scale_by_1024() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn timestamps_render_as_short_dates() {
        // 2024-03-04T00:00:00Z
        assert_eq!(format_timestamp(1_709_510_400_000), "Mar 4, 2024");
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_raw() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
