//! Human-readable formatting for metadata fields.

/// `H:MM:SS` when at least an hour long, `M:SS` otherwise.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(total) = seconds.filter(|s| *s > 0) else {
        return "Unknown".to_string();
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Compact view counts: `1.2M`, `3.4K`, or the plain number.
pub fn format_count(count: Option<u64>) -> String {
    match count.unwrap_or(0) {
        0 => "0".to_string(),
        n if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        n if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        n => n.to_string(),
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return String::new();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(None), "Unknown");
        assert_eq!(format_duration(Some(0)), "Unknown");
        assert_eq!(format_duration(Some(65)), "1:05");
        assert_eq!(format_duration(Some(3 * 3600 + 7)), "3:00:07");
    }

    #[test]
    fn counts() {
        assert_eq!(format_count(None), "0");
        assert_eq!(format_count(Some(999)), "999");
        assert_eq!(format_count(Some(1_500)), "1.5K");
        assert_eq!(format_count(Some(2_340_000)), "2.3M");
    }

    #[test]
    fn sizes() {
        assert_eq!(format_file_size(0), "");
        assert_eq!(format_file_size(512), "512.0 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
