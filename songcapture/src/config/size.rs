//! Human-readable byte sizes.

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Parses sizes like `512`, `64KB`, `64 MB`, `1.5GB`.
///
/// Units are binary (1 KB = 1024 bytes) and case-insensitive. A bare number
/// is bytes.
pub fn parse_size(input: &str) -> Option<usize> {
    let s = input.trim().to_ascii_uppercase();
    if s.is_empty() {
        return None;
    }

    let (number, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, GB)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, MB)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, KB)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    let number = number.trim();
    if let Ok(whole) = number.parse::<usize>() {
        return whole.checked_mul(multiplier);
    }

    let value: f64 = number.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let bytes = value * multiplier as f64;
    if bytes > usize::MAX as f64 {
        return None;
    }
    Some(bytes.round() as usize)
}

/// Formats a byte count with the largest unit that keeps it at least 1.
pub fn format_size(bytes: usize) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
