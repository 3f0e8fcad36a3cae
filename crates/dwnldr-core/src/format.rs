//! Human-readable text for progress columns: percentage, rate, elapsed time.

use std::time::Duration;

const RATE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// `0.4567` → `"45.7%"`. The fraction is clamped to `[0, 1]`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction.clamp(0.0, 1.0) * 100.0)
}

/// Bytes per second as `"512B/s"`, `"1.25MiB/s"`.
pub fn format_rate(bytes_per_sec: f64) -> String {
    let mut v = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0)
    } else {
        0.0
    };
    let mut u = 0usize;
    while v >= 1024.0 && u + 1 < RATE_UNITS.len() {
        v /= 1024.0;
        u += 1;
    }
    if u == 0 {
        format!("{:.0}{}/s", v, RATE_UNITS[u])
    } else {
        format!("{:.2}{}/s", v, RATE_UNITS[u])
    }
}

/// Compact elapsed time: `"4.2s"`, `"3m07s"`, `"1h02m"`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{}s", secs, d.subsec_millis() / 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(1.7), "100.0%");
    }

    #[test]
    fn rate_units() {
        assert_eq!(format_rate(0.0), "0B/s");
        assert_eq!(format_rate(512.0), "512B/s");
        assert_eq!(format_rate(2048.0), "2.00KiB/s");
        assert_eq!(format_rate(1.5 * 1024.0 * 1024.0), "1.50MiB/s");
        assert_eq!(format_rate(f64::NAN), "0B/s");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(4_250)), "4.2s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m07s");
        assert_eq!(format_duration(Duration::from_secs(3_720)), "1h02m");
    }
}
