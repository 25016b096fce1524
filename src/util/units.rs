//! Units formatting and conversion utilities

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Render a byte count for log output, scaled to the largest binary unit
/// that keeps the value at or above 1
///
/// # Examples
/// ```
/// use stresscraft::util::units::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(536870912), "512.0 MiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const SCALED: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if (bytes as f64) < KIB {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / KIB;
    let mut unit = SCALED[0];
    for next in &SCALED[1..] {
        if value < KIB {
            break;
        }
        value /= KIB;
        unit = next;
    }
    format!("{:.1} {}", value, unit)
}

/// Throughput in MiB/s for `bytes` written over `duration`
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use stresscraft::util::units::calculate_throughput_mbps;
///
/// let throughput = calculate_throughput_mbps(2 * 1048576, Duration::from_secs(1));
/// assert!((throughput - 2.0).abs() < 0.01);
/// ```
pub fn calculate_throughput_mbps(bytes: u64, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    (bytes as f64 / MIB) / duration.as_secs_f64()
}

/// Format a MiB/s value with a fitting unit
pub fn format_throughput(mbps: f64) -> String {
    if mbps >= 1024.0 {
        format!("{:.1} GiB/s", mbps / 1024.0)
    } else if mbps >= 1.0 {
        format!("{:.1} MiB/s", mbps)
    } else {
        format!("{:.1} KiB/s", mbps * 1024.0)
    }
}
