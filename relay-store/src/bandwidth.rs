//! Bandwidth unit formatting (spec §4.E "Bandwidth units").

use crate::types::BandwidthUnit;

/// Formats `observed_bandwidth` (bytes/second) for display.
///
/// `bits` mode converts to bits/second and divides by 1000 per step;
/// `bytes` mode stays in bytes/second and divides by 1024 per step.
pub fn format_bytes_per_second(observed_bandwidth: u64, unit: BandwidthUnit) -> String {
    match unit {
        BandwidthUnit::Bits => {
            let bits = observed_bandwidth as f64 * 8.0;
            let (value, suffix) = scale(bits, 1000.0, &["bit/s", "Kbit/s", "Mbit/s", "Gbit/s", "Tbit/s"]);
            format!("{value:.2} {suffix}")
        }
        BandwidthUnit::Bytes => {
            let bytes = observed_bandwidth as f64;
            let (value, suffix) = scale(bytes, 1024.0, &["B/s", "KB/s", "MB/s", "GB/s", "TB/s"]);
            format!("{value:.2} {suffix}")
        }
    }
}

fn scale(mut value: f64, divisor: f64, suffixes: &[&'static str]) -> (f64, &'static str) {
    let mut idx = 0;
    while value >= divisor && idx < suffixes.len() - 1 {
        value /= divisor;
        idx += 1;
    }
    (value, suffixes[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_mode_matches_spec_example() {
        assert_eq!(format_bytes_per_second(1_500_000, BandwidthUnit::Bits), "12.00 Mbit/s");
    }

    #[test]
    fn bytes_mode_matches_spec_example() {
        assert_eq!(format_bytes_per_second(1_500_000, BandwidthUnit::Bytes), "1.43 MB/s");
    }

    #[test]
    fn zero_bandwidth_formats_without_panicking() {
        assert_eq!(format_bytes_per_second(0, BandwidthUnit::Bits), "0.00 bit/s");
    }
}
