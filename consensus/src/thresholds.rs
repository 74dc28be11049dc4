//! Per-authority flag-threshold constants and parsing (spec §4.H).
//!
//! Grounded in `flag_thresholds.py`'s test suite: the constants and
//! rounding behavior below are chosen to match it exactly.

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * 60;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
pub const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

pub const GUARD_BW_GUARANTEE: u64 = 2_000_000;
pub const GUARD_TK_DEFAULT: u64 = 8 * SECONDS_PER_DAY;
pub const GUARD_WFU_DEFAULT: f64 = 0.98;
pub const HSDIR_TK_DEFAULT: u64 = 25 * SECONDS_PER_HOUR;
pub const HSDIR_WFU_DEFAULT: f64 = 0.98;
pub const FAST_BW_GUARANTEE: u64 = 100_000;

/// One authority's published flag-threshold table (spec §4.H table).
#[derive(Debug, Clone, Default)]
pub struct FlagThresholds {
    pub stable_uptime: Option<u64>,
    pub stable_mtbf: Option<u64>,
    pub fast_speed: Option<u64>,
    pub guard_wfu: f64,
    pub guard_tk: u64,
    pub guard_bw_inc_exits: u64,
    pub hsdir_wfu: f64,
    pub hsdir_tk: u64,
}

impl FlagThresholds {
    /// Builds a table from raw `flag-thresholds` key/value pairs, applying
    /// spec-mandated defaults for any key that is absent.
    pub fn from_raw(raw: &std::collections::HashMap<String, String>) -> Self {
        FlagThresholds {
            stable_uptime: raw.get("stable-uptime").and_then(|v| v.parse().ok()),
            stable_mtbf: raw.get("stable-mtbf").and_then(|v| v.parse().ok()),
            fast_speed: raw.get("fast-speed").and_then(|v| v.parse().ok()),
            guard_wfu: raw
                .get("guard-wfu")
                .and_then(|v| parse_wfu_threshold(v))
                .unwrap_or(GUARD_WFU_DEFAULT),
            guard_tk: raw
                .get("guard-tk")
                .and_then(|v| v.parse().ok())
                .unwrap_or(GUARD_TK_DEFAULT),
            guard_bw_inc_exits: raw
                .get("guard-bw-inc-exits")
                .and_then(|v| v.parse().ok())
                .unwrap_or(GUARD_BW_GUARANTEE),
            hsdir_wfu: raw
                .get("hsdir-wfu")
                .and_then(|v| parse_wfu_threshold(v))
                .unwrap_or(HSDIR_WFU_DEFAULT),
            hsdir_tk: raw
                .get("hsdir-tk")
                .and_then(|v| v.parse().ok())
                .unwrap_or(HSDIR_TK_DEFAULT),
        }
    }
}

/// Parses a WFU threshold expressed either as `"98%"` or as a bare fraction
/// string like `"0.98"`. Returns `None` for unparsable input.
pub fn parse_wfu_threshold(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(percent) = trimmed.strip_suffix('%') {
        return percent.trim().parse::<f64>().ok().map(|v| v / 100.0);
    }
    trimmed.parse::<f64>().ok()
}

pub fn format_time_as_days(seconds: Option<f64>, decimals: usize) -> String {
    match seconds {
        None => "N/A".to_string(),
        Some(s) => format!("{:.*}d", decimals, s / SECONDS_PER_DAY as f64),
    }
}

pub fn format_wfu_as_percent(wfu: Option<f64>, decimals: usize) -> String {
    match wfu {
        None => "N/A".to_string(),
        Some(w) => format!("{:.*}%", decimals, w * 100.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_dir_spec() {
        assert_eq!(GUARD_TK_DEFAULT, 691_200);
        assert_eq!(HSDIR_TK_DEFAULT, 90_000);
        assert_eq!(GUARD_BW_GUARANTEE, 2_000_000);
        assert_eq!(FAST_BW_GUARANTEE, 100_000);
    }

    #[test]
    fn parses_percent_and_fraction() {
        assert_eq!(parse_wfu_threshold("98%"), Some(0.98));
        assert_eq!(parse_wfu_threshold("0.98"), Some(0.98));
        assert_eq!(parse_wfu_threshold("  98%  "), Some(0.98));
        assert_eq!(parse_wfu_threshold(""), None);
        assert_eq!(parse_wfu_threshold("invalid"), None);
    }

    #[test]
    fn formats_time_as_days() {
        assert_eq!(format_time_as_days(Some(SECONDS_PER_DAY as f64), 1), "1.0d");
        assert_eq!(format_time_as_days(Some(25.0 * 3600.0), 1), "1.0d");
        assert_eq!(format_time_as_days(None, 1), "N/A");
    }

    #[test]
    fn formats_wfu_as_percent() {
        assert_eq!(format_wfu_as_percent(Some(0.98), 1), "98.0%");
        assert_eq!(format_wfu_as_percent(Some(0.98765), 2), "98.77%");
        assert_eq!(format_wfu_as_percent(None, 1), "N/A");
    }

    #[test]
    fn default_thresholds_match_spec() {
        let thresholds = FlagThresholds::from_raw(&std::collections::HashMap::new());
        assert_eq!(thresholds.guard_wfu, GUARD_WFU_DEFAULT);
        assert_eq!(thresholds.guard_tk, GUARD_TK_DEFAULT);
        assert_eq!(thresholds.hsdir_wfu, HSDIR_WFU_DEFAULT);
        assert_eq!(thresholds.hsdir_tk, HSDIR_TK_DEFAULT);
    }

    #[test]
    fn custom_thresholds_override_defaults() {
        let mut raw = std::collections::HashMap::new();
        raw.insert("guard-wfu".to_string(), "95%".to_string());
        raw.insert("guard-tk".to_string(), "500000".to_string());
        let thresholds = FlagThresholds::from_raw(&raw);
        assert_eq!(thresholds.guard_wfu, 0.95);
        assert_eq!(thresholds.guard_tk, 500_000);
    }
}
