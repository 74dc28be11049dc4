//! Per-flag eligibility checks against an authority's thresholds (spec
//! §4.H "Per-flag eligibility"), grounded in `test_flag_thresholds.py`.

use crate::thresholds::{FAST_BW_GUARANTEE, FlagThresholds};

#[derive(Debug, Clone, Copy, Default)]
pub struct GuardEligibility {
    pub wfu_met: bool,
    pub tk_met: bool,
    pub bw_meets_guarantee: bool,
    pub bw_in_top25: bool,
    pub bw_eligible: bool,
    pub eligible: bool,
}

pub fn check_guard_eligibility(
    wfu: f64,
    tk: u64,
    bandwidth: u64,
    thresholds: &FlagThresholds,
    bw_top25_threshold: Option<u64>,
) -> GuardEligibility {
    let wfu_met = wfu >= thresholds.guard_wfu;
    let tk_met = tk >= thresholds.guard_tk;
    let bw_meets_guarantee = bandwidth >= thresholds.guard_bw_inc_exits;
    let bw_in_top25 = bw_top25_threshold.is_some_and(|threshold| bandwidth >= threshold);
    let bw_eligible = bw_meets_guarantee || bw_in_top25;
    GuardEligibility {
        wfu_met,
        tk_met,
        bw_meets_guarantee,
        bw_in_top25,
        bw_eligible,
        eligible: wfu_met && tk_met && bw_eligible,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HsdirEligibility {
    pub wfu_met: bool,
    pub tk_met: bool,
    pub eligible: bool,
}

pub fn check_hsdir_eligibility(wfu: f64, tk: u64, thresholds: &FlagThresholds) -> HsdirEligibility {
    let wfu_met = wfu >= thresholds.hsdir_wfu;
    let tk_met = tk >= thresholds.hsdir_tk;
    HsdirEligibility { wfu_met, tk_met, eligible: wfu_met && tk_met }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FastEligibility {
    pub meets_guarantee: bool,
    pub meets_threshold: bool,
    pub eligible: bool,
}

pub fn check_fast_eligibility(bandwidth: u64, fast_threshold: Option<u64>) -> FastEligibility {
    let meets_guarantee = bandwidth >= FAST_BW_GUARANTEE;
    let meets_threshold = fast_threshold.is_some_and(|threshold| bandwidth >= threshold);
    FastEligibility {
        meets_guarantee,
        meets_threshold,
        eligible: meets_guarantee || meets_threshold,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StableEligibility {
    pub uptime_met: bool,
    pub mtbf_met: bool,
    pub eligible: bool,
}

pub fn check_stable_eligibility(
    uptime: u64,
    mtbf: u64,
    uptime_threshold: u64,
    mtbf_threshold: u64,
) -> StableEligibility {
    let uptime_met = uptime_threshold > 0 && uptime >= uptime_threshold;
    let mtbf_met = mtbf_threshold > 0 && mtbf >= mtbf_threshold;
    StableEligibility { uptime_met, mtbf_met, eligible: uptime_met || mtbf_met }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_thresholds() -> FlagThresholds {
        FlagThresholds::from_raw(&std::collections::HashMap::new())
    }

    #[test]
    fn guard_eligible_relay() {
        let r = check_guard_eligibility(0.99, 10 * 86400, 3_000_000, &default_thresholds(), None);
        assert!(r.eligible);
        assert!(r.wfu_met && r.tk_met && r.bw_meets_guarantee);
    }

    #[test]
    fn guard_ineligible_low_wfu() {
        let r = check_guard_eligibility(0.90, 10 * 86400, 3_000_000, &default_thresholds(), None);
        assert!(!r.eligible);
        assert!(!r.wfu_met);
    }

    #[test]
    fn guard_eligible_via_top25() {
        let r = check_guard_eligibility(
            0.99,
            10 * 86400,
            1_500_000,
            &default_thresholds(),
            Some(1_000_000),
        );
        assert!(!r.bw_meets_guarantee);
        assert!(r.bw_in_top25);
        assert!(r.eligible);
    }

    #[test]
    fn guard_exactly_at_bw_guarantee_is_met() {
        let r = check_guard_eligibility(0.99, 10 * 86400, 2_000_000, &default_thresholds(), None);
        assert!(r.bw_meets_guarantee);
        assert!(r.eligible);
    }

    #[test]
    fn hsdir_exactly_at_default_tk() {
        let r = check_hsdir_eligibility(0.99, 25 * 3600, &default_thresholds());
        assert!(r.tk_met);
        assert!(r.eligible);
    }

    #[test]
    fn hsdir_just_below_default_tk() {
        let r = check_hsdir_eligibility(0.99, 25 * 3600 - 1, &default_thresholds());
        assert!(!r.tk_met);
        assert!(!r.eligible);
    }

    #[test]
    fn fast_eligible_via_guarantee() {
        let r = check_fast_eligibility(150_000, None);
        assert!(r.eligible && r.meets_guarantee);
    }

    #[test]
    fn fast_eligible_via_threshold() {
        let r = check_fast_eligibility(80_000, Some(50_000));
        assert!(r.eligible);
        assert!(!r.meets_guarantee);
        assert!(r.meets_threshold);
    }

    #[test]
    fn stable_eligible_via_uptime_only() {
        let r = check_stable_eligibility(100_000, 0, 50_000, 100_000);
        assert!(r.eligible);
        assert!(r.uptime_met && !r.mtbf_met);
    }

    #[test]
    fn stable_zero_thresholds_nothing_met() {
        let r = check_stable_eligibility(0, 0, 0, 0);
        assert!(!r.eligible);
    }
}
