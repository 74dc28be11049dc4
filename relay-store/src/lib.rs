pub mod aroi;
pub mod bandwidth;
pub mod errors;
pub mod joiner;
pub mod operators;
pub mod parser;
pub mod types;

pub use errors::RelayStoreError;
pub use types::{BandwidthUnit, CategoryBuckets, NetworkTotals, Operator, Relay, RelayStore};

/// Runs the full pipeline: parse details, join uptime/bandwidth, flag
/// outliers, build operator aggregates (spec §4.E + §4.F).
pub fn build_store(
    details_body: &[u8],
    uptime_body: Option<&[u8]>,
    bandwidth_body: Option<&[u8]>,
    unit: BandwidthUnit,
) -> Result<RelayStore, RelayStoreError> {
    let mut store = parser::build_relay_store(details_body, unit)?;

    joiner::join_uptime(&mut store.relays, uptime_body);
    joiner::join_bandwidth(&mut store.relays, bandwidth_body);
    joiner::flag_period_outliers(&mut store.relays);
    joiner::flag_uptime_outliers_by_flag(&mut store.relays);

    store.operators = operators::build_operators(&store.relays);

    Ok(store)
}
