//! Command-line interface (spec §6.1) and environment switches (§6.2).

use clap::Parser;
use std::path::PathBuf;

const DEFAULT_ONIONOO_DETAILS_URL: &str = "https://onionoo.torproject.org/details";
const DEFAULT_ONIONOO_UPTIME_URL: &str = "https://onionoo.torproject.org/uptime";
const DEFAULT_ONIONOO_BANDWIDTH_URL: &str = "https://onionoo.torproject.org/bandwidth";

/// No CLI flag exists for this (spec §6.1 table is exhaustive); the source
/// is fixed rather than configurable, same as the other four sources.
pub const DEFAULT_COLLECTOR_CONSENSUS_URL: &str =
    "https://collector.torproject.org/recent/relay-descriptors/consensus-votes/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BandwidthUnitArg {
    Bits,
    Bytes,
}

impl From<BandwidthUnitArg> for relay_store::BandwidthUnit {
    fn from(value: BandwidthUnitArg) -> Self {
        match value {
            BandwidthUnitArg::Bits => relay_store::BandwidthUnit::Bits,
            BandwidthUnitArg::Bytes => relay_store::BandwidthUnit::Bytes,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sitegen", about = "Generates the Tor-relay metrics portal static site")]
pub struct Cli {
    #[arg(long, default_value = "./www")]
    pub out: PathBuf,

    #[arg(long, value_enum, default_value = "bits")]
    pub display_bandwidth_units: BandwidthUnitArg,

    #[arg(short, long)]
    pub progress: bool,

    #[arg(long, default_value = DEFAULT_ONIONOO_DETAILS_URL)]
    pub onionoo_details_url: String,

    #[arg(long, default_value = DEFAULT_ONIONOO_UPTIME_URL)]
    pub onionoo_uptime_url: String,

    #[arg(long, default_value = DEFAULT_ONIONOO_BANDWIDTH_URL)]
    pub onionoo_bandwidth_url: String,
}

/// `ALLIUM_COLLECTOR_DIAGNOSTICS` (spec §6.2), default `true`.
pub fn collector_diagnostics_enabled() -> bool {
    match std::env::var("ALLIUM_COLLECTOR_DIAGNOSTICS") {
        Ok(value) => value != "false",
        Err(_) => true,
    }
}
