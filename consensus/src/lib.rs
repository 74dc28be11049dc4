pub mod date;
pub mod diagnostics;
pub mod eligibility;
pub mod fingerprint;
pub mod majority;
pub mod monitor;
pub mod thresholds;
pub mod votes;

pub use diagnostics::{build_relay_diagnostics, RelayDiagnostics};
pub use majority::{consensus_status, majority_required, ConsensusStatus};
pub use monitor::{monitor_authorities, AuthorityMonitorSummary, AuthorityProbe, NullProbe};
pub use votes::{parse_votes, AuthorityVote};
