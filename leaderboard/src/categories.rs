//! The twelve (plus one alternate) ranked AROI leaderboard categories
//! (spec §4.G).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Bandwidth,
    ConsensusWeight,
    ExitAuthority,
    GuardAuthority,
    ExitOperators,
    GuardOperators,
    MostDiverse,
    PlatformDiversity,
    NonEuLeaders,
    FrontierBuilders,
    NetworkVeterans,
    ReliabilityMasters,
    LegacyTitans,
}

/// Canonical order, matching spec §4.G's numbered list.
pub const ALL_CATEGORIES: &[Category] = &[
    Category::Bandwidth,
    Category::ConsensusWeight,
    Category::ExitAuthority,
    Category::GuardAuthority,
    Category::ExitOperators,
    Category::GuardOperators,
    Category::MostDiverse,
    Category::PlatformDiversity,
    Category::NonEuLeaders,
    Category::FrontierBuilders,
    Category::NetworkVeterans,
    Category::ReliabilityMasters,
    Category::LegacyTitans,
];

pub struct CategoryMeta {
    pub key: &'static str,
    pub title: &'static str,
    pub emoji: &'static str,
    pub tooltip: &'static str,
}

impl Category {
    pub fn meta(self) -> CategoryMeta {
        match self {
            Category::Bandwidth => CategoryMeta {
                key: "bandwidth",
                title: "Bandwidth Contributed",
                emoji: "🚀",
                tooltip: "Total observed bandwidth across all relays run by the operator.",
            },
            Category::ConsensusWeight => CategoryMeta {
                key: "consensus_weight",
                title: "Consensus Weight",
                emoji: "⚖️",
                tooltip: "Sum of consensus weight across all relays run by the operator.",
            },
            Category::ExitAuthority => CategoryMeta {
                key: "exit_authority",
                title: "Exit Authority",
                emoji: "🚪",
                tooltip: "Sum of consensus weight among the operator's exit relays.",
            },
            Category::GuardAuthority => CategoryMeta {
                key: "guard_authority",
                title: "Guard Authority",
                emoji: "🛡️",
                tooltip: "Sum of consensus weight among the operator's guard relays.",
            },
            Category::ExitOperators => CategoryMeta {
                key: "exit_operators",
                title: "Exit Operators",
                emoji: "🏃",
                tooltip: "Count of exit relays run by the operator.",
            },
            Category::GuardOperators => CategoryMeta {
                key: "guard_operators",
                title: "Guard Operators",
                emoji: "🧤",
                tooltip: "Count of guard relays run by the operator.",
            },
            Category::MostDiverse => CategoryMeta {
                key: "most_diverse",
                title: "Most Diverse Operators",
                emoji: "🌈",
                tooltip: "Composite diversity across unique ASNs, countries, platforms, and families.",
            },
            Category::PlatformDiversity => CategoryMeta {
                key: "platform_diversity",
                title: "Platform Diversity",
                emoji: "💻",
                tooltip: "Count of unique platforms used by the operator's relays.",
            },
            Category::NonEuLeaders => CategoryMeta {
                key: "non_eu_leaders",
                title: "Non-EU Leaders",
                emoji: "🌍",
                tooltip: "Total bandwidth contributed from relays outside the EU.",
            },
            Category::FrontierBuilders => CategoryMeta {
                key: "frontier_builders",
                title: "Frontier Builders",
                emoji: "🏕️",
                tooltip: "Relays placed in rare countries, weighted by country rarity.",
            },
            Category::NetworkVeterans => CategoryMeta {
                key: "network_veterans",
                title: "Network Veterans",
                emoji: "🏆",
                tooltip: "Oldest relay age multiplied by relay count.",
            },
            Category::ReliabilityMasters => CategoryMeta {
                key: "reliability_masters",
                title: "Reliability Masters",
                emoji: "💎",
                tooltip: "Unweighted mean 6-month uptime; operators need more than 25 relays.",
            },
            Category::LegacyTitans => CategoryMeta {
                key: "legacy_titans",
                title: "Legacy Titans",
                emoji: "📜",
                tooltip: "Unweighted mean 5-year uptime; operators need more than 25 relays.",
            },
        }
    }
}
