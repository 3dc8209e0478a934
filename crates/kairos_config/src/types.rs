//! Configuration types deserialized from `kairos.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// Default target clock frequency when none is configured.
pub const DEFAULT_TARGET_FREQUENCY: &str = "12MHz";

/// The top-level configuration parsed from `kairos.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct KairosConfig {
    /// Clock target and budgeting behaviour.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Analysis report formatting.
    #[serde(default)]
    pub report: ReportConfig,
    /// Fixed delays on individual connections (`[[override]]` tables).
    #[serde(default, rename = "override")]
    pub overrides: Vec<BudgetOverride>,
}

/// The `[timing]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Target clock frequency (e.g. `"12MHz"`, `"100MHz"`).
    pub target_frequency: String,
    /// Retarget the clock to the achieved frequency after each budgeting round.
    pub auto_frequency: bool,
    /// Number of slack redistribution rounds; automatic retargeting only
    /// happens when this is non-zero.
    pub slack_redistribution_iterations: u32,
    /// Log the budget of every connection.
    pub verbose: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            target_frequency: DEFAULT_TARGET_FREQUENCY.to_string(),
            auto_frequency: false,
            slack_redistribution_iterations: 0,
            verbose: false,
        }
    }
}

/// The `[report]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of slack histogram bins.
    pub histogram_bins: u32,
    /// Maximum bar width of the slack histogram, in characters.
    pub histogram_width: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            histogram_width: 60,
        }
    }
}

/// A user-specified fixed delay on one connection.
///
/// The connection is the sink port `cell.port` on net `net`. While an
/// override is present, the connection receives no share of the path slack.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BudgetOverride {
    /// Net name.
    pub net: String,
    /// Sink cell name.
    pub cell: String,
    /// Sink port name.
    pub port: String,
    /// Fixed delay in picoseconds. Accepts an integer (ps) or a string with a
    /// `ps`, `ns` or `us` suffix.
    #[serde(deserialize_with = "deserialize_delay_ps")]
    pub delay: i64,
}

/// Deserializes a delay given either as integer picoseconds or as a string
/// with a unit suffix (`"250ps"`, `"1.5ns"`, `"0.002us"`).
fn deserialize_delay_ps<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct DelayVisitor;

    impl<'de> Visitor<'de> for DelayVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("an integer number of picoseconds or a string like \"1.5ns\"")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("delay {v}ps is out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_delay_ps(v).ok_or_else(|| E::custom(format!("invalid delay '{v}'")))
        }
    }

    deserializer.deserialize_any(DelayVisitor)
}

/// Parses `"250ps"`, `"1.5ns"` or `"0.002us"` into whole picoseconds.
pub fn parse_delay_ps(s: &str) -> Option<i64> {
    let s = s.trim().to_ascii_lowercase();
    let (num, scale) = if let Some(n) = s.strip_suffix("ps") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("ns") {
        (n, 1_000.0)
    } else if let Some(n) = s.strip_suffix("us") {
        (n, 1_000_000.0)
    } else {
        return None;
    };
    let val: f64 = num.trim().parse().ok()?;
    if !val.is_finite() {
        return None;
    }
    Some((val * scale).round() as i64)
}
