//! Resolution of raw configuration strings into typed timing settings.

use crate::error::ConfigError;
use crate::types::{BudgetOverride, KairosConfig};
use kairos_common::Frequency;

/// Timing settings with the target frequency parsed and every value validated.
#[derive(Debug, Clone)]
pub struct ResolvedTiming {
    /// Target clock frequency.
    pub target_frequency: Frequency,
    /// Retarget the clock after each budgeting round.
    pub auto_frequency: bool,
    /// Number of slack redistribution rounds.
    pub slack_redistribution_iterations: u32,
    /// Log every connection budget.
    pub verbose: bool,
    /// Slack histogram bin count.
    pub histogram_bins: u32,
    /// Slack histogram maximum bar width.
    pub histogram_width: u32,
    /// Connection budget overrides.
    pub overrides: Vec<BudgetOverride>,
}

/// Parses and validates the timing-related parts of a configuration.
pub fn resolve_timing(config: &KairosConfig) -> Result<ResolvedTiming, ConfigError> {
    let target_frequency: Frequency = config.timing.target_frequency.parse()?;

    if config.report.histogram_bins == 0 {
        return Err(ConfigError::ValidationError(
            "report.histogram_bins must be at least 1".to_string(),
        ));
    }
    if config.report.histogram_width == 0 {
        return Err(ConfigError::ValidationError(
            "report.histogram_width must be at least 1".to_string(),
        ));
    }

    for (i, ov) in config.overrides.iter().enumerate() {
        for (field, value) in [("net", &ov.net), ("cell", &ov.cell), ("port", &ov.port)] {
            if value.is_empty() {
                return Err(ConfigError::MissingField(format!("override[{i}].{field}")));
            }
        }
        if ov.delay < 0 {
            return Err(ConfigError::ValidationError(format!(
                "override[{i}] on {}.{} has negative delay {}ps",
                ov.cell, ov.port, ov.delay
            )));
        }
    }

    Ok(ResolvedTiming {
        target_frequency,
        auto_frequency: config.timing.auto_frequency,
        slack_redistribution_iterations: config.timing.slack_redistribution_iterations,
        verbose: config.timing.verbose,
        histogram_bins: config.report.histogram_bins,
        histogram_width: config.report.histogram_width,
        overrides: config.overrides.clone(),
    })
}
