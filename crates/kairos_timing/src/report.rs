//! Timing report types and their text rendering.

use crate::context::Loc;
use crate::delay::Delay;
use kairos_common::Frequency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The result of a read-only timing analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    /// The clock target the analysis ran against.
    pub target_frequency: Frequency,
    /// Clock period derived from the target.
    pub period: Delay,
    /// Smallest endpoint slack, or the period when there are no endpoints.
    pub min_slack: Delay,
    /// Highest frequency the worst path allows; `None` when the path delay is
    /// not positive and the frequency is unbounded.
    pub achieved_frequency: Option<Frequency>,
    /// Number of endpoint connections analysed.
    pub endpoint_count: usize,
    /// The worst path, when requested.
    pub critical_path: Option<CriticalPath>,
    /// Endpoint slack distribution, when requested.
    pub histogram: Option<SlackHistogram>,
}

impl TimingReport {
    /// Returns `true` when no endpoint has negative slack.
    pub fn met(&self) -> bool {
        !self.min_slack.is_negative()
    }

    /// The `estimated Fmax` summary line.
    pub fn fmax_line(&self) -> String {
        match self.achieved_frequency {
            Some(freq) => format!("estimated Fmax = {:.2} MHz", freq.mhz()),
            None => "estimated Fmax = unbounded".to_string(),
        }
    }

    /// Renders the full text report: critical path (if present), Fmax line
    /// and slack histogram (if present and non-empty).
    pub fn render(&self, histogram_bins: u32, histogram_width: u32) -> String {
        let mut out = String::new();
        if let Some(path) = &self.critical_path {
            out.push_str(&path.render());
            out.push('\n');
        }
        out.push_str(&self.fmax_line());
        out.push('\n');
        if let Some(hist) = &self.histogram {
            let lines = hist.render(histogram_bins, histogram_width);
            if !lines.is_empty() {
                out.push('\n');
                for line in lines {
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// One connection on the critical path, with the cell arc leading into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    /// Driving cell name.
    pub source_cell: String,
    /// Driving port name.
    pub source_port: String,
    /// Delay through the driving cell from the previous hop's sink port (or
    /// from its clock for the first hop).
    pub cell_delay: Delay,
    /// Net name.
    pub net: String,
    /// Routed delay of the connection.
    pub net_delay: Delay,
    /// The connection's current budget.
    pub budget: Delay,
    /// Location of the driving cell.
    pub driver_loc: Loc,
    /// Location of the sink cell.
    pub sink_loc: Loc,
    /// Sink cell name.
    pub sink_cell: String,
    /// Sink port name.
    pub sink_port: String,
}

/// The path holding the minimum endpoint slack, source first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Connections along the path.
    pub elements: Vec<PathElement>,
}

impl CriticalPath {
    /// Sum of every cell and net delay on the path.
    pub fn total_delay(&self) -> Delay {
        self.elements
            .iter()
            .fold(Delay::ZERO, |acc, e| acc + e.cell_delay + e.net_delay)
    }

    /// Renders the path as `curr total` columns in picoseconds.
    pub fn render(&self) -> String {
        if self.elements.is_empty() {
            return "Design contains no timing paths\n".to_string();
        }
        let mut out = String::from("Critical path report:\ncurr total\n");
        let mut total = Delay::ZERO;
        for e in &self.elements {
            total += e.cell_delay;
            out.push_str(&format!(
                "{:4} {:4}  Source {}.{}\n",
                e.cell_delay.as_ps(),
                total.as_ps(),
                e.source_cell,
                e.source_port
            ));
            total += e.net_delay;
            out.push_str(&format!(
                "{:4} {:4}    Net {} budget {} ({},{}) -> ({},{})\n",
                e.net_delay.as_ps(),
                total.as_ps(),
                e.net,
                e.budget.as_ps(),
                e.driver_loc.x,
                e.driver_loc.y,
                e.sink_loc.x,
                e.sink_loc.y
            ));
            out.push_str(&format!("                Sink {}.{}\n", e.sink_cell, e.sink_port));
        }
        out
    }
}

/// Endpoint counts keyed by slack in picoseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackHistogram {
    /// Endpoint count per slack value.
    pub buckets: BTreeMap<i64, u32>,
}

impl SlackHistogram {
    /// Total number of endpoints recorded.
    pub fn endpoint_count(&self) -> u64 {
        self.buckets.values().map(|c| u64::from(*c)).sum()
    }

    /// Groups the buckets into `num_bins` equal ranges (plus one for the
    /// maximum) and renders one bar per range, at most `width` characters
    /// wide. Returns no lines for an empty histogram.
    pub fn render(&self, num_bins: u32, width: u32) -> Vec<String> {
        let (Some((&min_key, _)), Some((&max_key, _))) =
            (self.buckets.first_key_value(), self.buckets.last_key_value())
        else {
            return Vec::new();
        };
        // Keys can sit near both ends of the i64 range; work in i128.
        let num_bins = i128::from(num_bins.max(1));
        let min_key = i128::from(min_key);
        let span = i128::from(max_key) - min_key;
        let bin_size = (span / num_bins).max(1);
        // Truncated bin sizes can need more than `num_bins + 1` bins to reach
        // the maximum key.
        let bin_count = num_bins.max(span / bin_size) + 1;

        let mut bins = vec![0u64; bin_count as usize];
        let last = bins.len() - 1;
        for (key, count) in &self.buckets {
            let idx = ((i128::from(*key) - min_key) / bin_size) as usize;
            bins[idx.min(last)] += u64::from(*count);
        }
        let max_freq = bins.iter().copied().max().unwrap_or(0).max(1);
        let bar_width = u64::from(width.max(1)).min(max_freq);

        let mut lines = Vec::with_capacity(bins.len() + 2);
        lines.push("Slack histogram:".to_string());
        lines.push(format!(
            " legend: * represents {} endpoint(s)",
            max_freq / bar_width
        ));
        for (i, count) in bins.iter().enumerate() {
            let lo = min_key + bin_size * i as i128;
            let hi = lo + bin_size;
            let bar = "*".repeat((count * bar_width / max_freq) as usize);
            lines.push(format!("{lo:6} < ps < {hi:6} |{bar}"));
        }
        lines
    }
}
