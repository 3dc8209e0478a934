//! Read-only timing analysis.

use crate::context::TimingContext;
use crate::delay::Delay;
use crate::propagate::{walk_paths, PathHop, WalkOptions};
use crate::report::{CriticalPath, PathElement, SlackHistogram, TimingReport};
use crate::{TIMING_FMAX, TIMING_NO_PATHS};
use kairos_common::{Frequency, InternalError, KairosResult};
use kairos_diagnostics::{Diagnostic, DiagnosticSink};

/// Which optional sections [`timing_analysis`] should produce.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalysisOptions {
    /// Record the endpoint slack histogram.
    pub print_histogram: bool,
    /// Record the critical path.
    pub print_path: bool,
}

/// Estimates the achievable clock frequency without touching any budget.
///
/// Emits the `estimated Fmax` line as a note and returns the full report for
/// the caller to render.
pub fn timing_analysis<C: TimingContext + ?Sized>(
    ctx: &C,
    options: &AnalysisOptions,
    sink: &DiagnosticSink,
) -> KairosResult<TimingReport> {
    let walk = walk_paths(
        ctx,
        WalkOptions {
            update_budgets: false,
            track_path: options.print_path,
            track_histogram: options.print_histogram,
        },
        sink,
    )?;

    let critical_path = if options.print_path {
        let path = describe_path(ctx, &walk.critical_path)?;
        if path.elements.is_empty() {
            sink.emit(Diagnostic::note(
                TIMING_NO_PATHS,
                "Design contains no timing paths",
            ));
        }
        Some(path)
    } else {
        None
    };

    let report = TimingReport {
        target_frequency: ctx.target_frequency(),
        period: walk.period,
        min_slack: walk.min_slack,
        achieved_frequency: Frequency::from_period_ps((walk.period - walk.min_slack).as_ps()),
        endpoint_count: walk.endpoint_count,
        critical_path,
        histogram: walk.histogram.map(|buckets| SlackHistogram { buckets }),
    };
    sink.emit(Diagnostic::note(TIMING_FMAX, report.fmax_line()));
    Ok(report)
}

/// Resolves path hops into named, located report elements.
fn describe_path<C: TimingContext + ?Sized>(
    ctx: &C,
    hops: &[PathHop],
) -> KairosResult<CriticalPath> {
    let mut elements = Vec::with_capacity(hops.len());
    let mut last_port = None;

    for (i, hop) in hops.iter().enumerate() {
        let Some(driver) = ctx.net_driver(hop.net) else {
            return Err(InternalError::new(format!(
                "critical path net '{}' has no driver",
                ctx.net_name(hop.net)
            )));
        };
        let Some(user) = ctx.net_users(hop.net).get(hop.user).copied() else {
            return Err(InternalError::new(format!(
                "critical path refers to missing user {} of net '{}'",
                hop.user,
                ctx.net_name(hop.net)
            )));
        };
        if i == 0 {
            last_port = ctx.port_clock(driver.cell, driver.port);
        }
        let cell_delay = last_port
            .and_then(|from| ctx.cell_delay(driver.cell, from, driver.port))
            .map(|d| d.max_delay())
            .unwrap_or(Delay::ZERO);

        elements.push(PathElement {
            source_cell: ctx.cell_name(driver.cell).to_string(),
            source_port: ctx.resolve(driver.port).to_string(),
            cell_delay,
            net: ctx.net_name(hop.net).to_string(),
            net_delay: ctx.route_delay(hop.net, hop.user),
            budget: user.budget,
            driver_loc: ctx.cell_location(driver.cell),
            sink_loc: ctx.cell_location(user.cell),
            sink_cell: ctx.cell_name(user.cell).to_string(),
            sink_port: ctx.resolve(user.port).to_string(),
        });
        last_port = Some(user.port);
    }

    Ok(CriticalPath { elements })
}
