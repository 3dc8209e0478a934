//! Budget assignment: the mutating entry point of the timing engine.

use crate::context::TimingContext;
use crate::delay::Delay;
use crate::ids::NetId;
use crate::propagate::{walk_paths, WalkOptions};
use crate::{
    TIMING_BUDGET_TARGET, TIMING_CHECKSUM, TIMING_NEGATIVE_BUDGET, TIMING_PORT_BUDGET,
    TIMING_RETARGET,
};
use kairos_common::{Frequency, KairosResult};
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use serde::Serialize;

/// Controls logging and frequency adaptation for [`assign_budget`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetOptions {
    /// Suppress the informational banner, per-port warnings and checksum.
    pub quiet: bool,
    /// Log every connection's budget; also re-enables per-port checks when
    /// `quiet` is set.
    pub verbose: bool,
    /// Retarget the clock to the achieved frequency instead of warning about
    /// negative budgets.
    pub auto_freq: bool,
    /// Number of slack redistribution iterations the caller intends to run.
    /// Frequency adaptation only happens when this is non-zero.
    pub slack_redist_iter: u32,
}

/// What one budget assignment found.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Clock period the budgets were computed against.
    pub period: Delay,
    /// Smallest endpoint slack.
    pub min_slack: Delay,
    /// Number of endpoint connections.
    pub endpoint_count: usize,
    /// Number of connections left with a negative budget.
    pub negative_budgets: usize,
    /// New target frequency, when automatic adaptation changed it.
    pub new_frequency: Option<Frequency>,
}

/// Annotates every connection in the design with a timing budget.
///
/// All budgets are first reset to [`Delay::MAX`], then the full
/// forward/backward walk runs against the current target frequency and the
/// resulting budgets are written back through
/// [`TimingContext::set_budget`].
pub fn assign_budget<C: TimingContext + ?Sized>(
    ctx: &mut C,
    options: &BudgetOptions,
    sink: &DiagnosticSink,
) -> KairosResult<BudgetSummary> {
    if !options.quiet {
        sink.emit(Diagnostic::note(
            TIMING_BUDGET_TARGET,
            format!(
                "Annotating ports with timing budgets for target frequency {:.2} MHz",
                ctx.target_frequency().mhz()
            ),
        ));
    }

    for idx in 0..ctx.net_count() {
        let net = NetId::from_index(idx);
        for user in 0..ctx.net_users(net).len() {
            ctx.set_budget(net, user, Delay::MAX);
        }
    }

    let walk = walk_paths(
        &*ctx,
        WalkOptions {
            update_budgets: true,
            ..WalkOptions::default()
        },
        sink,
    )?;
    for (idx, row) in walk.budgets.iter().enumerate() {
        let net = NetId::from_index(idx);
        for (user, budget) in row.iter().enumerate() {
            ctx.set_budget(net, user, *budget);
        }
    }

    let mut negative_budgets = 0;
    for idx in 0..ctx.net_count() {
        let net = NetId::from_index(idx);
        for user in ctx.net_users(net) {
            let negative = user.budget.is_negative();
            if negative {
                negative_budgets += 1;
            }
            if options.quiet && !options.verbose {
                continue;
            }
            let describe = || {
                format!(
                    "port {}.{}, connected to net '{}'",
                    ctx.cell_name(user.cell),
                    ctx.resolve(user.port),
                    ctx.net_name(net)
                )
            };
            if negative && !options.auto_freq {
                sink.emit(
                    Diagnostic::warning(
                        TIMING_NEGATIVE_BUDGET,
                        format!(
                            "{}, has negative timing budget of {:.6}ns",
                            describe(),
                            ctx.delay_ns(user.budget)
                        ),
                    )
                    .with_help("lower the target frequency or enable automatic frequency"),
                );
            } else if options.verbose {
                sink.emit(Diagnostic::note(
                    TIMING_PORT_BUDGET,
                    format!(
                        "{}, has timing budget of {:.6}ns",
                        describe(),
                        ctx.delay_ns(user.budget)
                    ),
                ));
            }
        }
    }

    let mut new_frequency = None;
    if options.auto_freq && options.slack_redist_iter > 0 {
        // An unbounded achievable frequency leaves the target untouched.
        if let Some(freq) = Frequency::from_period_ps((walk.period - walk.min_slack).as_ps()) {
            ctx.set_target_frequency(freq);
            new_frequency = Some(freq);
            if options.verbose {
                sink.emit(Diagnostic::note(
                    TIMING_RETARGET,
                    format!(
                        "minimum slack for this assign = {}, target Fmax for next update = {:.2} MHz",
                        walk.min_slack.as_ps(),
                        freq.mhz()
                    ),
                ));
            }
        }
    }

    if !options.quiet {
        sink.emit(Diagnostic::note(
            TIMING_CHECKSUM,
            format!("Checksum: 0x{:08x}", ctx.checksum()),
        ));
    }

    Ok(BudgetSummary {
        period: walk.period,
        min_slack: walk.min_slack,
        endpoint_count: walk.endpoint_count,
        negative_budgets,
        new_frequency,
    })
}
