//! `kairos budget`: annotate every connection with a timing budget.
//!
//! Runs `max(1, slack_redistribution_iterations)` rounds of budget
//! assignment. With automatic frequency enabled, each round retargets the
//! clock to the frequency the previous round achieved.

use std::path::Path;

use kairos_common::KairosResult;
use kairos_config::ResolvedTiming;
use kairos_diagnostics::DiagnosticSink;
use kairos_netlist::Netlist;
use kairos_timing::{assign_budget, BudgetOptions, BudgetSummary, TimingContext};

use crate::pipeline::{
    load_netlist, render_diagnostics, report_failure, resolve_settings, DESIGN_LOAD_FAILED,
    TIMING_ENGINE_FAILED,
};
use crate::{BudgetArgs, GlobalArgs};

/// Runs the `kairos budget` command.
///
/// Returns exit code 0 on success, 1 if errors were reported.
pub fn run(args: &BudgetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let design = Path::new(&args.design);
    let mut timing = resolve_settings(global, design, args.freq.as_deref())?;
    if let Some(iterations) = args.iterations {
        timing.slack_redistribution_iterations = iterations;
    }
    timing.auto_frequency |= args.auto_freq;

    let sink = DiagnosticSink::new();
    let loaded = report_failure(
        &sink,
        DESIGN_LOAD_FAILED,
        load_netlist(design, &timing, &sink),
    );
    let Some(mut netlist) = loaded else {
        render_diagnostics(&sink, global);
        return Ok(1);
    };

    let outcome = report_failure(
        &sink,
        TIMING_ENGINE_FAILED,
        budget_design(&mut netlist, &timing, global.quiet, &sink),
    );
    let failed = sink.has_errors();
    render_diagnostics(&sink, global);
    let Some(summary) = outcome else {
        return Ok(1);
    };

    if let Some(output) = &args.output {
        let json = serde_json::to_string_pretty(&netlist.budgets())?;
        std::fs::write(output, json)?;
    }

    if !global.quiet {
        eprintln!(
            "   Budgeted {} connection(s), {} endpoint(s) at {}: minimum slack {} ps, {} negative budget(s)",
            netlist.connection_count(),
            summary.endpoint_count,
            netlist.target_frequency(),
            summary.min_slack.as_ps(),
            summary.negative_budgets
        );
        if let Some(output) = &args.output {
            eprintln!("   Wrote budgets to {output}");
        }
    }

    Ok(if failed { 1 } else { 0 })
}

/// Runs the configured number of budget rounds and returns the last
/// round's summary.
pub fn budget_design(
    netlist: &mut Netlist,
    timing: &ResolvedTiming,
    quiet: bool,
    sink: &DiagnosticSink,
) -> KairosResult<BudgetSummary> {
    let options = BudgetOptions {
        quiet,
        verbose: timing.verbose,
        auto_freq: timing.auto_frequency,
        slack_redist_iter: timing.slack_redistribution_iterations,
    };
    let rounds = timing.slack_redistribution_iterations.max(1);
    let mut summary = assign_budget(netlist, &options, sink)?;
    for _ in 1..rounds {
        summary = assign_budget(netlist, &options, sink)?;
    }
    Ok(summary)
}
