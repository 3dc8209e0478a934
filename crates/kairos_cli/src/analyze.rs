//! `kairos analyze`: critical path, estimated Fmax and slack histogram.
//!
//! Budgets are assigned quietly first so the critical path report shows
//! the budget of each connection it lists.

use std::path::Path;

use kairos_diagnostics::DiagnosticSink;
use kairos_timing::{assign_budget, timing_analysis, AnalysisOptions, BudgetOptions};

use crate::pipeline::{
    load_netlist, render_diagnostics, report_failure, resolve_settings, DESIGN_LOAD_FAILED,
    TIMING_ENGINE_FAILED,
};
use crate::{AnalyzeArgs, GlobalArgs, ReportFormat};

/// Runs the `kairos analyze` command.
///
/// Returns exit code 0 on success, 1 if errors were reported.
pub fn run(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let design = Path::new(&args.design);
    let timing = resolve_settings(global, design, args.freq.as_deref())?;

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

    let quiet_budget = BudgetOptions {
        quiet: true,
        ..BudgetOptions::default()
    };
    let analysed = assign_budget(&mut netlist, &quiet_budget, &sink).and_then(|_| {
        timing_analysis(
            &netlist,
            &AnalysisOptions {
                print_histogram: args.histogram,
                print_path: args.path,
            },
            &sink,
        )
    });
    let Some(report) = report_failure(&sink, TIMING_ENGINE_FAILED, analysed) else {
        render_diagnostics(&sink, global);
        return Ok(1);
    };
    let failed = sink.has_errors();

    match args.format {
        ReportFormat::Text => {
            render_diagnostics(&sink, global);
            print!(
                "{}",
                report.render(timing.histogram_bins, timing.histogram_width)
            );
        }
        ReportFormat::Json => {
            let json = serde_json::json!({
                "report": report,
                "diagnostics": sink.take_all(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(if failed { 1 } else { 0 })
}
