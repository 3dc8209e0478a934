//! Timing-driven budget engine for the Kairos place-and-route flow.
//!
//! Given a placed netlist behind the [`TimingContext`] trait, this crate
//! computes a maximum-delay budget for every net connection, the design's
//! minimum slack against the target clock, the critical path and the endpoint
//! slack distribution.
//!
//! # Usage
//!
//! ```ignore
//! use kairos_timing::{assign_budget, timing_analysis, AnalysisOptions, BudgetOptions};
//!
//! let summary = assign_budget(&mut design, &BudgetOptions::default(), &sink)?;
//! let report = timing_analysis(&design, &AnalysisOptions { print_path: true, ..Default::default() }, &sink)?;
//! println!("{}", report.fmax_line());
//! ```
//!
//! # Architecture
//!
//! - [`context`]: the query surface a design database implements
//! - [`graph`]: path-source discovery and topological sequencing
//! - [`propagate`]: forward arrival and backward budget passes
//! - [`budget`]: budget assignment driver
//! - [`analysis`]: read-only analysis producing a [`TimingReport`]
//! - [`report`]: report types and text rendering

#![warn(missing_docs)]

pub mod analysis;
pub mod budget;
pub mod context;
pub mod delay;
pub mod graph;
pub mod ids;
pub mod propagate;
pub mod report;

#[cfg(test)]
mod testutil;

pub use analysis::{timing_analysis, AnalysisOptions};
pub use budget::{assign_budget, BudgetOptions, BudgetSummary};
pub use context::{CellPort, Loc, PortRef, PortType, TimingContext};
pub use delay::{Delay, DelayInfo};
pub use graph::{build_order, NetTiming, TimingOrder};
pub use ids::{CellId, NetId};
pub use propagate::{walk_paths, PathHop, WalkOptions, WalkResult};
pub use report::{CriticalPath, PathElement, SlackHistogram, TimingReport};

use kairos_diagnostics::{Category, DiagnosticCode};

/// A connection was left with a negative budget.
pub const TIMING_NEGATIVE_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 1);
/// Combinational outputs were never reached while sequencing.
pub const TIMING_UNREACHED_OUTPUTS: DiagnosticCode = DiagnosticCode::new(Category::Timing, 2);
/// Budget annotation banner with the target frequency.
pub const TIMING_BUDGET_TARGET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 101);
/// Per-connection budget listing.
pub const TIMING_PORT_BUDGET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 102);
/// The target frequency was adapted to the achieved one.
pub const TIMING_RETARGET: DiagnosticCode = DiagnosticCode::new(Category::Timing, 103);
/// Design checksum after budget assignment.
pub const TIMING_CHECKSUM: DiagnosticCode = DiagnosticCode::new(Category::Timing, 104);
/// Analysis found no timing paths.
pub const TIMING_NO_PATHS: DiagnosticCode = DiagnosticCode::new(Category::Timing, 110);
/// Estimated maximum frequency.
pub const TIMING_FMAX: DiagnosticCode = DiagnosticCode::new(Category::Timing, 111);
