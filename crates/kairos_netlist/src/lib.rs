//! Reference design database for the Kairos timing engine.
//!
//! Loads a placed design (a cell library with clock associations and timing
//! arcs, cell instances with locations, and nets with optional routed delays)
//! from JSON and exposes it to [`kairos_timing`] through its
//! [`TimingContext`](kairos_timing::TimingContext) implementation.

#![warn(missing_docs)]

pub mod context;
pub mod data;
pub mod design;
pub mod error;
pub mod loader;

#[cfg(test)]
mod testdata;

pub use data::{build_netlist, Cell, ConnectionBudget, Net, Netlist};
pub use design::{
    ArcDef, CellDef, CellLibrary, CellTypeDef, DesignFile, NetDef, PinDef, PortDef, UserDef,
};
pub use error::NetlistError;
pub use loader::{load_design, parse_design};

use kairos_diagnostics::{Category, DiagnosticCode};

/// A net has users but no driver.
pub const NETLIST_UNDRIVEN_NET: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 1);
/// Some cells carry no placement.
pub const NETLIST_UNPLACED_CELLS: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 2);
