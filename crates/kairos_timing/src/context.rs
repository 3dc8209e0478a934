//! The query surface the timing engine consumes from the design database.
//!
//! The engine never owns netlist storage. Everything it needs (connectivity,
//! clock association, cell and routing delays, overrides, the clock target)
//! comes through [`TimingContext`], and the only writes it performs are
//! [`TimingContext::set_budget`] and, for automatic frequency adaptation,
//! [`TimingContext::set_target_frequency`].

use crate::delay::{Delay, DelayInfo};
use crate::ids::{CellId, NetId};
use kairos_common::{Frequency, Ident};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cell port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Input port.
    Input,
    /// Output port.
    Output,
    /// Bidirectional port; treated as an input by the timing engine.
    InOut,
}

/// A port on a cell, with the net it is connected to (if any).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPort {
    /// Interned port name.
    pub name: Ident,
    /// Port direction.
    pub port_type: PortType,
    /// Connected net, `None` when dangling.
    pub net: Option<NetId>,
}

/// One end of a net: a (cell, port) pair.
///
/// For sink connections ("users") `budget` is the maximum delay permitted on
/// the connection. It is meaningless on a driver reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortRef {
    /// The cell owning the port.
    pub cell: CellId,
    /// Interned port name.
    pub port: Ident,
    /// Connection budget.
    pub budget: Delay,
}

/// A placement location on the device grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Loc {
    /// Creates a location.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another location.
    pub fn manhattan(&self, other: &Loc) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Read access to a placed netlist plus its delay model.
///
/// Cell and net ids are dense (`0..cell_count()`, `0..net_count()`). Users of
/// a net are addressed by their position in [`net_users`](Self::net_users).
pub trait TimingContext {
    /// Number of cells.
    fn cell_count(&self) -> usize;

    /// Number of nets.
    fn net_count(&self) -> usize;

    /// Ports of a cell in declaration order.
    fn cell_ports(&self, cell: CellId) -> &[CellPort];

    /// Whether the cell sits on the design boundary (an I/O buffer). Outputs
    /// of boundary cells start timing paths with zero arrival.
    fn is_boundary_cell(&self, cell: CellId) -> bool;

    /// Cell instance name.
    fn cell_name(&self, cell: CellId) -> &str;

    /// Placement location of a cell.
    fn cell_location(&self, cell: CellId) -> Loc;

    /// Net name.
    fn net_name(&self, net: NetId) -> &str;

    /// The driving port of a net.
    fn net_driver(&self, net: NetId) -> Option<PortRef>;

    /// Sink connections of a net, in insertion order.
    fn net_users(&self, net: NetId) -> &[PortRef];

    /// Writes the budget of the `user`-th sink connection of `net`.
    fn set_budget(&mut self, net: NetId, user: usize, budget: Delay);

    /// The clock port that `port` of `cell` is associated with, or `None`
    /// for ports that are not clocked.
    fn port_clock(&self, cell: CellId, port: Ident) -> Option<Ident>;

    /// The timing arc through `cell` from `from` to `to`, or `None` when no
    /// combinational path exists.
    fn cell_delay(&self, cell: CellId, from: Ident, to: Ident) -> Option<DelayInfo>;

    /// Routed (or estimated) delay of the `user`-th connection of `net`.
    fn route_delay(&self, net: NetId, user: usize) -> Delay;

    /// A user-specified fixed delay replacing `delay` on the connection, if
    /// one exists.
    fn budget_override(&self, net: NetId, user: usize, delay: Delay) -> Option<Delay>;

    /// Current target clock frequency.
    fn target_frequency(&self) -> Frequency;

    /// Replaces the target clock frequency.
    fn set_target_frequency(&mut self, freq: Frequency);

    /// Converts a delay to nanoseconds for reporting.
    fn delay_ns(&self, delay: Delay) -> f64 {
        delay.as_ns()
    }

    /// Checksum of the design state.
    fn checksum(&self) -> u32;

    /// Resolves an interned port or clock name.
    fn resolve(&self, ident: Ident) -> &str;
}
