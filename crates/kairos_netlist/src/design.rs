//! On-disk design description: a cell library plus placed cells and nets.
//!
//! Designs are JSON documents deserialized straight into these types and then
//! compiled into a [`Netlist`](crate::Netlist) by
//! [`build_netlist`](crate::build_netlist).

use kairos_timing::{Loc, PortType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default route delay per unit of Manhattan distance, in picoseconds.
pub const DEFAULT_ROUTE_DELAY_PER_UNIT_PS: i64 = 100;

/// A complete design file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignFile {
    /// Cell types and the delay model.
    pub library: CellLibrary,
    /// Cell instances.
    #[serde(default)]
    pub cells: Vec<CellDef>,
    /// Nets connecting cell ports.
    #[serde(default)]
    pub nets: Vec<NetDef>,
}

/// Cell types keyed by name, plus the placement-based routing estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellLibrary {
    /// Estimated route delay per grid unit, used for connections without a
    /// recorded routed delay.
    #[serde(default = "default_route_delay_per_unit")]
    pub route_delay_per_unit_ps: i64,
    /// Cell types by name.
    #[serde(default)]
    pub cell_types: BTreeMap<String, CellTypeDef>,
}

impl Default for CellLibrary {
    fn default() -> Self {
        Self {
            route_delay_per_unit_ps: DEFAULT_ROUTE_DELAY_PER_UNIT_PS,
            cell_types: BTreeMap::new(),
        }
    }
}

fn default_route_delay_per_unit() -> i64 {
    DEFAULT_ROUTE_DELAY_PER_UNIT_PS
}

/// A cell type: its ports, clock associations and timing arcs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellTypeDef {
    /// Ports in declaration order.
    pub ports: Vec<PortDef>,
    /// Clock port for each clocked port (`"D": "CLK"`).
    #[serde(default)]
    pub clocks: BTreeMap<String, String>,
    /// Timing arcs through the cell. Arcs from a clock port to a clocked
    /// output give the clock-to-output delay.
    #[serde(default)]
    pub arcs: Vec<ArcDef>,
    /// Whether instances sit on the design boundary (I/O buffers).
    #[serde(default)]
    pub boundary: bool,
}

/// A port declaration on a cell type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDef {
    /// Port name.
    pub name: String,
    /// Port direction.
    pub dir: PortType,
}

/// A timing arc between two ports of a cell type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDef {
    /// Source port.
    pub from: String,
    /// Destination port.
    pub to: String,
    /// Fast-corner delay; defaults to `max_ps`.
    #[serde(default)]
    pub min_ps: Option<i64>,
    /// Slow-corner delay.
    pub max_ps: i64,
}

/// A cell instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDef {
    /// Instance name, unique in the design.
    pub name: String,
    /// Name of a type in the library.
    #[serde(rename = "type")]
    pub cell_type: String,
    /// Placement; unplaced cells sit at the origin.
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A net with its driver and sinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetDef {
    /// Net name, unique in the design.
    pub name: String,
    /// Driving port, if any.
    #[serde(default)]
    pub driver: Option<PinDef>,
    /// Sink connections in order.
    #[serde(default)]
    pub users: Vec<UserDef>,
}

/// A (cell, port) reference in a design file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDef {
    /// Cell instance name.
    pub cell: String,
    /// Port name.
    pub port: String,
}

/// A sink connection with an optional routed delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDef {
    /// Cell instance name.
    pub cell: String,
    /// Port name.
    pub port: String,
    /// Routed delay; estimated from placement when absent.
    #[serde(default)]
    pub route_delay_ps: Option<i64>,
}
