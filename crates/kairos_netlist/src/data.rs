//! The placed netlist database.
//!
//! A [`Netlist`] holds cells, nets and a compiled per-type delay table, all
//! addressed by dense ids. Port names are interned so connections are plain
//! `Copy` handles. The timing engine reaches it through the
//! [`TimingContext`](kairos_timing::TimingContext) impl in
//! [`context`](crate::context).

use crate::design::{CellTypeDef, DesignFile};
use crate::error::NetlistError;
use crate::{NETLIST_UNDRIVEN_NET, NETLIST_UNPLACED_CELLS};
use kairos_common::{ContentHashBuilder, Frequency, Ident, Interner};
use kairos_config::BudgetOverride;
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use kairos_timing::{CellId, CellPort, Delay, DelayInfo, Loc, NetId, PortRef, PortType};
use serde::Serialize;
use std::collections::HashMap;

/// A placed cell instance.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Instance name.
    pub name: String,
    /// Index into the netlist's cell type table.
    pub type_index: usize,
    /// Placement location.
    pub loc: Loc,
    /// Whether the design file gave a location.
    pub placed: bool,
    /// Every port the cell type declares, with its connection.
    pub ports: Vec<CellPort>,
}

/// A net with one optional driver and ordered users.
#[derive(Debug, Clone)]
pub struct Net {
    /// Net name.
    pub name: String,
    /// Driving port.
    pub driver: Option<PortRef>,
    /// Sink connections; `budget` is written by budget assignment.
    pub users: Vec<PortRef>,
    /// Routed delay per user, `None` where only an estimate is available.
    pub routed: Vec<Option<Delay>>,
}

/// Compiled timing data of one cell type.
#[derive(Debug, Clone)]
pub(crate) struct CellTiming {
    pub(crate) name: String,
    pub(crate) ports: Vec<(Ident, PortType)>,
    pub(crate) clocks: HashMap<Ident, Ident>,
    pub(crate) arcs: HashMap<(Ident, Ident), DelayInfo>,
    pub(crate) boundary: bool,
}

/// One row of a budget export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionBudget {
    /// Net name.
    pub net: String,
    /// Sink cell name.
    pub cell: String,
    /// Sink port name.
    pub port: String,
    /// Budget in picoseconds; `None` while unconstrained.
    pub budget_ps: Option<i64>,
}

/// The design database.
#[derive(Debug)]
pub struct Netlist {
    pub(crate) interner: Interner,
    pub(crate) cells: Vec<Cell>,
    pub(crate) nets: Vec<Net>,
    pub(crate) types: Vec<CellTiming>,
    pub(crate) overrides: HashMap<(NetId, usize), Delay>,
    pub(crate) route_delay_per_unit: Delay,
    pub(crate) target_frequency: Frequency,
    cell_by_name: HashMap<String, CellId>,
    net_by_name: HashMap<String, NetId>,
}

impl Netlist {
    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// Looks up a cell by instance name.
    pub fn cell_id(&self, name: &str) -> Option<CellId> {
        self.cell_by_name.get(name).copied()
    }

    /// Looks up a net by name.
    pub fn net_id(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Returns the interner holding port and clock names.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns the name of a cell's type.
    pub fn cell_type_name(&self, id: CellId) -> &str {
        &self.types[self.cells[id.index()].type_index].name
    }

    /// Number of sink connections across all nets.
    pub fn connection_count(&self) -> usize {
        self.nets.iter().map(|n| n.users.len()).sum()
    }

    /// Index of the user `cell.port` on `net`.
    pub fn user_index(&self, net: NetId, cell: CellId, port: &str) -> Option<usize> {
        let port = self.interner.get(port)?;
        self.nets[net.index()]
            .users
            .iter()
            .position(|u| u.cell == cell && u.port == port)
    }

    /// Fixes the delay of individual connections. Overridden connections
    /// take the given delay as their budget and get no share of path slack.
    pub fn apply_overrides(&mut self, overrides: &[BudgetOverride]) -> Result<(), NetlistError> {
        for ov in overrides {
            let net = self
                .net_id(&ov.net)
                .ok_or_else(|| NetlistError::UnknownNet(ov.net.clone()))?;
            let cell = self
                .cell_id(&ov.cell)
                .ok_or_else(|| NetlistError::UnknownCell(ov.cell.clone()))?;
            let user = self
                .user_index(net, cell, &ov.port)
                .ok_or_else(|| NetlistError::NotAUser {
                    net: ov.net.clone(),
                    cell: ov.cell.clone(),
                    port: ov.port.clone(),
                })?;
            self.overrides.insert((net, user), Delay::from_ps(ov.delay));
        }
        Ok(())
    }

    /// Every connection's current budget, in net order.
    pub fn budgets(&self) -> Vec<ConnectionBudget> {
        self.nets
            .iter()
            .flat_map(|net| {
                net.users.iter().map(move |user| ConnectionBudget {
                    net: net.name.clone(),
                    cell: self.cells[user.cell.index()].name.clone(),
                    port: self.interner.resolve(user.port).to_string(),
                    budget_ps: (user.budget != Delay::MAX).then_some(user.budget.as_ps()),
                })
            })
            .collect()
    }

    /// Hashes names, placement, connectivity, routed delays and budgets.
    pub fn state_checksum(&self) -> u32 {
        let mut h = ContentHashBuilder::new();
        for cell in &self.cells {
            h.str(&cell.name)
                .str(&self.types[cell.type_index].name)
                .i64(i64::from(cell.loc.x))
                .i64(i64::from(cell.loc.y));
        }
        for net in &self.nets {
            h.str(&net.name);
            if let Some(driver) = &net.driver {
                h.u64(u64::from(driver.cell.as_raw()))
                    .str(self.interner.resolve(driver.port));
            }
            for (user, routed) in net.users.iter().zip(&net.routed) {
                h.u64(u64::from(user.cell.as_raw()))
                    .str(self.interner.resolve(user.port))
                    .i64(user.budget.as_ps())
                    .i64(routed.map_or(-1, |d| d.as_ps()));
            }
        }
        h.finish().fold32()
    }
}

fn compile_type(
    name: &str,
    def: &CellTypeDef,
    interner: &Interner,
) -> Result<CellTiming, NetlistError> {
    let ports: Vec<(Ident, PortType)> = def
        .ports
        .iter()
        .map(|p| (interner.get_or_intern(&p.name), p.dir))
        .collect();
    let declared = |port: &str| -> Result<Ident, NetlistError> {
        interner
            .get(port)
            .filter(|id| ports.iter().any(|(p, _)| p == id))
            .ok_or_else(|| NetlistError::UndeclaredPort {
                cell_type: name.to_string(),
                port: port.to_string(),
            })
    };

    let mut clocks = HashMap::new();
    for (port, clock) in &def.clocks {
        clocks.insert(declared(port)?, declared(clock)?);
    }
    let mut arcs = HashMap::new();
    for arc in &def.arcs {
        let max = Delay::from_ps(arc.max_ps);
        let min = arc.min_ps.map_or(max, Delay::from_ps);
        arcs.insert(
            (declared(&arc.from)?, declared(&arc.to)?),
            DelayInfo::new(min, max),
        );
    }

    Ok(CellTiming {
        name: name.to_string(),
        ports,
        clocks,
        arcs,
        boundary: def.boundary,
    })
}

/// Finds `port` on `cell` and checks it is free, returning its index and name.
fn free_port(
    cells: &[Cell],
    interner: &Interner,
    nets: &[Net],
    cell: CellId,
    port: &str,
) -> Result<(usize, Ident, PortType), NetlistError> {
    let c = &cells[cell.index()];
    let found = interner
        .get(port)
        .and_then(|id| c.ports.iter().position(|p| p.name == id));
    let Some(idx) = found else {
        return Err(NetlistError::UnknownPort {
            cell: c.name.clone(),
            port: port.to_string(),
        });
    };
    let p = c.ports[idx];
    if let Some(net) = p.net {
        return Err(NetlistError::PortAlreadyConnected {
            cell: c.name.clone(),
            port: port.to_string(),
            net: nets[net.index()].name.clone(),
        });
    }
    Ok((idx, p.name, p.port_type))
}

/// Compiles a design file into a netlist clocked at `target`.
///
/// Structural problems (unknown names, misdirected or doubly connected
/// ports) are errors. Nets with users but no driver and unplaced cells are
/// reported as warnings on `sink`.
pub fn build_netlist(
    design: DesignFile,
    target: Frequency,
    sink: &DiagnosticSink,
) -> Result<Netlist, NetlistError> {
    let per_unit = design.library.route_delay_per_unit_ps;
    if per_unit < 0 {
        return Err(NetlistError::NegativeDelay {
            what: "route_delay_per_unit_ps".to_string(),
            value: per_unit,
        });
    }

    let interner = Interner::new();
    let mut types = Vec::with_capacity(design.library.cell_types.len());
    let mut type_by_name = HashMap::new();
    for (name, def) in &design.library.cell_types {
        type_by_name.insert(name.clone(), types.len());
        types.push(compile_type(name, def, &interner)?);
    }

    let mut cells: Vec<Cell> = Vec::with_capacity(design.cells.len());
    let mut cell_by_name = HashMap::new();
    for def in design.cells {
        let Some(&type_index) = type_by_name.get(&def.cell_type) else {
            return Err(NetlistError::UnknownCellType {
                cell: def.name,
                cell_type: def.cell_type,
            });
        };
        let id = CellId::from_index(cells.len());
        if cell_by_name.insert(def.name.clone(), id).is_some() {
            return Err(NetlistError::DuplicateName {
                kind: "cell",
                name: def.name,
            });
        }
        let ports = types[type_index]
            .ports
            .iter()
            .map(|&(name, port_type)| CellPort {
                name,
                port_type,
                net: None,
            })
            .collect();
        cells.push(Cell {
            name: def.name,
            type_index,
            loc: def.loc.unwrap_or_default(),
            placed: def.loc.is_some(),
            ports,
        });
    }

    let mut nets: Vec<Net> = Vec::with_capacity(design.nets.len());
    let mut net_by_name = HashMap::new();
    for def in design.nets {
        let id = NetId::from_index(nets.len());
        if net_by_name.insert(def.name.clone(), id).is_some() {
            return Err(NetlistError::DuplicateName {
                kind: "net",
                name: def.name,
            });
        }
        let lookup = |name: &str| {
            cell_by_name
                .get(name)
                .copied()
                .ok_or_else(|| NetlistError::UnknownCell(name.to_string()))
        };

        let mut net = Net {
            name: def.name,
            driver: None,
            users: Vec::with_capacity(def.users.len()),
            routed: Vec::with_capacity(def.users.len()),
        };
        // The net is pushed before connecting so conflicts can name it.
        nets.push(net.clone());

        if let Some(pin) = &def.driver {
            let cell = lookup(&pin.cell)?;
            let (idx, port, dir) = free_port(&cells, &interner, &nets, cell, &pin.port)?;
            if dir != PortType::Output {
                return Err(NetlistError::DirectionMismatch {
                    cell: pin.cell.clone(),
                    port: pin.port.clone(),
                    role: "driver",
                });
            }
            cells[cell.index()].ports[idx].net = Some(id);
            net.driver = Some(PortRef {
                cell,
                port,
                budget: Delay::ZERO,
            });
        }
        for user in &def.users {
            if let Some(ps) = user.route_delay_ps.filter(|ps| *ps < 0) {
                return Err(NetlistError::NegativeDelay {
                    what: format!("connection {}.{} on net '{}'", user.cell, user.port, net.name),
                    value: ps,
                });
            }
            let cell = lookup(&user.cell)?;
            let (idx, port, dir) = free_port(&cells, &interner, &nets, cell, &user.port)?;
            if dir == PortType::Output {
                return Err(NetlistError::DirectionMismatch {
                    cell: user.cell.clone(),
                    port: user.port.clone(),
                    role: "user",
                });
            }
            cells[cell.index()].ports[idx].net = Some(id);
            net.users.push(PortRef {
                cell,
                port,
                budget: Delay::MAX,
            });
            net.routed.push(user.route_delay_ps.map(Delay::from_ps));
        }

        if net.driver.is_none() && !net.users.is_empty() {
            sink.emit(
                Diagnostic::warning(
                    NETLIST_UNDRIVEN_NET,
                    format!("net '{}' has {} user(s) but no driver", net.name, net.users.len()),
                )
                .with_note("its users are never reached by a timing path"),
            );
        }
        nets[id.index()] = net;
    }

    let unplaced = cells.iter().filter(|c| !c.placed).count();
    if unplaced > 0 {
        sink.emit(
            Diagnostic::warning(
                NETLIST_UNPLACED_CELLS,
                format!("{unplaced} cell(s) have no placement"),
            )
            .with_note("route delays to and from unplaced cells are estimated from the origin"),
        );
    }

    Ok(Netlist {
        interner,
        cells,
        nets,
        types,
        overrides: HashMap::new(),
        route_delay_per_unit: Delay::from_ps(per_unit),
        target_frequency: target,
        cell_by_name,
        net_by_name,
    })
}
