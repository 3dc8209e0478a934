//! [`TimingContext`] implementation for [`Netlist`].
//!
//! Routed delays come from the design file where recorded; otherwise the
//! connection is estimated from the Manhattan distance between driver and
//! sink placements.

use crate::data::Netlist;
use kairos_common::{Frequency, Ident};
use kairos_timing::{CellId, CellPort, Delay, DelayInfo, Loc, NetId, PortRef, TimingContext};

impl Netlist {
    /// Placement-based delay estimate for a connection.
    pub fn estimate_route_delay(&self, net: NetId, user: usize) -> Delay {
        let n = &self.nets[net.index()];
        let Some(driver) = n.driver else {
            return Delay::ZERO;
        };
        let from = self.cells[driver.cell.index()].loc;
        let to = self.cells[n.users[user].cell.index()].loc;
        Delay::from_ps(
            self.route_delay_per_unit
                .as_ps()
                .saturating_mul(i64::from(from.manhattan(&to))),
        )
    }
}

impl TimingContext for Netlist {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn net_count(&self) -> usize {
        self.nets.len()
    }

    fn cell_ports(&self, cell: CellId) -> &[CellPort] {
        &self.cells[cell.index()].ports
    }

    fn is_boundary_cell(&self, cell: CellId) -> bool {
        self.types[self.cells[cell.index()].type_index].boundary
    }

    fn cell_name(&self, cell: CellId) -> &str {
        &self.cells[cell.index()].name
    }

    fn cell_location(&self, cell: CellId) -> Loc {
        self.cells[cell.index()].loc
    }

    fn net_name(&self, net: NetId) -> &str {
        &self.nets[net.index()].name
    }

    fn net_driver(&self, net: NetId) -> Option<PortRef> {
        self.nets[net.index()].driver
    }

    fn net_users(&self, net: NetId) -> &[PortRef] {
        &self.nets[net.index()].users
    }

    fn set_budget(&mut self, net: NetId, user: usize, budget: Delay) {
        self.nets[net.index()].users[user].budget = budget;
    }

    fn port_clock(&self, cell: CellId, port: Ident) -> Option<Ident> {
        self.types[self.cells[cell.index()].type_index]
            .clocks
            .get(&port)
            .copied()
    }

    fn cell_delay(&self, cell: CellId, from: Ident, to: Ident) -> Option<DelayInfo> {
        self.types[self.cells[cell.index()].type_index]
            .arcs
            .get(&(from, to))
            .copied()
    }

    fn route_delay(&self, net: NetId, user: usize) -> Delay {
        self.nets[net.index()].routed[user]
            .unwrap_or_else(|| self.estimate_route_delay(net, user))
    }

    fn budget_override(&self, net: NetId, user: usize, _delay: Delay) -> Option<Delay> {
        self.overrides.get(&(net, user)).copied()
    }

    fn target_frequency(&self) -> Frequency {
        self.target_frequency
    }

    fn set_target_frequency(&mut self, freq: Frequency) {
        self.target_frequency = freq;
    }

    fn checksum(&self) -> u32 {
        self.state_checksum()
    }

    fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }
}
