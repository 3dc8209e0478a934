//! In-memory [`TimingContext`] for unit tests.

use crate::context::{CellPort, Loc, PortRef, PortType, TimingContext};
use crate::delay::{Delay, DelayInfo};
use crate::ids::{CellId, NetId};
use kairos_common::{ContentHashBuilder, Frequency, Ident, Interner};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

struct MockCell {
    name: String,
    boundary: bool,
    loc: Loc,
    ports: Vec<CellPort>,
    clocks: HashMap<Ident, Ident>,
    arcs: HashMap<(Ident, Ident), DelayInfo>,
}

struct MockNet {
    name: String,
    driver: Option<PortRef>,
    users: Vec<PortRef>,
    route: Vec<Delay>,
}

pub(crate) struct MockContext {
    interner: Interner,
    cells: Vec<MockCell>,
    nets: Vec<MockNet>,
    overrides: HashMap<(NetId, usize), Delay>,
    freq: Frequency,
}

impl MockContext {
    pub(crate) fn new(mhz: f64) -> Self {
        Self {
            interner: Interner::new(),
            cells: Vec::new(),
            nets: Vec::new(),
            overrides: HashMap::new(),
            freq: Frequency::from_mhz(mhz),
        }
    }

    pub(crate) fn add_cell(&mut self, name: &str, boundary: bool) -> CellId {
        let id = CellId::from_index(self.cells.len());
        self.cells.push(MockCell {
            name: name.to_string(),
            boundary,
            loc: Loc::new(self.cells.len() as i32, 0),
            ports: Vec::new(),
            clocks: HashMap::new(),
            arcs: HashMap::new(),
        });
        id
    }

    /// A register: `D` and `Q` clocked by `CLK`, with a `CLK -> Q` arc.
    pub(crate) fn ff(&mut self, name: &str, clk_to_q_ps: i64) -> CellId {
        let cell = self.add_cell(name, false);
        self.clock(cell, "D", "CLK");
        self.clock(cell, "Q", "CLK");
        self.arc(cell, "CLK", "Q", clk_to_q_ps);
        cell
    }

    /// A four-input lookup table with `I0..I3 -> O` arcs.
    pub(crate) fn lut(&mut self, name: &str, delay_ps: i64) -> CellId {
        let cell = self.add_cell(name, false);
        for input in ["I0", "I1", "I2", "I3"] {
            self.arc(cell, input, "O", delay_ps);
        }
        cell
    }

    /// A boundary pad with output `O` and input `I`; no arcs.
    pub(crate) fn io(&mut self, name: &str) -> CellId {
        self.add_cell(name, true)
    }

    pub(crate) fn clock(&mut self, cell: CellId, port: &str, clock: &str) {
        let port = self.interner.get_or_intern(port);
        let clock = self.interner.get_or_intern(clock);
        self.cells[cell.index()].clocks.insert(port, clock);
    }

    pub(crate) fn arc(&mut self, cell: CellId, from: &str, to: &str, ps: i64) {
        let from = self.interner.get_or_intern(from);
        let to = self.interner.get_or_intern(to);
        self.cells[cell.index()]
            .arcs
            .insert((from, to), DelayInfo::fixed(Delay::from_ps(ps)));
    }

    pub(crate) fn add_net(&mut self, name: &str) -> NetId {
        let id = NetId::from_index(self.nets.len());
        self.nets.push(MockNet {
            name: name.to_string(),
            driver: None,
            users: Vec::new(),
            route: Vec::new(),
        });
        id
    }

    fn attach(&mut self, cell: CellId, port: &str, port_type: PortType, net: NetId) -> Ident {
        let name = self.interner.get_or_intern(port);
        let ports = &mut self.cells[cell.index()].ports;
        match ports.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.net = Some(net),
            None => ports.push(CellPort {
                name,
                port_type,
                net: Some(net),
            }),
        }
        name
    }

    pub(crate) fn drive(&mut self, net: NetId, cell: CellId, port: &str) {
        let port = self.attach(cell, port, PortType::Output, net);
        self.nets[net.index()].driver = Some(PortRef {
            cell,
            port,
            budget: Delay::ZERO,
        });
    }

    pub(crate) fn connect(&mut self, net: NetId, cell: CellId, port: &str, route_ps: i64) -> usize {
        let port = self.attach(cell, port, PortType::Input, net);
        let n = &mut self.nets[net.index()];
        n.users.push(PortRef {
            cell,
            port,
            budget: Delay::MAX,
        });
        n.route.push(Delay::from_ps(route_ps));
        n.users.len() - 1
    }

    pub(crate) fn override_delay(&mut self, net: NetId, user: usize, ps: i64) {
        self.overrides.insert((net, user), Delay::from_ps(ps));
    }

    pub(crate) fn budget(&self, net: NetId, user: usize) -> Delay {
        self.nets[net.index()].users[user].budget
    }

    pub(crate) fn set_all_budgets(&mut self, budget: Delay) {
        for net in &mut self.nets {
            for user in &mut net.users {
                user.budget = budget;
            }
        }
    }

    pub(crate) fn apply_budgets(&mut self, budgets: &[Vec<Delay>]) {
        for (net, row) in self.nets.iter_mut().zip(budgets) {
            for (user, budget) in net.users.iter_mut().zip(row) {
                user.budget = *budget;
            }
        }
    }

    /// Pairs (input net, output net) for every combinational arc crossing a
    /// non-clocked user port.
    pub(crate) fn combinational_edges(&self) -> Vec<(NetId, NetId)> {
        let mut edges = Vec::new();
        for (i, net) in self.nets.iter().enumerate() {
            for user in &net.users {
                if self.port_clock(user.cell, user.port).is_some() {
                    continue;
                }
                for port in self.cell_ports(user.cell) {
                    if port.port_type != PortType::Output {
                        continue;
                    }
                    if let (Some(out), Some(_)) =
                        (port.net, self.cell_delay(user.cell, user.port, port.name))
                    {
                        edges.push((NetId::from_index(i), out));
                    }
                }
            }
        }
        edges
    }

    /// A random acyclic design: `regs` registers feed `luts` lookup tables,
    /// each reading from earlier nets, and every register `D` samples a
    /// random net.
    pub(crate) fn random_pipeline(rng: &mut StdRng, regs: usize, luts: usize) -> Self {
        let mut ctx = Self::new(rng.gen_range(50.0..400.0));
        let mut nets = Vec::new();
        let mut ffs = Vec::new();
        for i in 0..regs {
            let ff = ctx.ff(&format!("ff{i}"), rng.gen_range(0..400));
            let q = ctx.add_net(&format!("q{i}"));
            ctx.drive(q, ff, "Q");
            nets.push(q);
            ffs.push(ff);
        }
        for i in 0..luts {
            let lut = ctx.lut(&format!("lut{i}"), rng.gen_range(0..800));
            let fanin = rng.gen_range(1..=4);
            for pin in 0..fanin {
                let src = nets[rng.gen_range(0..nets.len())];
                ctx.connect(src, lut, &format!("I{pin}"), rng.gen_range(0..1500));
            }
            let out = ctx.add_net(&format!("n{i}"));
            ctx.drive(out, lut, "O");
            nets.push(out);
        }
        for ff in ffs {
            let src = nets[rng.gen_range(0..nets.len())];
            ctx.connect(src, ff, "D", rng.gen_range(0..1500));
        }
        ctx
    }
}

impl TimingContext for MockContext {
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
        self.cells[cell.index()].boundary
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
        self.cells[cell.index()].clocks.get(&port).copied()
    }

    fn cell_delay(&self, cell: CellId, from: Ident, to: Ident) -> Option<DelayInfo> {
        self.cells[cell.index()].arcs.get(&(from, to)).copied()
    }

    fn route_delay(&self, net: NetId, user: usize) -> Delay {
        self.nets[net.index()].route[user]
    }

    fn budget_override(&self, net: NetId, user: usize, _delay: Delay) -> Option<Delay> {
        self.overrides.get(&(net, user)).copied()
    }

    fn target_frequency(&self) -> Frequency {
        self.freq
    }

    fn set_target_frequency(&mut self, freq: Frequency) {
        self.freq = freq;
    }

    fn checksum(&self) -> u32 {
        let mut h = ContentHashBuilder::new();
        for net in &self.nets {
            h.str(&net.name);
            for user in &net.users {
                h.i64(user.budget.as_ps());
            }
        }
        h.finish().fold32()
    }

    fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }
}
