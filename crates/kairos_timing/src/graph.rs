//! Timing graph construction and topological sequencing.
//!
//! The timing graph is never materialised as nodes and edges. Instead the
//! builder classifies every driven net as either a path source (a clocked
//! output or a boundary-cell output) or an interior net, counting the
//! combinational fan-in of each interior output port. A Kahn worklist then
//! extends the source list into a processing order in which every net comes
//! after all nets that combinationally drive it.

use crate::context::{CellPort, PortType, TimingContext};
use crate::delay::Delay;
use crate::ids::{CellId, NetId};
use crate::TIMING_UNREACHED_OUTPUTS;
use kairos_common::{Ident, InternalError, KairosResult};
use kairos_diagnostics::{Diagnostic, DiagnosticSink};
use std::collections::{HashMap, VecDeque};

/// Per-net timing record, recomputed on every pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetTiming {
    /// Worst-case arrival time at the net's driver.
    pub max_arrival: Delay,
    /// Longest number of budgeted hops from a path source to this net.
    pub max_path_length: u32,
    /// Smallest slack still to be shared out downstream of this net.
    pub min_remaining_budget: Delay,
}

/// A topologically sorted set of nets plus their seeded timing records.
#[derive(Clone, Debug)]
pub struct TimingOrder {
    /// Nets in processing order, path sources first.
    pub order: Vec<NetId>,
    /// Timing records indexed by [`NetId::index`]. Nets outside `order` keep
    /// zeroed records.
    pub records: Vec<NetTiming>,
    /// Number of leading entries of `order` that are path sources.
    pub source_count: usize,
}

impl TimingOrder {
    /// Returns the timing record of a net.
    pub fn record(&self, net: NetId) -> &NetTiming {
        &self.records[net.index()]
    }
}

/// Output port key in the fan-in table.
type PortKey = (CellId, Ident);

struct Sequencer {
    order: Vec<NetId>,
    queued: Vec<bool>,
}

impl Sequencer {
    fn enqueue(&mut self, net: NetId) -> KairosResult<()> {
        let slot = &mut self.queued[net.index()];
        if *slot {
            return Err(InternalError::new(format!(
                "net {net} entered the timing order twice"
            )));
        }
        *slot = true;
        self.order.push(net);
        Ok(())
    }
}

/// Splits a cell's connected ports into (inputs, outputs). Any direction
/// other than `Output` counts as an input.
fn split_ports(ports: &[CellPort]) -> (Vec<CellPort>, Vec<CellPort>) {
    ports
        .iter()
        .copied()
        .filter(|p| p.net.is_some())
        .partition(|p| p.port_type != PortType::Output)
}

/// Scans every cell once, seeding path sources and counting combinational
/// fan-in, then sequences the remaining reachable nets.
///
/// Emits a timing warning when some combinational outputs were never reached
/// (a combinational loop or an output fed from an unsequenced net). Returns an
/// internal error when the fan-in bookkeeping is inconsistent with the arcs
/// reported by the context.
pub fn build_order<C: TimingContext + ?Sized>(
    ctx: &C,
    sink: &DiagnosticSink,
) -> KairosResult<TimingOrder> {
    let mut records = vec![NetTiming::default(); ctx.net_count()];
    let mut seq = Sequencer {
        order: Vec::new(),
        queued: vec![false; ctx.net_count()],
    };
    let mut fanin: HashMap<PortKey, u32> = HashMap::new();

    for idx in 0..ctx.cell_count() {
        let cell = CellId::from_index(idx);
        let (inputs, outputs) = split_ports(ctx.cell_ports(cell));
        let boundary = ctx.is_boundary_cell(cell);

        for out in &outputs {
            let Some(net) = out.net else { continue };
            if let Some(clock) = ctx.port_clock(cell, out.name) {
                let clk_to_q = ctx
                    .cell_delay(cell, clock, out.name)
                    .map(|d| d.max_delay())
                    .unwrap_or(Delay::ZERO);
                seq.enqueue(net)?;
                records[net.index()] = NetTiming {
                    max_arrival: clk_to_q,
                    ..NetTiming::default()
                };
                continue;
            }
            if boundary {
                seq.enqueue(net)?;
                records[net.index()] = NetTiming::default();
            }
            for input in &inputs {
                if ctx.cell_delay(cell, input.name, out.name).is_some() {
                    *fanin.entry((cell, out.name)).or_insert(0) += 1;
                }
            }
        }
    }

    let source_count = seq.order.len();
    let mut queue: VecDeque<NetId> = seq.order.iter().copied().collect();

    while let Some(net) = queue.pop_front() {
        for user in ctx.net_users(net) {
            if ctx.port_clock(user.cell, user.port).is_some() {
                continue;
            }
            for port in ctx.cell_ports(user.cell) {
                if port.port_type != PortType::Output {
                    continue;
                }
                let Some(out_net) = port.net else { continue };
                if ctx.cell_delay(user.cell, user.port, port.name).is_none() {
                    continue;
                }
                let key = (user.cell, port.name);
                let Some(count) = fanin.get_mut(&key) else {
                    return Err(InternalError::new(format!(
                        "no fan-in entry for {}.{} driving net '{}'",
                        ctx.cell_name(user.cell),
                        ctx.resolve(port.name),
                        ctx.net_name(out_net),
                    )));
                };
                *count -= 1;
                if *count > 0 {
                    continue;
                }
                fanin.remove(&key);
                // Boundary outputs are already sources; their counters are
                // bookkeeping only.
                if ctx.is_boundary_cell(user.cell) {
                    continue;
                }
                seq.enqueue(out_net)?;
                queue.push_back(out_net);
            }
        }
    }

    let unreached = fanin
        .keys()
        .filter(|(cell, _)| !ctx.is_boundary_cell(*cell))
        .count();
    if unreached > 0 {
        sink.emit(
            Diagnostic::warning(
                TIMING_UNREACHED_OUTPUTS,
                format!(
                    "{unreached} combinational output(s) were not reached from any timing path source"
                ),
            )
            .with_note("nets driven by these outputs receive no arrival-based budget")
            .with_help("check the design for combinational loops"),
        );
    }

    Ok(TimingOrder {
        order: seq.order,
        records,
        source_count,
    })
}
