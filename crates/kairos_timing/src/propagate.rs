//! Forward arrival propagation and backward budget distribution.
//!
//! [`walk_paths`] runs both passes over a [`TimingOrder`]. The forward pass
//! computes the worst arrival time and longest hop count at every net; the
//! backward pass turns the slack left at each endpoint into per-connection
//! budgets, sharing it evenly across the hops that lead there.
//!
//! The walk only reads the context. Budgets come back as a table of proposed
//! values, each already `min`-ed against the connection's budget at the start
//! of the pass, for the caller to write back.

use crate::context::{PortRef, PortType, TimingContext};
use crate::delay::Delay;
use crate::graph::{build_order, NetTiming, TimingOrder};
use crate::ids::NetId;
use kairos_common::KairosResult;
use kairos_diagnostics::DiagnosticSink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single connection on a timing path: the `user`-th sink of `net`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathHop {
    /// The net carrying the connection.
    pub net: NetId,
    /// Index into the net's user list.
    pub user: usize,
}

/// What a walk should record besides minimum slack.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkOptions {
    /// Produce a budget table for writing back to the context.
    pub update_budgets: bool,
    /// Record the connections of the worst-slack path.
    pub track_path: bool,
    /// Record the endpoint slack distribution.
    pub track_histogram: bool,
}

/// Outcome of one forward/backward walk.
#[derive(Clone, Debug)]
pub struct WalkResult {
    /// Clock period the walk was run against.
    pub period: Delay,
    /// Smallest endpoint slack seen, or the period when there are no
    /// endpoints.
    pub min_slack: Delay,
    /// Number of endpoint connections visited.
    pub endpoint_count: usize,
    /// Proposed budgets indexed `[net][user]`; empty unless requested.
    pub budgets: Vec<Vec<Delay>>,
    /// Worst-slack path from source to endpoint; empty unless requested or
    /// when the design has no endpoints.
    pub critical_path: Vec<PathHop>,
    /// Endpoint count per slack bucket (ps); `None` unless requested.
    pub histogram: Option<BTreeMap<i64, u32>>,
    /// Final per-net timing records.
    pub records: Vec<NetTiming>,
}

/// Delay used for a connection: the override when one exists, otherwise the
/// routed delay. The flag tells whether an override applied.
fn connection_delay<C: TimingContext + ?Sized>(
    ctx: &C,
    net: NetId,
    user: usize,
) -> (Delay, bool) {
    let routed = ctx.route_delay(net, user);
    match ctx.budget_override(net, user, routed) {
        Some(fixed) => (fixed, true),
        None => (routed, false),
    }
}

/// Calls `f` with (output net, arc max delay) for every connected output of
/// the user's cell reachable through a combinational arc from the user port.
fn for_each_comb_output<C, F>(ctx: &C, user: &PortRef, mut f: F)
where
    C: TimingContext + ?Sized,
    F: FnMut(NetId, Delay),
{
    for port in ctx.cell_ports(user.cell) {
        if port.port_type != PortType::Output {
            continue;
        }
        let Some(out_net) = port.net else { continue };
        if let Some(arc) = ctx.cell_delay(user.cell, user.port, port.name) {
            f(out_net, arc.max_delay());
        }
    }
}

/// Builds the processing order and runs both passes.
pub fn walk_paths<C: TimingContext + ?Sized>(
    ctx: &C,
    options: WalkOptions,
    sink: &DiagnosticSink,
) -> KairosResult<WalkResult> {
    let order = build_order(ctx, sink)?;
    let period = Delay::from_ps(ctx.target_frequency().period_ps());
    Ok(walk_order(ctx, order, period, options))
}

/// Runs the forward and backward passes over an existing order.
pub fn walk_order<C: TimingContext + ?Sized>(
    ctx: &C,
    order: TimingOrder,
    period: Delay,
    options: WalkOptions,
) -> WalkResult {
    let TimingOrder {
        order, mut records, ..
    } = order;

    let mut predecessor: Vec<Option<PathHop>> = if options.track_path {
        vec![None; ctx.net_count()]
    } else {
        Vec::new()
    };
    let mut position: Vec<Option<usize>> = vec![None; ctx.net_count()];
    for (i, net) in order.iter().enumerate() {
        position[net.index()] = Some(i);
    }

    // Forward: arrival times and path lengths.
    for (pos, &net) in order.iter().enumerate() {
        records[net.index()].min_remaining_budget = period;
        let arrival = records[net.index()].max_arrival;
        let length_plus_one = records[net.index()].max_path_length + 1;

        for (idx, user) in ctx.net_users(net).iter().enumerate() {
            if ctx.port_clock(user.cell, user.port).is_some() {
                continue;
            }
            let (delay, overridden) = connection_delay(ctx, net, idx);
            let user_arrival = arrival + delay;
            for_each_comb_output(ctx, user, |out_net, comb| {
                let data = &mut records[out_net.index()];
                let candidate = user_arrival + comb;
                if options.track_path {
                    // Only later nets may point back, so traces always end.
                    let later = position[out_net.index()].is_some_and(|p| p > pos);
                    let slot = &mut predecessor[out_net.index()];
                    if later && (slot.is_none() || candidate > data.max_arrival) {
                        *slot = Some(PathHop { net, user: idx });
                    }
                }
                data.max_arrival = data.max_arrival.max(candidate);
                if !overridden {
                    data.max_path_length = data.max_path_length.max(length_plus_one);
                }
            });
        }
    }

    let mut budgets: Vec<Vec<Delay>> = if options.update_budgets {
        (0..ctx.net_count())
            .map(|i| {
                ctx.net_users(NetId::from_index(i))
                    .iter()
                    .map(|u| u.budget)
                    .collect()
            })
            .collect()
    } else {
        Vec::new()
    };
    let mut histogram = options.track_histogram.then(BTreeMap::new);
    let mut critical_path = Vec::new();
    let mut worst_endpoint: Option<Delay> = None;
    let mut min_slack = period;
    let mut endpoint_count = 0;

    // Backward: share remaining slack out as budgets.
    for &net in order.iter().rev() {
        let record = records[net.index()];
        let length_plus_one = i64::from(record.max_path_length) + 1;
        let mut net_remaining = record.min_remaining_budget;

        for (idx, user) in ctx.net_users(net).iter().enumerate() {
            let (delay, overridden) = connection_delay(ctx, net, idx);
            let share_of = |remaining: Delay| {
                if overridden {
                    Delay::ZERO
                } else {
                    remaining / length_plus_one
                }
            };
            let mut tighten = |budget: Delay| {
                if let Some(slot) = budgets.get_mut(net.index()).and_then(|b| b.get_mut(idx)) {
                    *slot = (*slot).min(budget);
                }
            };

            if ctx.port_clock(user.cell, user.port).is_some() {
                let path_budget = period - (record.max_arrival + delay);
                let share = share_of(path_budget);
                tighten(delay + share);
                net_remaining = net_remaining.min(path_budget - share);
                min_slack = min_slack.min(path_budget);
                endpoint_count += 1;

                if let Some(hist) = histogram.as_mut() {
                    let key = (ctx.delay_ns(path_budget) * 1000.0).round() as i64;
                    *hist.entry(key).or_insert(0) += 1;
                }
                if options.track_path && worst_endpoint.map_or(true, |w| path_budget < w) {
                    worst_endpoint = Some(path_budget);
                    critical_path = trace_back(&predecessor, net);
                    critical_path.push(PathHop { net, user: idx });
                }
            } else {
                for_each_comb_output(ctx, user, |out_net, _| {
                    let path_budget = records[out_net.index()].min_remaining_budget;
                    let share = share_of(path_budget);
                    tighten(delay + share);
                    net_remaining = net_remaining.min(path_budget - share);
                });
            }
        }
        records[net.index()].min_remaining_budget = net_remaining;
    }

    WalkResult {
        period,
        min_slack,
        endpoint_count,
        budgets,
        critical_path,
        histogram,
        records,
    }
}

/// Follows recorded predecessors from `net` back to a path source, returning
/// the hops in source-to-`net` order.
fn trace_back(predecessor: &[Option<PathHop>], net: NetId) -> Vec<PathHop> {
    let mut hops = Vec::new();
    let mut current = net;
    while let Some(hop) = predecessor.get(current.index()).copied().flatten() {
        hops.push(hop);
        current = hop.net;
    }
    hops.reverse();
    hops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockContext;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL: WalkOptions = WalkOptions {
        update_budgets: true,
        track_path: true,
        track_histogram: true,
    };

    fn walk(ctx: &MockContext) -> WalkResult {
        walk_paths(ctx, ALL, &DiagnosticSink::new()).unwrap()
    }

    /// ff0.Q -> lut0 -> lut1 -> ff1.D at 100 MHz (10 ns).
    fn two_lut_chain() -> (MockContext, [NetId; 3]) {
        let mut ctx = MockContext::new(100.0);
        let ff0 = ctx.ff("ff0", 500);
        let ff1 = ctx.ff("ff1", 500);
        let lut0 = ctx.lut("lut0", 1000);
        let lut1 = ctx.lut("lut1", 1000);
        let q = ctx.add_net("q");
        ctx.drive(q, ff0, "Q");
        ctx.connect(q, lut0, "I0", 500);
        let a = ctx.add_net("a");
        ctx.drive(a, lut0, "O");
        ctx.connect(a, lut1, "I0", 500);
        let b = ctx.add_net("b");
        ctx.drive(b, lut1, "O");
        ctx.connect(b, ff1, "D", 500);
        (ctx, [q, a, b])
    }

    #[test]
    fn forward_pass_accumulates_arrival_and_length() {
        let (ctx, [q, a, b]) = two_lut_chain();
        let result = walk(&ctx);
        assert_eq!(result.records[q.index()].max_arrival, Delay::from_ps(500));
        assert_eq!(result.records[a.index()].max_arrival, Delay::from_ps(2000));
        assert_eq!(result.records[b.index()].max_arrival, Delay::from_ps(3500));
        assert_eq!(result.records[b.index()].max_path_length, 2);
    }

    #[test]
    fn slack_is_shared_across_hops() {
        let (ctx, [q, a, b]) = two_lut_chain();
        let result = walk(&ctx);
        // Endpoint slack: 10000 - (3500 + 500) = 6000, three hops.
        assert_eq!(result.min_slack, Delay::from_ps(6000));
        assert_eq!(result.endpoint_count, 1);
        assert_eq!(result.budgets[b.index()][0], Delay::from_ps(2500));
        // b keeps 4000 for upstream; a's share is 4000 / 2.
        assert_eq!(result.budgets[a.index()][0], Delay::from_ps(2500));
        // a keeps 2000; q gets all of it.
        assert_eq!(result.budgets[q.index()][0], Delay::from_ps(2500));
    }

    #[test]
    fn zero_delay_design_gets_full_period() {
        let mut ctx = MockContext::new(50.0);
        let ff0 = ctx.ff("ff0", 0);
        let ff1 = ctx.ff("ff1", 0);
        let ff2 = ctx.ff("ff2", 0);
        let q = ctx.add_net("q");
        ctx.drive(q, ff0, "Q");
        ctx.connect(q, ff1, "D", 0);
        ctx.connect(q, ff2, "D", 0);

        let result = walk(&ctx);
        assert_eq!(result.period, Delay::from_ps(20_000));
        assert_eq!(result.min_slack, result.period);
        assert!(result.budgets[q.index()].iter().all(|b| *b == result.period));
    }

    #[test]
    fn single_stage_slack() {
        let mut ctx = MockContext::new(100.0);
        let ff0 = ctx.ff("ff0", 700);
        let ff1 = ctx.ff("ff1", 700);
        let q = ctx.add_net("q");
        ctx.drive(q, ff0, "Q");
        ctx.connect(q, ff1, "D", 1300);

        let result = walk(&ctx);
        assert_eq!(result.min_slack, Delay::from_ps(10_000 - 700 - 1300));
        assert_eq!(result.budgets[q.index()][0], Delay::from_ps(1300 + 8000));
    }

    #[test]
    fn override_fixes_budget_and_skips_length() {
        let (mut ctx, [q, a, b]) = two_lut_chain();
        ctx.override_delay(a, 0, 1200);
        let result = walk(&ctx);
        assert_eq!(result.records[a.index()].max_path_length, 1);
        assert_eq!(result.records[b.index()].max_path_length, 0);
        // 10000 - (500 + 500 + 1000 + 1200 + 1000 + 500): one budgeted hop left.
        assert_eq!(result.min_slack, Delay::from_ps(5300));
        assert_eq!(result.budgets[b.index()][0], Delay::from_ps(500 + 5300));
        assert_eq!(result.budgets[a.index()][0], Delay::from_ps(1200));
        // Nothing remains upstream of the overridden connection.
        assert_eq!(result.budgets[q.index()][0], Delay::from_ps(500));
    }

    #[test]
    fn budgets_only_tighten() {
        let (mut ctx, [q, ..]) = two_lut_chain();
        ctx.set_all_budgets(Delay::from_ps(100));
        let result = walk(&ctx);
        assert_eq!(result.budgets[q.index()][0], Delay::from_ps(100));
    }

    #[test]
    fn negative_slack_shrinks_budget_below_route_delay() {
        let mut ctx = MockContext::new(1000.0);
        let ff0 = ctx.ff("ff0", 600);
        let ff1 = ctx.ff("ff1", 600);
        let q = ctx.add_net("q");
        ctx.drive(q, ff0, "Q");
        ctx.connect(q, ff1, "D", 900);
        let result = walk(&ctx);
        assert_eq!(result.min_slack, Delay::from_ps(-500));
        assert_eq!(result.budgets[q.index()][0], Delay::from_ps(400));
    }

    #[test]
    fn critical_path_follows_worst_arrival() {
        let mut ctx = MockContext::new(100.0);
        let ff0 = ctx.ff("ff0", 100);
        let ff1 = ctx.ff("ff1", 100);
        let ff2 = ctx.ff("ff2", 100);
        let slow = ctx.lut("slow", 3000);
        let fast = ctx.lut("fast", 100);
        let q0 = ctx.add_net("q0");
        ctx.drive(q0, ff0, "Q");
        ctx.connect(q0, fast, "I0", 100);
        ctx.connect(q0, slow, "I0", 100);
        let f = ctx.add_net("f");
        ctx.drive(f, fast, "O");
        ctx.connect(f, ff1, "D", 100);
        let s = ctx.add_net("s");
        ctx.drive(s, slow, "O");
        ctx.connect(s, ff2, "D", 100);

        let result = walk(&ctx);
        assert_eq!(
            result.critical_path,
            vec![PathHop { net: q0, user: 1 }, PathHop { net: s, user: 0 }]
        );
        assert_eq!(result.min_slack, Delay::from_ps(10_000 - 3300));
    }

    #[test]
    fn no_endpoints_means_period_slack_and_empty_path() {
        let mut ctx = MockContext::new(100.0);
        let ff0 = ctx.ff("ff0", 100);
        let q = ctx.add_net("q");
        ctx.drive(q, ff0, "Q");
        let result = walk(&ctx);
        assert_eq!(result.min_slack, result.period);
        assert!(result.critical_path.is_empty());
        assert_eq!(result.histogram, Some(BTreeMap::new()));
    }

    #[test]
    fn histogram_conserves_endpoints() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..10 {
            let ctx = MockContext::random_pipeline(&mut rng, 5, 25);
            let result = walk(&ctx);
            let hist = result.histogram.unwrap();
            let total: u32 = hist.values().sum();
            assert_eq!(total as usize, result.endpoint_count);
            let lowest = hist.keys().next().copied();
            assert_eq!(
                lowest,
                (result.endpoint_count > 0).then_some(result.min_slack.as_ps())
            );
        }
    }

    #[test]
    fn repeated_walks_are_monotone() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut ctx = MockContext::random_pipeline(&mut rng, 4, 20);
        let first = walk(&ctx);
        ctx.apply_budgets(&first.budgets);
        let second = walk(&ctx);
        for (before, after) in first.budgets.iter().zip(&second.budgets) {
            for (b, a) in before.iter().zip(after) {
                assert!(a <= b);
            }
        }
        assert_eq!(first.min_slack, second.min_slack);
    }

    #[test]
    fn read_only_walk_returns_no_budget_table() {
        let (ctx, _) = two_lut_chain();
        let result = walk_paths(&ctx, WalkOptions::default(), &DiagnosticSink::new()).unwrap();
        assert!(result.budgets.is_empty());
        assert!(result.histogram.is_none());
        assert!(result.critical_path.is_empty());
        assert_eq!(result.min_slack, Delay::from_ps(6000));
    }
}
