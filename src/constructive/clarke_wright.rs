//! Clarke-Wright savings algorithm with capacity and time-window checks.
//!
//! # Algorithm
//!
//! The savings algorithm (Clarke & Wright, 1964) links stops in decreasing
//! order of the savings of serving them together instead of on two separate
//! depot round trips:
//!
//! ```text
//! s(i, j) = d(0, i) + d(0, j) - d(i, j)
//! ```
//!
//! Each pair either opens a new route, extends a route at an endpoint, or
//! joins two routes end to end. A link through an interior stop (one not
//! adjacent to the depot) is skipped. Every candidate route is checked for
//! capacity and for time feasibility with its stops ordered by ready time.
//! Every pair is processed, so routes keep merging after the last stop has
//! been routed.
//!
//! When more routes come out than there are vehicles, the stops of the
//! lightest routes are moved into vehicles with room, largest demand first.
//! If that leaves some stop without room, the whole fleet is packed afresh
//! the same way and the attempt that strands less demand is kept.
//!
//! # Complexity
//!
//! O(n² log n) for sorting savings, plus O(n) per feasibility check.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use std::cmp::Reverse;

use crate::evaluation::RouteEvaluator;
use crate::models::{Problem, RoutePartition};

/// A savings value for linking two stops.
#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Builds an initial route partition with the savings heuristic.
///
/// The result holds one slot per vehicle at least (padded with empty
/// routes). If the heuristic needs more routes than there are vehicles, their
/// stops are moved into vehicles with room; stops that still do not fit stay
/// in overflow slots with no capacity. A stop whose demand alone exceeds
/// capacity ends up on its own route. Stops within each route are ordered by
/// ascending ready time. Deterministic: equal savings keep pair order.
///
/// # Examples
///
/// ```
/// use tabu_routing::constructive::clarke_wright_savings;
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
/// let mut builder = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, 30);
/// for id in 1..4 {
///     builder = builder.stop(id, 10, TimeWindow::unbounded());
/// }
/// let problem = builder.build().unwrap();
///
/// let partition = clarke_wright_savings(&problem);
/// assert!(partition.covers_exactly(&problem));
/// assert_eq!(partition.num_used_routes(), 1);
/// ```
pub fn clarke_wright_savings(problem: &Problem) -> RoutePartition {
    let stops: Vec<usize> = problem.stop_ids().collect();
    let depot = problem.depot();
    let capacity = problem.min_capacity();
    let evaluator = RouteEvaluator::new(problem);

    let fits = |members: &[usize]| {
        problem.route_load(members) <= i64::from(capacity)
            && evaluator.is_time_feasible(&by_ready_time(problem, members))
    };

    let mut savings = Vec::with_capacity(stops.len() * stops.len().saturating_sub(1) / 2);
    for (a, &i) in stops.iter().enumerate() {
        for &j in &stops[a + 1..] {
            let value = problem.cost(depot, i) + problem.cost(depot, j) - problem.cost(i, j);
            savings.push(Saving { i, j, value });
        }
    }
    savings.sort_by(|a, b| b.value.total_cmp(&a.value));

    let mut routes: Vec<Vec<usize>> = Vec::new();
    let mut route_of: Vec<Option<usize>> = vec![None; problem.costs().size()];

    for saving in &savings {
        let (i, j) = (saving.i, saving.j);
        match (route_of[i], route_of[j]) {
            (None, None) => {
                if fits(&[i, j]) {
                    route_of[i] = Some(routes.len());
                    route_of[j] = Some(routes.len());
                    routes.push(vec![i, j]);
                }
            }
            (Some(r), None) | (None, Some(r)) => {
                let (routed, free) = if route_of[i].is_some() { (i, j) } else { (j, i) };
                let Some(pos) = routes[r].iter().position(|&s| s == routed) else {
                    continue;
                };
                if is_interior(pos, routes[r].len()) {
                    continue;
                }
                let mut extended = routes[r].clone();
                extended.push(free);
                if !fits(&extended) {
                    continue;
                }
                if pos == 0 {
                    routes[r].insert(0, free);
                } else {
                    routes[r].push(free);
                }
                route_of[free] = Some(r);
            }
            (Some(ri), Some(rj)) if ri != rj => {
                let (Some(pi), Some(pj)) = (
                    routes[ri].iter().position(|&s| s == i),
                    routes[rj].iter().position(|&s| s == j),
                ) else {
                    continue;
                };
                if is_interior(pi, routes[ri].len()) || is_interior(pj, routes[rj].len()) {
                    continue;
                }
                let joined: Vec<usize> = routes[ri].iter().chain(&routes[rj]).copied().collect();
                if !fits(&joined) {
                    continue;
                }
                let mut head = std::mem::take(&mut routes[ri]);
                let mut tail = std::mem::take(&mut routes[rj]);
                if head.last() != Some(&i) {
                    head.reverse();
                }
                if tail.first() != Some(&j) {
                    tail.reverse();
                }
                head.append(&mut tail);
                for &s in &head {
                    route_of[s] = Some(ri);
                }
                routes[ri] = head;
            }
            _ => {}
        }
    }

    for &s in &stops {
        if route_of[s].is_none() {
            routes.push(vec![s]);
        }
    }

    let mut routes: Vec<Vec<usize>> = routes
        .into_iter()
        .filter(|r| !r.is_empty())
        .map(|r| by_ready_time(problem, &r))
        .collect();
    if routes.len() > problem.num_vehicles() {
        routes = settle_overflow(problem, &evaluator, routes);
    }

    let mut partition = RoutePartition::new(routes);
    partition.pad_to(problem.num_vehicles());
    partition
}

/// Moves the stops of routes beyond the fleet into vehicles with room.
fn settle_overflow(
    problem: &Problem,
    evaluator: &RouteEvaluator<'_>,
    mut routes: Vec<Vec<usize>>,
) -> Vec<Vec<usize>> {
    let fleet = problem.num_vehicles();
    routes.sort_by_key(|r| Reverse(problem.route_load(r)));
    let spilled: Vec<usize> = routes.split_off(fleet).into_iter().flatten().collect();

    let (kept, stranded) = place(problem, evaluator, routes, spilled);
    if stranded.is_empty() {
        return kept;
    }
    let (packed, repacked_stranded) = place(
        problem,
        evaluator,
        vec![Vec::new(); fleet],
        problem.stop_ids().collect(),
    );
    let (mut routes, stranded) =
        if problem.route_load(&repacked_stranded) < problem.route_load(&stranded) {
            (packed, repacked_stranded)
        } else {
            (kept, stranded)
        };
    routes.extend(stranded.into_iter().map(|s| vec![s]));
    routes
}

/// Inserts `stops`, largest demand first, into the vehicle with room where
/// the route stays on time and grows least. Returns the routes and the stops
/// no vehicle had room for.
fn place(
    problem: &Problem,
    evaluator: &RouteEvaluator<'_>,
    mut routes: Vec<Vec<usize>>,
    mut stops: Vec<usize>,
) -> (Vec<Vec<usize>>, Vec<usize>) {
    stops.sort_by_key(|&s| Reverse(problem.demand(s)));
    let mut stranded = Vec::new();
    for stop in stops {
        let demand = i64::from(problem.demand(stop));
        let best = routes
            .iter()
            .enumerate()
            .filter(|&(slot, r)| {
                problem.route_load(r) + demand <= i64::from(problem.capacity(slot))
            })
            .map(|(slot, r)| {
                let trial = insert_by_ready_time(problem, r, stop);
                let late = !evaluator.is_time_feasible(&trial);
                let growth = problem.route_cost(&trial) - problem.route_cost(r);
                (slot, late, growth, trial)
            })
            .min_by(|a, b| a.1.cmp(&b.1).then(a.2.total_cmp(&b.2)));
        match best {
            Some((slot, _, _, trial)) => routes[slot] = trial,
            None => stranded.push(stop),
        }
    }
    (routes, stranded)
}

fn insert_by_ready_time(problem: &Problem, route: &[usize], stop: usize) -> Vec<usize> {
    let ready = problem.ready_time(stop);
    let pos = route
        .iter()
        .position(|&s| problem.ready_time(s) > ready)
        .unwrap_or(route.len());
    let mut out = route.to_vec();
    out.insert(pos, stop);
    out
}

/// A stop is interior when neither of its neighbours is the depot.
fn is_interior(pos: usize, len: usize) -> bool {
    pos > 0 && pos + 1 < len
}

fn by_ready_time(problem: &Problem, members: &[usize]) -> Vec<usize> {
    let mut sorted = members.to_vec();
    sorted.sort_by(|&a, &b| problem.ready_time(a).total_cmp(&problem.ready_time(b)));
    sorted
}
