//! Immutable problem description and its builder.

use std::collections::HashMap;

use super::{ProblemError, Stop, TimeWindow, Vehicle};
use crate::distance::DistanceMatrix;

/// A capacitated routing problem with time windows and a single (merged) depot.
///
/// Built once per solve with [`ProblemBuilder`] and never mutated afterwards.
/// Node indices refer to rows of the cost matrix. When several sources are
/// given they are collapsed into the depot: every stop remembers its nearest
/// entry and exit source, and the depot row/column of the matrix carries
/// those nearest costs.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
///
/// let costs = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
/// let problem = ProblemBuilder::new(costs)
///     .stop(1, 10, TimeWindow::unbounded())
///     .stop(2, 20, TimeWindow::unbounded())
///     .vehicles(2, 25)
///     .service_time(1.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(problem.num_stops(), 2);
/// assert_eq!(problem.demand(2), 20);
/// assert_eq!(problem.capacity(1), 25);
/// ```
#[derive(Debug, Clone)]
pub struct Problem {
    depot: usize,
    stops: Vec<Stop>,
    costs: DistanceMatrix,
    vehicles: Vec<Vehicle>,
    demands: Vec<i32>,
    windows: Vec<TimeWindow>,
    is_stop: Vec<bool>,
    entry_source: Vec<usize>,
    exit_source: Vec<usize>,
    service_time: f64,
    first_source: bool,
    last_source: bool,
}

impl Problem {
    /// The merged depot node.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// All stops, ordered by node index.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Stop node indices, ordered by node index.
    pub fn stop_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.stops.iter().map(|s| s.id())
    }

    /// Number of stops (N).
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if `node` is a stop of this problem.
    pub fn is_stop(&self, node: usize) -> bool {
        self.is_stop.get(node).copied().unwrap_or(false)
    }

    /// The fleet.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Number of vehicles (V).
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Capacity of route slot `slot`; zero for slots beyond the fleet.
    pub fn capacity(&self, slot: usize) -> i32 {
        self.vehicles.get(slot).map_or(0, |v| v.capacity())
    }

    /// Smallest vehicle capacity, used when building routes not yet bound to a vehicle.
    pub fn min_capacity(&self) -> i32 {
        self.vehicles.iter().map(|v| v.capacity()).min().unwrap_or(0)
    }

    /// Sum of vehicle capacities.
    pub fn total_capacity(&self) -> i64 {
        self.vehicles.iter().map(|v| v.capacity() as i64).sum()
    }

    /// Travel cost (and time) from `from` to `to`, after source collapsing.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs.get(from, to)
    }

    /// The collapsed cost matrix.
    pub fn costs(&self) -> &DistanceMatrix {
        &self.costs
    }

    /// Demand at `node`; zero for the depot and any non-stop node.
    pub fn demand(&self, node: usize) -> i32 {
        self.demands.get(node).copied().unwrap_or(0)
    }

    /// Total demand of all stops.
    pub fn total_demand(&self) -> i64 {
        self.stops.iter().map(|s| s.demand() as i64).sum()
    }

    /// Time window of `node`. For the depot this is the return horizon.
    pub fn time_window(&self, node: usize) -> TimeWindow {
        self.windows.get(node).copied().unwrap_or_default()
    }

    /// Ready time of `node`.
    pub fn ready_time(&self, node: usize) -> f64 {
        self.time_window(node).ready()
    }

    /// Service time spent at every stop (never at the depot).
    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// Source a vehicle should leave from to reach `stop` most cheaply.
    pub fn entry_source(&self, stop: usize) -> usize {
        self.entry_source.get(stop).copied().unwrap_or(self.depot)
    }

    /// Source a vehicle should return to after `stop` most cheaply.
    pub fn exit_source(&self, stop: usize) -> usize {
        self.exit_source.get(stop).copied().unwrap_or(self.depot)
    }

    /// Whether finalized routes start with their entry source.
    pub fn first_source(&self) -> bool {
        self.first_source
    }

    /// Whether finalized routes end with their exit source.
    pub fn last_source(&self) -> bool {
        self.last_source
    }

    /// Sum of demands along `route`, widened so large demands cannot overflow.
    pub fn route_load(&self, route: &[usize]) -> i64 {
        route.iter().map(|&s| i64::from(self.demand(s))).sum()
    }

    /// Arc cost of `depot → route[0] → … → route[n-1] → depot`; zero for an empty route.
    pub fn route_cost(&self, route: &[usize]) -> f64 {
        let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
            return 0.0;
        };
        let inner: f64 = route.windows(2).map(|w| self.cost(w[0], w[1])).sum();
        self.cost(self.depot, first) + inner + self.cost(last, self.depot)
    }
}

/// Builds a [`Problem`], validating it and collapsing multiple sources into the depot.
///
/// Stops are declared by giving them a demand and a time window, either
/// together with [`stop`](Self::stop) or separately. A stop with only one
/// of the two is a structural error.
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    costs: DistanceMatrix,
    depot: usize,
    sources: Vec<usize>,
    demands: HashMap<usize, i32>,
    windows: HashMap<usize, TimeWindow>,
    capacities: Vec<i32>,
    depot_window: TimeWindow,
    service_time: f64,
    first_source: bool,
    last_source: bool,
}

impl ProblemBuilder {
    /// Starts a problem over the given cost matrix, with depot 0 and no stops.
    pub fn new(costs: DistanceMatrix) -> Self {
        Self {
            costs,
            depot: 0,
            sources: Vec::new(),
            demands: HashMap::new(),
            windows: HashMap::new(),
            capacities: Vec::new(),
            depot_window: TimeWindow::unbounded(),
            service_time: 0.0,
            first_source: true,
            last_source: true,
        }
    }

    /// Sets the node that the sources are merged into.
    pub fn depot(mut self, depot: usize) -> Self {
        self.depot = depot;
        self
    }

    /// Sets the source nodes. Defaults to the depot alone.
    pub fn sources(mut self, sources: &[usize]) -> Self {
        self.sources = sources.to_vec();
        self
    }

    /// Declares a stop with its demand and time window.
    pub fn stop(self, id: usize, demand: i32, window: TimeWindow) -> Self {
        self.demand(id, demand).time_window(id, window)
    }

    /// Sets the demand of a stop.
    pub fn demand(mut self, id: usize, demand: i32) -> Self {
        self.demands.insert(id, demand);
        self
    }

    /// Sets the time window of a stop.
    pub fn time_window(mut self, id: usize, window: TimeWindow) -> Self {
        self.windows.insert(id, window);
        self
    }

    /// Sets the depot's return horizon.
    pub fn depot_window(mut self, window: TimeWindow) -> Self {
        self.depot_window = window;
        self
    }

    /// Adds `count` vehicles of equal capacity.
    pub fn vehicles(mut self, count: usize, capacity: i32) -> Self {
        self.capacities.extend(std::iter::repeat(capacity).take(count));
        self
    }

    /// Sets the per-vehicle capacities.
    pub fn capacities(mut self, capacities: &[i32]) -> Self {
        self.capacities = capacities.to_vec();
        self
    }

    /// Sets the service time spent at every stop.
    pub fn service_time(mut self, service_time: f64) -> Self {
        self.service_time = service_time;
        self
    }

    /// Whether finalized routes are prefixed with their entry source.
    pub fn first_source(mut self, on: bool) -> Self {
        self.first_source = on;
        self
    }

    /// Whether finalized routes are suffixed with their exit source.
    pub fn last_source(mut self, on: bool) -> Self {
        self.last_source = on;
        self
    }

    /// Validates the description and produces the immutable problem.
    pub fn build(self) -> Result<Problem, ProblemError> {
        let n = self.costs.size();
        if n == 0 {
            return Err(ProblemError::EmptyMatrix);
        }
        let in_range = |node: usize| {
            if node < n {
                Ok(node)
            } else {
                Err(ProblemError::NodeOutOfRange { node, size: n })
            }
        };

        in_range(self.depot)?;
        if self.capacities.is_empty() {
            return Err(ProblemError::EmptyFleet);
        }
        if let Some((vehicle, &capacity)) =
            self.capacities.iter().enumerate().find(|&(_, &c)| c < 0)
        {
            return Err(ProblemError::NegativeCapacity { vehicle, capacity });
        }
        if let Some((from, to, value)) = self.costs.first_invalid() {
            return Err(ProblemError::InvalidCost { from, to, value });
        }
        if !self.service_time.is_finite() || self.service_time < 0.0 {
            return Err(ProblemError::InvalidServiceTime(self.service_time));
        }

        let sources = if self.sources.is_empty() {
            vec![self.depot]
        } else {
            self.sources.clone()
        };
        for &s in &sources {
            in_range(s)?;
        }

        let mut ids: Vec<usize> = self
            .demands
            .keys()
            .chain(self.windows.keys())
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let mut stops = Vec::with_capacity(ids.len());
        for &id in &ids {
            in_range(id)?;
            if id == self.depot || sources.contains(&id) {
                return Err(ProblemError::StopIsSource(id));
            }
            let demand = *self
                .demands
                .get(&id)
                .ok_or(ProblemError::MissingDemand(id))?;
            let window = *self
                .windows
                .get(&id)
                .ok_or(ProblemError::MissingTimeWindow(id))?;
            if demand < 0 {
                return Err(ProblemError::NegativeDemand { stop: id, demand });
            }
            stops.push(Stop::new(id, demand, window));
        }

        let mut costs = self.costs;
        let mut entry_source = vec![self.depot; n];
        let mut exit_source = vec![self.depot; n];
        for &s in &sources {
            costs.set(self.depot, s, 0.0);
            costs.set(s, self.depot, 0.0);
        }
        for stop in &stops {
            let d = stop.id();
            let mut entry = sources[0];
            let mut exit = sources[0];
            for &s in &sources {
                if costs.get(s, d) < costs.get(entry, d) {
                    entry = s;
                }
                if costs.get(d, s) < costs.get(d, exit) {
                    exit = s;
                }
            }
            costs.set(self.depot, d, costs.get(entry, d));
            costs.set(d, self.depot, costs.get(d, exit));
            entry_source[d] = entry;
            exit_source[d] = exit;
        }

        let mut demands = vec![0; n];
        let mut windows = vec![TimeWindow::unbounded(); n];
        let mut is_stop = vec![false; n];
        for stop in &stops {
            demands[stop.id()] = stop.demand();
            windows[stop.id()] = *stop.time_window();
            is_stop[stop.id()] = true;
        }
        windows[self.depot] = self.depot_window;

        let vehicles = self
            .capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i, c))
            .collect();

        Ok(Problem {
            depot: self.depot,
            stops,
            costs,
            vehicles,
            demands,
            windows,
            is_stop,
            entry_source,
            exit_source,
            service_time: self.service_time,
            first_source: self.first_source,
            last_source: self.last_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_costs(n: usize) -> DistanceMatrix {
        let pts: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 0.0)).collect();
        DistanceMatrix::from_coordinates(&pts)
    }

    #[test]
    fn test_build_simple() {
        let problem = ProblemBuilder::new(line_costs(4))
            .stop(1, 5, TimeWindow::unbounded())
            .stop(3, 7, TimeWindow::new(0.0, 50.0).expect("valid"))
            .stop(2, 6, TimeWindow::unbounded())
            .vehicles(2, 10)
            .build()
            .expect("valid problem");
        assert_eq!(problem.depot(), 0);
        assert_eq!(problem.stop_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(problem.num_vehicles(), 2);
        assert_eq!(problem.capacity(0), 10);
        assert_eq!(problem.capacity(5), 0);
        assert_eq!(problem.demand(0), 0);
        assert_eq!(problem.total_demand(), 18);
        assert_eq!(problem.time_window(3).due(), 50.0);
        assert!(problem.is_stop(2));
        assert!(!problem.is_stop(0));
        assert_eq!(problem.entry_source(1), 0);
    }

    #[test]
    fn test_route_cost_and_load() {
        let problem = ProblemBuilder::new(line_costs(4))
            .stop(1, 5, TimeWindow::unbounded())
            .stop(2, 6, TimeWindow::unbounded())
            .stop(3, 7, TimeWindow::unbounded())
            .vehicles(1, 100)
            .build()
            .expect("valid problem");
        assert_eq!(problem.route_cost(&[]), 0.0);
        assert!((problem.route_cost(&[1, 2, 3]) - 6.0).abs() < 1e-10);
        // 0 -> 3 -> 1 -> 0 = 3 + 2 + 1
        assert!((problem.route_cost(&[3, 1]) - 6.0).abs() < 1e-10);
        assert_eq!(problem.route_load(&[1, 3]), 12);
    }

    #[test]
    fn test_route_load_does_not_overflow() {
        let problem = ProblemBuilder::new(line_costs(3))
            .stop(1, i32::MAX, TimeWindow::unbounded())
            .stop(2, i32::MAX, TimeWindow::unbounded())
            .vehicles(1, i32::MAX)
            .build()
            .expect("valid problem");
        assert_eq!(problem.route_load(&[1, 2]), 2 * i64::from(i32::MAX));
        assert_eq!(problem.route_load(&[1, 2]), problem.total_demand());
    }

    #[test]
    fn test_missing_time_window_is_structural() {
        let err = ProblemBuilder::new(line_costs(3))
            .stop(1, 5, TimeWindow::unbounded())
            .demand(2, 4)
            .vehicles(1, 10)
            .build()
            .expect_err("missing window");
        assert_eq!(err, ProblemError::MissingTimeWindow(2));
    }

    #[test]
    fn test_missing_demand_is_structural() {
        let err = ProblemBuilder::new(line_costs(3))
            .time_window(2, TimeWindow::unbounded())
            .vehicles(1, 10)
            .build()
            .expect_err("missing demand");
        assert_eq!(err, ProblemError::MissingDemand(2));
    }

    #[test]
    fn test_invalid_inputs() {
        let base = || ProblemBuilder::new(line_costs(3)).stop(1, 1, TimeWindow::unbounded());
        assert_eq!(base().build().expect_err("no fleet"), ProblemError::EmptyFleet);
        assert_eq!(
            base().capacities(&[5, -1]).build().expect_err("negative"),
            ProblemError::NegativeCapacity {
                vehicle: 1,
                capacity: -1
            }
        );
        assert_eq!(
            base().stop(9, 1, TimeWindow::unbounded()).vehicles(1, 5).build().expect_err("range"),
            ProblemError::NodeOutOfRange { node: 9, size: 3 }
        );
        assert_eq!(
            base().stop(0, 1, TimeWindow::unbounded()).vehicles(1, 5).build().expect_err("depot"),
            ProblemError::StopIsSource(0)
        );
        assert_eq!(
            base().stop(2, -3, TimeWindow::unbounded()).vehicles(1, 5).build().expect_err("neg"),
            ProblemError::NegativeDemand { stop: 2, demand: -3 }
        );
        assert!(matches!(
            base().vehicles(1, 5).service_time(-1.0).build(),
            Err(ProblemError::InvalidServiceTime(_))
        ));
        assert_eq!(
            ProblemBuilder::new(DistanceMatrix::new(0)).vehicles(1, 5).build().expect_err("empty"),
            ProblemError::EmptyMatrix
        );
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut costs = line_costs(3);
        costs.set(2, 1, -4.0);
        let err = ProblemBuilder::new(costs)
            .stop(1, 1, TimeWindow::unbounded())
            .vehicles(1, 5)
            .build()
            .expect_err("negative cost");
        assert_eq!(
            err,
            ProblemError::InvalidCost {
                from: 2,
                to: 1,
                value: -4.0
            }
        );
    }

    #[test]
    fn test_multi_source_collapse() {
        // Nodes: 0 = merged depot, 1 and 2 = sources, 3 and 4 = stops.
        let rows = vec![
            vec![0.0, 9.0, 9.0, 9.0, 9.0],
            vec![9.0, 0.0, 5.0, 2.0, 8.0],
            vec![9.0, 5.0, 0.0, 6.0, 1.0],
            vec![9.0, 7.0, 3.0, 0.0, 4.0],
            vec![9.0, 8.0, 6.0, 4.0, 0.0],
        ];
        let problem = ProblemBuilder::new(DistanceMatrix::from_rows(&rows).expect("square"))
            .sources(&[1, 2])
            .stop(3, 1, TimeWindow::unbounded())
            .stop(4, 1, TimeWindow::unbounded())
            .vehicles(1, 10)
            .build()
            .expect("valid problem");

        assert_eq!(problem.cost(0, 1), 0.0);
        assert_eq!(problem.cost(2, 0), 0.0);
        // Stop 3: cheapest entry from 1 (2.0), cheapest exit to 2 (3.0).
        assert_eq!(problem.entry_source(3), 1);
        assert_eq!(problem.exit_source(3), 2);
        assert_eq!(problem.cost(0, 3), 2.0);
        assert_eq!(problem.cost(3, 0), 3.0);
        // Stop 4: entry from 2 (1.0), exit to 2 (6.0).
        assert_eq!(problem.entry_source(4), 2);
        assert_eq!(problem.exit_source(4), 2);
        assert_eq!(problem.cost(0, 4), 1.0);
        assert_eq!(problem.cost(4, 0), 6.0);
        // Stop-to-stop costs are untouched.
        assert_eq!(problem.cost(3, 4), 4.0);
    }

    #[test]
    fn test_source_cannot_be_stop() {
        let err = ProblemBuilder::new(line_costs(4))
            .sources(&[1, 2])
            .stop(2, 1, TimeWindow::unbounded())
            .vehicles(1, 5)
            .build()
            .expect_err("source as stop");
        assert_eq!(err, ProblemError::StopIsSource(2));
    }
}
