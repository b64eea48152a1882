//! Final solution report and violation types.

use serde::{Deserialize, Serialize};

use super::{Problem, Route, RoutePartition};
use crate::evaluation::RouteEvaluator;

/// A type of constraint violation in a route or solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Route slot in the solution.
        route_index: usize,
        /// Load that exceeded capacity.
        load: i64,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Arrival after a time window closes (the depot's horizon included).
    TimeWindowViolated {
        /// Node where the violation occurred.
        stop: usize,
        /// Actual arrival time.
        arrival: f64,
        /// Time window due date.
        due: f64,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// The result of a solve: the best partition found, evaluated for reporting.
///
/// `paths` holds each route as handed to downstream consumers: the stops
/// framed by the entry and exit source (the depot when there is a single
/// source). Empty routes stay empty.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, RoutePartition, Solution, TimeWindow};
///
/// let costs = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
/// let problem = ProblemBuilder::new(costs)
///     .stop(1, 3, TimeWindow::unbounded())
///     .stop(2, 4, TimeWindow::unbounded())
///     .vehicles(2, 10)
///     .build()
///     .unwrap();
///
/// let partition = RoutePartition::new(vec![vec![1, 2], vec![]]);
/// let sol = Solution::from_partition(&problem, &partition, 0, 0);
/// assert_eq!(sol.paths(), &[vec![0, 1, 2, 0], vec![]]);
/// assert!((sol.total_cost() - 4.0).abs() < 1e-10);
/// assert_eq!(sol.route_loads(), vec![7, 0]);
/// assert!(sol.check(&problem));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    paths: Vec<Vec<usize>>,
    violations: Vec<Violation>,
    total_cost: f64,
    best_iteration: usize,
    iterations: usize,
}

impl Solution {
    /// Evaluates a partition into a report.
    ///
    /// `best_iteration` is the iteration at which the partition was found and
    /// `iterations` the number of search iterations executed.
    pub fn from_partition(
        problem: &Problem,
        partition: &RoutePartition,
        best_iteration: usize,
        iterations: usize,
    ) -> Self {
        let evaluator = RouteEvaluator::new(problem);
        let mut routes = Vec::with_capacity(partition.num_routes());
        let mut violations = Vec::new();
        for (slot, stops) in partition.routes().iter().enumerate() {
            let (route, mut found) = evaluator.build_route(slot, stops);
            routes.push(route);
            violations.append(&mut found);
        }
        let paths = partition
            .routes()
            .iter()
            .map(|stops| finalize(problem, stops))
            .collect();
        Self {
            total_cost: partition.total_cost(problem),
            routes,
            paths,
            violations,
            best_iteration,
            iterations,
        }
    }

    /// Evaluated routes, one per slot.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes framed by their entry and exit sources.
    pub fn paths(&self) -> &[Vec<usize>] {
        &self.paths
    }

    /// The bare routes (stops only), as a partition.
    pub fn partition(&self) -> RoutePartition {
        RoutePartition::new(self.routes.iter().map(|r| r.stops()).collect())
    }

    /// Total arc cost.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Load of every route.
    pub fn route_loads(&self) -> Vec<i64> {
        self.routes.iter().map(|r| r.total_load()).collect()
    }

    /// Time each vehicle is back at the depot.
    pub fn route_times(&self) -> Vec<f64> {
        self.routes.iter().map(|r| r.elapsed_time()).collect()
    }

    /// All constraint violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if no constraint is violated.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    /// Iteration at which this solution was found.
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Number of search iterations executed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of vehicles used.
    pub fn num_used_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Number of stops served.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Returns `true` if every stop is served exactly once and every route fits its vehicle.
    pub fn check(&self, problem: &Problem) -> bool {
        self.partition().covers_exactly(problem)
            && self
                .routes
                .iter()
                .all(|r| r.total_load() <= i64::from(problem.capacity(r.vehicle_id())))
    }
}

fn finalize(problem: &Problem, stops: &[usize]) -> Vec<usize> {
    let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
        return Vec::new();
    };
    let mut path = Vec::with_capacity(stops.len() + 2);
    if problem.first_source() {
        path.push(problem.entry_source(first));
    }
    path.extend_from_slice(stops);
    if problem.last_source() {
        path.push(problem.exit_source(last));
    }
    path
}
