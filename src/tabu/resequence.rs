//! Exact or heuristic re-ordering of single routes.
//!
//! After a long stall the engine asks a [`Resequencer`] for a better stop
//! order of each route of the best partition. Membership never changes; only
//! the order does. A remote optimization service plugs in by implementing the
//! trait; [`TwoOptResequencer`] is the built-in local fallback.

use std::collections::HashMap;
use std::fmt;

use crate::evaluation::RouteEvaluator;
use crate::models::Problem;

/// Errors a resequencer may report. The engine logs them and keeps the
/// partition it had before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResequenceError {
    /// The service could not be reached.
    Unavailable(String),
    /// The service did not answer in time.
    Timeout,
    /// The route is longer than the resequencer accepts.
    RouteTooLarge { len: usize, max: usize },
    /// The returned order is not a permutation of the requested stops.
    InvalidOrder,
}

impl fmt::Display for ResequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResequenceError::Unavailable(reason) => {
                write!(f, "resequencing service unavailable: {reason}")
            }
            ResequenceError::Timeout => write!(f, "resequencing service timed out"),
            ResequenceError::RouteTooLarge { len, max } => {
                write!(f, "route of {len} stops exceeds resequencing limit of {max}")
            }
            ResequenceError::InvalidOrder => {
                write!(f, "resequenced order does not match the requested stops")
            }
        }
    }
}

impl std::error::Error for ResequenceError {}

/// One route to re-order, with the problem data relevant to it.
#[derive(Debug, Clone, Copy)]
pub struct ResequenceRequest<'a> {
    problem: &'a Problem,
    slot: usize,
    stops: &'a [usize],
}

impl<'a> ResequenceRequest<'a> {
    /// Request for the route of vehicle `slot` holding `stops`.
    pub fn new(problem: &'a Problem, slot: usize, stops: &'a [usize]) -> Self {
        Self {
            problem,
            slot,
            stops,
        }
    }

    /// Costs, demands, time windows and service time.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Vehicle slot serving the route.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Capacity of the serving vehicle.
    pub fn capacity(&self) -> i32 {
        self.problem.capacity(self.slot)
    }

    /// The stops in their current order.
    pub fn stops(&self) -> &'a [usize] {
        self.stops
    }
}

/// Re-orders the stops of one route.
///
/// Implementations return a permutation of `request.stops()`; anything else
/// is rejected by the engine.
pub trait Resequencer {
    /// Returns a new order for the requested stops.
    fn resequence(&mut self, request: &ResequenceRequest<'_>) -> Result<Vec<usize>, ResequenceError>;
}

impl<F> Resequencer for F
where
    F: FnMut(&ResequenceRequest<'_>) -> Result<Vec<usize>, ResequenceError>,
{
    fn resequence(&mut self, request: &ResequenceRequest<'_>) -> Result<Vec<usize>, ResequenceError> {
        self(request)
    }
}

/// Accepted orders keyed by the (sorted) stop set of the route.
#[derive(Debug, Clone, Default)]
pub struct ResequenceCache {
    orders: HashMap<Vec<usize>, Vec<usize>>,
}

impl ResequenceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(stops: &[usize]) -> Vec<usize> {
        let mut key = stops.to_vec();
        key.sort_unstable();
        key
    }

    /// Cached order for the same set of stops, in any order.
    pub fn get(&self, stops: &[usize]) -> Option<&[usize]> {
        self.orders.get(&Self::key(stops)).map(Vec::as_slice)
    }

    /// Remembers `order` for its stop set.
    pub fn insert(&mut self, order: Vec<usize>) {
        self.orders.insert(Self::key(&order), order);
    }

    /// Number of cached stop sets.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Local resequencer: first-improvement 2-opt over full route costs.
///
/// A segment reversal is accepted when it lowers the route cost and does not
/// make a time-feasible route late. Costs need not be symmetric.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
/// use tabu_routing::tabu::{ResequenceRequest, Resequencer, TwoOptResequencer};
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)];
/// let mut builder = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(1, 10);
/// for id in 1..4 {
///     builder = builder.stop(id, 1, TimeWindow::unbounded());
/// }
/// let problem = builder.build().unwrap();
///
/// let mut two_opt = TwoOptResequencer::default();
/// let order = two_opt
///     .resequence(&ResequenceRequest::new(&problem, 0, &[3, 1, 2]))
///     .unwrap();
/// assert!((problem.route_cost(&order) - 6.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct TwoOptResequencer {
    max_len: usize,
}

impl Default for TwoOptResequencer {
    fn default() -> Self {
        Self { max_len: 64 }
    }
}

impl TwoOptResequencer {
    /// Resequencer that refuses routes longer than `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Resequencer for TwoOptResequencer {
    fn resequence(&mut self, request: &ResequenceRequest<'_>) -> Result<Vec<usize>, ResequenceError> {
        let stops = request.stops();
        if stops.len() > self.max_len {
            return Err(ResequenceError::RouteTooLarge {
                len: stops.len(),
                max: self.max_len,
            });
        }
        let problem = request.problem();
        let evaluator = RouteEvaluator::new(problem);

        let mut current = stops.to_vec();
        let mut cost = problem.route_cost(&current);
        let mut on_time = evaluator.is_time_feasible(&current);
        let mut trial = current.clone();
        let mut improved = true;

        while improved {
            improved = false;
            let n = current.len();
            for i in 0..n.saturating_sub(1) {
                for j in i + 1..n {
                    trial.copy_from_slice(&current);
                    trial[i..=j].reverse();
                    let trial_cost = problem.route_cost(&trial);
                    if trial_cost >= cost - 1e-10 {
                        continue;
                    }
                    let trial_on_time = evaluator.is_time_feasible(&trial);
                    if on_time && !trial_on_time {
                        continue;
                    }
                    current.copy_from_slice(&trial);
                    cost = trial_cost;
                    on_time = trial_on_time;
                    improved = true;
                }
            }
        }

        Ok(current)
    }
}
