//! Evaluated route and visit types.

use serde::{Deserialize, Serialize};

/// A single visit to a stop within an evaluated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Stop being visited.
    pub stop: usize,
    /// Arrival time at this stop.
    pub arrival_time: f64,
    /// Departure time (service start + service time).
    pub departure_time: f64,
    /// Cumulative load after this visit.
    pub load_after: i64,
}

/// An evaluated route: the visits of one vehicle with timing, cost and load.
///
/// The depot is not stored in `visits`; [`elapsed_time`](Self::elapsed_time)
/// includes the return leg.
///
/// # Examples
///
/// ```
/// use tabu_routing::models::{Route, Visit};
///
/// let mut route = Route::new(0);
/// route.push_visit(Visit {
///     stop: 1,
///     arrival_time: 10.0,
///     departure_time: 20.0,
///     load_after: 10,
/// });
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.vehicle_id(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: usize,
    visits: Vec<Visit>,
    cost: f64,
    elapsed_time: f64,
    total_load: i64,
}

impl Route {
    /// Creates an empty route for the given vehicle slot.
    pub fn new(vehicle_id: usize) -> Self {
        Self {
            vehicle_id,
            visits: Vec::new(),
            cost: 0.0,
            elapsed_time: 0.0,
            total_load: 0,
        }
    }

    /// Appends a visit to the end of this route.
    pub fn push_visit(&mut self, visit: Visit) {
        self.total_load = visit.load_after;
        self.visits.push(visit);
    }

    /// Vehicle slot serving this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// The ordered visits.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Number of stops visited.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if this vehicle is not used.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Stop IDs in visit order.
    pub fn stops(&self) -> Vec<usize> {
        self.visits.iter().map(|v| v.stop).collect()
    }

    /// Arc cost including both depot legs.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Time at which the vehicle is back at the depot.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Total load served by this route.
    pub fn total_load(&self) -> i64 {
        self.total_load
    }

    /// Sets the arc cost (used by the evaluator).
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    /// Sets the elapsed time (used by the evaluator).
    pub fn set_elapsed_time(&mut self, t: f64) {
        self.elapsed_time = t;
    }
}
