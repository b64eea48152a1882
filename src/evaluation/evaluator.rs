//! Route evaluator that computes timing, load, and feasibility.

use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::models::{Problem, Route, RoutePartition, Violation, ViolationType, Visit};

/// How far a route or partition is from feasibility.
///
/// Ordered lexicographically: fewer time-infeasible routes first, then less
/// capacity overage. `Infeasibility::default()` is feasible.
///
/// # Examples
///
/// ```
/// use tabu_routing::evaluation::Infeasibility;
///
/// let late = Infeasibility { time_violations: 1, capacity_overage: 0 };
/// let heavy = Infeasibility { time_violations: 0, capacity_overage: 40 };
/// assert!(heavy < late);
/// assert!(Infeasibility::default().is_feasible());
/// assert_eq!((late + heavy).magnitude(), 41.0);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Infeasibility {
    /// Number of routes with at least one late arrival.
    pub time_violations: usize,
    /// Total load in excess of vehicle capacities.
    pub capacity_overage: i64,
}

impl Infeasibility {
    /// Returns `true` if nothing is violated.
    pub fn is_feasible(&self) -> bool {
        self.time_violations == 0 && self.capacity_overage == 0
    }

    /// A single scalar for reporting.
    pub fn magnitude(&self) -> f64 {
        self.time_violations as f64 + self.capacity_overage as f64
    }
}

impl Add for Infeasibility {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            time_violations: self.time_violations + rhs.time_violations,
            capacity_overage: self.capacity_overage + rhs.capacity_overage,
        }
    }
}

impl Sum for Infeasibility {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Cost and infeasibility of one route or of a whole partition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RouteScore {
    /// Arc cost including depot legs.
    pub cost: f64,
    /// Distance from feasibility.
    pub infeasibility: Infeasibility,
}

impl RouteScore {
    /// Orders by infeasibility, then by cost.
    pub fn cmp_by_quality(&self, other: &Self) -> Ordering {
        self.infeasibility
            .cmp(&other.infeasibility)
            .then(self.cost.total_cmp(&other.cost))
    }
}

impl Add for RouteScore {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cost: self.cost + rhs.cost,
            infeasibility: self.infeasibility + rhs.infeasibility,
        }
    }
}

impl Sum for RouteScore {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Simulates vehicle timing along routes and checks capacity and time windows.
///
/// The clock starts at 0 at the depot. Each arc adds its cost; arriving before
/// a window opens waits until `ready`; arriving after `due` is a violation. The
/// service time is added after every stop but not on the return to the depot,
/// whose window acts as the horizon.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::evaluation::RouteEvaluator;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
///
/// let costs = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
/// let problem = ProblemBuilder::new(costs)
///     .stop(1, 10, TimeWindow::new(0.0, 5.0).unwrap())
///     .stop(2, 20, TimeWindow::new(0.0, 8.0).unwrap())
///     .vehicles(1, 100)
///     .build()
///     .unwrap();
///
/// let evaluator = RouteEvaluator::new(&problem);
/// assert!(!evaluator.is_time_feasible(&[1, 2]));
/// let (route, violations) = evaluator.build_route(0, &[1, 2]);
/// assert_eq!(route.len(), 2);
/// assert_eq!(violations.len(), 1);
/// ```
pub struct RouteEvaluator<'a> {
    problem: &'a Problem,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given problem.
    pub fn new(problem: &'a Problem) -> Self {
        Self { problem }
    }

    /// Walks the route from the depot and back, calling `visit` with
    /// `(node, arrival, departure, late)` for every node reached, the final
    /// depot included. Stops early when `visit` returns `false`.
    fn walk<F>(&self, route: &[usize], mut visit: F) -> f64
    where
        F: FnMut(usize, f64, f64, bool) -> bool,
    {
        let depot = self.problem.depot();
        let mut clock = 0.0;
        let mut prev = depot;
        for &node in route.iter().chain(std::iter::once(&depot)) {
            let arrival = clock + self.problem.cost(prev, node);
            let tw = self.problem.time_window(node);
            let late = tw.is_violated(arrival);
            let start = arrival + tw.waiting_time(arrival);
            let departure = if node == depot {
                start
            } else {
                start + self.problem.service_time()
            };
            clock = departure;
            prev = node;
            if !visit(node, arrival, departure, late) {
                break;
            }
        }
        clock
    }

    /// Returns `true` if no arrival on the route, the return included, is late.
    pub fn is_time_feasible(&self, route: &[usize]) -> bool {
        let mut feasible = true;
        self.walk(route, |_, _, _, late| {
            feasible = !late;
            feasible
        });
        feasible
    }

    /// Time the vehicle is back at the depot, continuing past violations.
    pub fn elapsed_time(&self, route: &[usize]) -> f64 {
        self.walk(route, |_, _, _, _| true)
    }

    /// Cost and infeasibility of `route` served by vehicle `slot`.
    pub fn score(&self, slot: usize, route: &[usize]) -> RouteScore {
        RouteScore {
            cost: self.problem.route_cost(route),
            infeasibility: self.route_infeasibility(slot, route),
        }
    }

    /// Infeasibility of `route` served by vehicle `slot`.
    pub fn route_infeasibility(&self, slot: usize, route: &[usize]) -> Infeasibility {
        let load = self.problem.route_load(route);
        let capacity = i64::from(self.problem.capacity(slot));
        Infeasibility {
            time_violations: usize::from(!self.is_time_feasible(route)),
            capacity_overage: (load - capacity).max(0),
        }
    }

    /// Score of every route of the partition, in slot order.
    pub fn route_scores(&self, partition: &RoutePartition) -> Vec<RouteScore> {
        partition
            .routes()
            .iter()
            .enumerate()
            .map(|(slot, route)| self.score(slot, route))
            .collect()
    }

    /// Summed score of a partition.
    pub fn partition_score(&self, partition: &RoutePartition) -> RouteScore {
        self.route_scores(partition).into_iter().sum()
    }

    /// Builds an evaluated route for vehicle `slot`, computing timing and load.
    ///
    /// Returns the route and any constraint violations found.
    pub fn build_route(&self, slot: usize, stops: &[usize]) -> (Route, Vec<Violation>) {
        let depot = self.problem.depot();
        let mut route = Route::new(slot);
        let mut violations = Vec::new();
        let mut load: i64 = 0;

        let elapsed = self.walk(stops, |node, arrival, departure, late| {
            if late {
                violations.push(Violation::new(ViolationType::TimeWindowViolated {
                    stop: node,
                    arrival,
                    due: self.problem.time_window(node).due(),
                }));
            }
            if node != depot {
                load += i64::from(self.problem.demand(node));
                route.push_visit(Visit {
                    stop: node,
                    arrival_time: arrival,
                    departure_time: departure,
                    load_after: load,
                });
            }
            true
        });

        route.set_cost(self.problem.route_cost(stops));
        route.set_elapsed_time(if stops.is_empty() { 0.0 } else { elapsed });

        let capacity = self.problem.capacity(slot);
        if load > i64::from(capacity) {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index: slot,
                load,
                capacity,
            }));
        }

        (route, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{ProblemBuilder, TimeWindow};

    fn tw(ready: f64, due: f64) -> TimeWindow {
        TimeWindow::new(ready, due).expect("valid window")
    }

    /// Depot and three stops on a line at x = 0, 10, 20, 30.
    fn line(windows: [TimeWindow; 3], service: f64, horizon: f64) -> Problem {
        let pts = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)];
        let mut b = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts))
            .vehicles(2, 25)
            .service_time(service)
            .depot_window(tw(0.0, horizon));
        for (i, w) in windows.into_iter().enumerate() {
            b = b.stop(i + 1, 10, w);
        }
        b.build().expect("valid problem")
    }

    fn open() -> TimeWindow {
        TimeWindow::unbounded()
    }

    #[test]
    fn test_reversal_can_break_time_feasibility() {
        // Stop 1 closes at 10: reached first it is on time, reached after
        // stop 2 it is 20 late.
        let p = line([tw(0.0, 10.0), open(), open()], 0.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        assert!(eval.is_time_feasible(&[1, 2]));
        assert!(!eval.is_time_feasible(&[2, 1]));
        assert!(eval.is_time_feasible(&[1, 2]));
        assert_eq!(eval.elapsed_time(&[1, 2]), eval.elapsed_time(&[2, 1]));
        let (_, violations) = eval.build_route(0, &[2, 1]);
        assert_eq!(
            violations,
            vec![Violation::new(ViolationType::TimeWindowViolated {
                stop: 1,
                arrival: 30.0,
                due: 10.0,
            })]
        );
    }

    #[test]
    fn test_empty_route() {
        let p = line([open(), open(), open()], 0.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        assert!(eval.is_time_feasible(&[]));
        let (route, violations) = eval.build_route(0, &[]);
        assert!(route.is_empty());
        assert!(violations.is_empty());
        assert_eq!(route.cost(), 0.0);
        assert_eq!(route.elapsed_time(), 0.0);
        assert_eq!(eval.score(0, &[]), RouteScore::default());
    }

    #[test]
    fn test_waiting_and_service() {
        let p = line([tw(15.0, 20.0), open(), open()], 5.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        let (route, violations) = eval.build_route(0, &[1, 2]);
        assert!(violations.is_empty());
        let v = route.visits();
        // Arrive at 10, wait to 15, serve 5.
        assert_eq!(v[0].arrival_time, 10.0);
        assert_eq!(v[0].departure_time, 20.0);
        assert_eq!(v[1].arrival_time, 30.0);
        assert_eq!(v[1].departure_time, 35.0);
        assert_eq!(v[1].load_after, 20);
        // No service on the return leg.
        assert_eq!(route.elapsed_time(), 55.0);
        assert_eq!(route.cost(), 40.0);
    }

    #[test]
    fn test_arrival_at_due_is_on_time() {
        let p = line([tw(0.0, 10.0), open(), open()], 0.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        assert!(eval.is_time_feasible(&[1]));
        let p = line([tw(0.0, 9.5), open(), open()], 0.0, 100.0);
        assert!(!RouteEvaluator::new(&p).is_time_feasible(&[1]));
    }

    #[test]
    fn test_depot_horizon() {
        let p = line([open(), open(), open()], 0.0, 50.0);
        let eval = RouteEvaluator::new(&p);
        assert!(eval.is_time_feasible(&[1, 2]));
        // 0→3→0 returns at 60.
        assert!(!eval.is_time_feasible(&[3]));
        let (_, violations) = eval.build_route(1, &[3]);
        assert_eq!(
            violations,
            vec![Violation::new(ViolationType::TimeWindowViolated {
                stop: 0,
                arrival: 60.0,
                due: 50.0
            })]
        );
    }

    #[test]
    fn test_elapsed_time_continues_past_violation() {
        let p = line([open(), tw(0.0, 5.0), open()], 0.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        assert!(!eval.is_time_feasible(&[2, 3]));
        assert_eq!(eval.elapsed_time(&[2, 3]), 60.0);
    }

    #[test]
    fn test_infeasibility_ordering() {
        let p = line([tw(0.0, 5.0), open(), open()], 0.0, 100.0);
        let eval = RouteEvaluator::new(&p);
        let over = eval.route_infeasibility(0, &[2, 3, 1]);
        assert_eq!(
            over,
            Infeasibility {
                time_violations: 1,
                capacity_overage: 5
            }
        );
        let part = RoutePartition::new(vec![vec![2, 3], vec![1]]);
        let score = eval.partition_score(&part);
        assert_eq!(score.infeasibility.time_violations, 1);
        assert_eq!(score.infeasibility.capacity_overage, 0);
        assert!((score.cost - 80.0).abs() < 1e-10);

        let a = RouteScore {
            cost: 100.0,
            infeasibility: Infeasibility::default(),
        };
        let b = RouteScore {
            cost: 10.0,
            infeasibility: Infeasibility {
                time_violations: 0,
                capacity_overage: 1,
            },
        };
        assert_eq!(a.cmp_by_quality(&b), Ordering::Less);
    }
}
