//! Route partition: the mutable assignment of stops to vehicle slots.

use super::{Problem, ProblemError};

/// An ordered list of routes, one slot per vehicle, each an ordered list of stops.
///
/// The depot is implicit at both ends of every route. While searching, every
/// stop of the problem appears in exactly one route exactly once; routes may
/// be empty. Derived values (loads, costs) are always recomputed from the
/// routes, never cached.
///
/// # Examples
///
/// ```
/// use tabu_routing::models::RoutePartition;
///
/// let p = RoutePartition::new(vec![vec![1, 2], vec![], vec![3]]);
/// assert_eq!(p.num_routes(), 3);
/// assert_eq!(p.num_stops(), 3);
/// assert_eq!(p.locate(3), Some((2, 0)));
/// assert_eq!(p.route_of(7), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutePartition {
    routes: Vec<Vec<usize>>,
}

impl RoutePartition {
    /// Wraps the given routes.
    pub fn new(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    /// A partition of `slots` empty routes.
    pub fn empty(slots: usize) -> Self {
        Self {
            routes: vec![Vec::new(); slots],
        }
    }

    /// The routes, one per slot.
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// The route in slot `index`.
    pub fn route(&self, index: usize) -> &[usize] {
        &self.routes[index]
    }

    pub(crate) fn route_mut(&mut self, index: usize) -> &mut Vec<usize> {
        &mut self.routes[index]
    }

    /// Number of route slots.
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Number of non-empty routes.
    pub fn num_used_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Number of stops across all routes.
    pub fn num_stops(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }

    /// Pads with empty routes until there are at least `slots` routes.
    pub fn pad_to(&mut self, slots: usize) {
        if self.routes.len() < slots {
            self.routes.resize(slots, Vec::new());
        }
    }

    /// Slot and position of `stop`, if it is routed.
    pub fn locate(&self, stop: usize) -> Option<(usize, usize)> {
        self.routes
            .iter()
            .enumerate()
            .find_map(|(r, route)| route.iter().position(|&s| s == stop).map(|p| (r, p)))
    }

    /// Slot of the route containing `stop`, if any.
    pub fn route_of(&self, stop: usize) -> Option<usize> {
        self.locate(stop).map(|(r, _)| r)
    }

    /// Owning slot of every node, indexed by node id (`None` for unrouted nodes).
    pub fn owners(&self, nodes: usize) -> Vec<Option<usize>> {
        let mut owner = vec![None; nodes];
        for (r, route) in self.routes.iter().enumerate() {
            for &s in route {
                if let Some(slot) = owner.get_mut(s) {
                    *slot = Some(r);
                }
            }
        }
        owner
    }

    /// Load of the route in slot `index`.
    pub fn route_load(&self, problem: &Problem, index: usize) -> i64 {
        problem.route_load(&self.routes[index])
    }

    /// Load of every route, in slot order.
    pub fn route_loads(&self, problem: &Problem) -> Vec<i64> {
        self.routes.iter().map(|r| problem.route_load(r)).collect()
    }

    /// Arc cost of every route, depot legs included, in slot order.
    pub fn route_costs(&self, problem: &Problem) -> Vec<f64> {
        self.routes.iter().map(|r| problem.route_cost(r)).collect()
    }

    /// Sum of arc costs over all routes, depot legs included.
    pub fn total_cost(&self, problem: &Problem) -> f64 {
        self.routes.iter().map(|r| problem.route_cost(r)).sum()
    }

    /// Returns `true` if the routes hold exactly the problem's stops, each once.
    pub fn covers_exactly(&self, problem: &Problem) -> bool {
        self.check_coverage(problem).is_ok()
    }

    /// Checks that the routes hold exactly the problem's stops, each once.
    ///
    /// Reports the first node that is not a stop, or else the lowest stop
    /// that is missing or repeated.
    pub fn check_coverage(&self, problem: &Problem) -> Result<(), ProblemError> {
        let mut visits = vec![0usize; problem.costs().size()];
        for &s in self.routes.iter().flatten() {
            if !problem.is_stop(s) {
                return Err(ProblemError::NotAStop(s));
            }
            visits[s] += 1;
        }
        match problem.stop_ids().find(|&s| visits[s] != 1) {
            Some(stop) => Err(ProblemError::StopCoverage {
                stop,
                visits: visits[stop],
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{ProblemBuilder, TimeWindow};

    fn problem() -> Problem {
        let pts: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let mut b = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, 10);
        for id in 1..5 {
            b = b.stop(id, id as i32, TimeWindow::unbounded());
        }
        b.build().expect("valid problem")
    }

    #[test]
    fn test_loads_and_costs() {
        let p = problem();
        let part = RoutePartition::new(vec![vec![1, 2], vec![4, 3]]);
        assert_eq!(part.route_loads(&p), vec![3, 7]);
        assert_eq!(part.route_load(&p, 1), 7);
        // 0→1→2→0 = 4, 0→4→3→0 = 8
        assert_eq!(part.route_costs(&p), vec![4.0, 8.0]);
        assert!((part.total_cost(&p) - 12.0).abs() < 1e-10);
    }

    #[test]
    fn test_total_cost_is_pure() {
        let p = problem();
        let part = RoutePartition::new(vec![vec![3, 1], vec![2, 4]]);
        let a = part.total_cost(&p);
        let b = part.total_cost(&p);
        assert_eq!(a, b);
        let summed: f64 = part.route_costs(&p).iter().sum();
        assert!((a - summed).abs() < 1e-10);
    }

    #[test]
    fn test_covers_exactly() {
        let p = problem();
        assert!(RoutePartition::new(vec![vec![1, 2], vec![3, 4]]).covers_exactly(&p));
        assert!(RoutePartition::new(vec![vec![1, 2, 3, 4], vec![]]).covers_exactly(&p));
        assert!(!RoutePartition::new(vec![vec![1, 2], vec![3]]).covers_exactly(&p));
        assert!(!RoutePartition::new(vec![vec![1, 2, 2], vec![3, 4]]).covers_exactly(&p));
        assert!(!RoutePartition::new(vec![vec![0, 1, 2], vec![3, 4]]).covers_exactly(&p));
    }

    #[test]
    fn test_check_coverage_names_the_fault() {
        let p = problem();
        let missing = RoutePartition::new(vec![vec![1, 2], vec![3]]);
        assert_eq!(
            missing.check_coverage(&p),
            Err(ProblemError::StopCoverage { stop: 4, visits: 0 })
        );
        let repeated = RoutePartition::new(vec![vec![1, 3], vec![3, 2, 4]]);
        assert_eq!(
            repeated.check_coverage(&p),
            Err(ProblemError::StopCoverage { stop: 3, visits: 2 })
        );
        let depot = RoutePartition::new(vec![vec![0, 1, 2], vec![3, 4]]);
        assert_eq!(depot.check_coverage(&p), Err(ProblemError::NotAStop(0)));
        let beyond = RoutePartition::new(vec![vec![1, 2, 3, 4, 9]]);
        assert_eq!(beyond.check_coverage(&p), Err(ProblemError::NotAStop(9)));
    }

    #[test]
    fn test_owners_and_padding() {
        let mut part = RoutePartition::new(vec![vec![2], vec![1, 4]]);
        part.pad_to(4);
        assert_eq!(part.num_routes(), 4);
        assert_eq!(part.num_used_routes(), 2);
        let owners = part.owners(5);
        assert_eq!(owners, vec![None, Some(1), Some(0), None, Some(1)]);
        assert_eq!(part.locate(4), Some((1, 1)));
        part.pad_to(2);
        assert_eq!(part.num_routes(), 4);
    }
}
