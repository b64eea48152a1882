//! Per-stop proximity lists.

use crate::models::Problem;

/// For each stop, every other stop ranked by travel cost from it.
///
/// A neighborhood of width `k` looks at the first `k` entries. Ranking once
/// lets the search widen and narrow the neighborhood between phases without
/// recomputing anything.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
/// use tabu_routing::neighborhood::ProximitySets;
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (9.0, 0.0)];
/// let mut builder = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, 10);
/// for id in 1..4 {
///     builder = builder.stop(id, 1, TimeWindow::unbounded());
/// }
/// let problem = builder.build().unwrap();
///
/// let prox = ProximitySets::new(&problem);
/// assert_eq!(prox.nearest(1, 1), &[2]);
/// assert_eq!(prox.nearest(3, 5), &[2, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct ProximitySets {
    ranked: Vec<Vec<usize>>,
}

impl ProximitySets {
    /// Ranks every stop's neighbours. Non-stop nodes get empty lists.
    pub fn new(problem: &Problem) -> Self {
        let stops: Vec<usize> = problem.stop_ids().collect();
        let mut ranked = vec![Vec::new(); problem.costs().size()];
        for &s in &stops {
            let others: Vec<usize> = stops.iter().copied().filter(|&o| o != s).collect();
            ranked[s] = problem.costs().k_nearest(s, &others, others.len());
        }
        Self { ranked }
    }

    /// The `width` stops closest to `stop`, nearest first.
    ///
    /// Clamped to the number of other stops.
    pub fn nearest(&self, stop: usize, width: usize) -> &[usize] {
        let list = self.ranked.get(stop).map_or(&[][..], |l| l.as_slice());
        &list[..width.min(list.len())]
    }

    /// Returns `true` if one of the `width` stops closest to `stop` is
    /// currently in route `route`, according to `owners` (owning route per node).
    pub fn reaches(
        &self,
        stop: usize,
        width: usize,
        route: usize,
        owners: &[Option<usize>],
    ) -> bool {
        self.nearest(stop, width)
            .iter()
            .any(|&n| owners.get(n).copied().flatten() == Some(route))
    }
}
