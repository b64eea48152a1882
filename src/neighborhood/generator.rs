//! Candidate move enumeration and scoring.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{Move, ProximitySets};
use crate::evaluation::{RouteEvaluator, RouteScore};
use crate::models::{Problem, RoutePartition};

/// A scored move: the partition it leads to is summarized by `score`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The move.
    pub mv: Move,
    /// Cost and infeasibility of the whole partition after the move.
    pub score: RouteScore,
}

impl Candidate {
    /// Returns `true` if the resulting partition violates nothing.
    pub fn is_feasible(&self) -> bool {
        self.score.infeasibility.is_feasible()
    }

    /// Total cost after the move.
    pub fn cost(&self) -> f64 {
        self.score.cost
    }
}

/// Enumerates swap and relocate moves around a partition.
///
/// Inter-route moves are restricted by proximity: a stop only moves to, or
/// swaps into, a route holding one of its `width` nearest stops. Relocation
/// into an empty route is always considered. Candidates come out grouped
/// by source route in slot order, which fixes tie-breaks.
///
/// Candidates are scored as deltas over per-route scores of the current
/// partition, so no partition is copied per candidate.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, RoutePartition, TimeWindow};
/// use tabu_routing::neighborhood::{NeighborhoodGenerator, ProximitySets};
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0)];
/// let mut builder = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, 10);
/// for id in 1..4 {
///     builder = builder.stop(id, 1, TimeWindow::unbounded());
/// }
/// let problem = builder.build().unwrap();
/// let prox = ProximitySets::new(&problem);
///
/// let part = RoutePartition::new(vec![vec![1, 3], vec![2]]);
/// let gen = NeighborhoodGenerator::new(&problem, &prox);
/// let candidates = gen.candidates(&part, 2, true);
/// assert!(!candidates.is_empty());
/// assert!(candidates.iter().all(|c| c.cost() > 0.0));
/// ```
pub struct NeighborhoodGenerator<'a> {
    problem: &'a Problem,
    proximity: &'a ProximitySets,
    evaluator: RouteEvaluator<'a>,
}

/// Per-route scores of the partition being explored.
struct Snapshot<'p> {
    partition: &'p RoutePartition,
    scores: Vec<RouteScore>,
    owners: Vec<Option<usize>>,
}

impl Snapshot<'_> {
    /// Total score with up to two routes replaced.
    fn with(&self, changed: &[(usize, RouteScore)]) -> RouteScore {
        self.scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                changed
                    .iter()
                    .find(|(r, _)| *r == i)
                    .map_or(*s, |(_, c)| *c)
            })
            .sum()
    }
}

impl<'a> NeighborhoodGenerator<'a> {
    /// Creates a generator over the given problem and proximity lists.
    pub fn new(problem: &'a Problem, proximity: &'a ProximitySets) -> Self {
        Self {
            problem,
            proximity,
            evaluator: RouteEvaluator::new(problem),
        }
    }

    /// All candidates around `partition`.
    ///
    /// `width` is the proximity width; `intra_swaps` enables swaps inside a
    /// route.
    pub fn candidates(
        &self,
        partition: &RoutePartition,
        width: usize,
        intra_swaps: bool,
    ) -> Vec<Candidate> {
        let snapshot = Snapshot {
            partition,
            scores: self.evaluator.route_scores(partition),
            owners: partition.owners(self.problem.costs().size()),
        };

        #[cfg(feature = "parallel")]
        let per_route: Vec<Vec<Candidate>> = (0..partition.num_routes())
            .into_par_iter()
            .map(|r| self.from_route(&snapshot, r, width, intra_swaps))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let per_route: Vec<Vec<Candidate>> = (0..partition.num_routes())
            .map(|r| self.from_route(&snapshot, r, width, intra_swaps))
            .collect();

        per_route.into_iter().flatten().collect()
    }

    fn from_route(
        &self,
        snap: &Snapshot<'_>,
        r: usize,
        width: usize,
        intra_swaps: bool,
    ) -> Vec<Candidate> {
        let mut out = Vec::new();
        if intra_swaps {
            self.swaps_within(snap, r, &mut out);
        }
        self.swaps_across(snap, r, width, &mut out);
        self.relocations(snap, r, width, &mut out);
        out
    }

    fn swaps_within(&self, snap: &Snapshot<'_>, r: usize, out: &mut Vec<Candidate>) {
        let route = snap.partition.route(r);
        let mut trial = route.to_vec();
        for a in 0..route.len() {
            for b in a + 1..route.len() {
                trial.swap(a, b);
                let score = snap.with(&[(r, self.evaluator.score(r, &trial))]);
                trial.swap(a, b);
                out.push(Candidate {
                    mv: Move::SwapWithin {
                        route: r,
                        stop_a: route[a],
                        pos_a: a,
                        stop_b: route[b],
                        pos_b: b,
                    },
                    score,
                });
            }
        }
    }

    fn swaps_across(&self, snap: &Snapshot<'_>, r: usize, width: usize, out: &mut Vec<Candidate>) {
        let route_a = snap.partition.route(r);
        let mut trial_a = route_a.to_vec();
        for s in r + 1..snap.partition.num_routes() {
            let route_b = snap.partition.route(s);
            let mut trial_b = route_b.to_vec();
            for (pa, &a) in route_a.iter().enumerate() {
                if !self.proximity.reaches(a, width, s, &snap.owners) {
                    continue;
                }
                for (pb, &b) in route_b.iter().enumerate() {
                    if !self.proximity.reaches(b, width, r, &snap.owners) {
                        continue;
                    }
                    trial_a[pa] = b;
                    trial_b[pb] = a;
                    let score = snap.with(&[
                        (r, self.evaluator.score(r, &trial_a)),
                        (s, self.evaluator.score(s, &trial_b)),
                    ]);
                    trial_a[pa] = a;
                    trial_b[pb] = b;
                    out.push(Candidate {
                        mv: Move::SwapAcross {
                            stop_a: a,
                            route_a: r,
                            pos_a: pa,
                            stop_b: b,
                            route_b: s,
                            pos_b: pb,
                        },
                        score,
                    });
                }
            }
        }
    }

    fn relocations(&self, snap: &Snapshot<'_>, r: usize, width: usize, out: &mut Vec<Candidate>) {
        let route = snap.partition.route(r);
        for (from_pos, &stop) in route.iter().enumerate() {
            let mut shrunk = route.to_vec();
            shrunk.remove(from_pos);
            let from_score = self.evaluator.score(r, &shrunk);

            for t in 0..snap.partition.num_routes() {
                if t == r {
                    continue;
                }
                let target = snap.partition.route(t);
                if !target.is_empty() && !self.proximity.reaches(stop, width, t, &snap.owners) {
                    continue;
                }
                let to_pos = self.insertion_point(t, target, stop);
                let mut grown = target.to_vec();
                grown.insert(to_pos, stop);
                let score = snap.with(&[(r, from_score), (t, self.evaluator.score(t, &grown))]);
                out.push(Candidate {
                    mv: Move::Relocate {
                        stop,
                        from_route: r,
                        from_pos,
                        to_route: t,
                        to_pos,
                    },
                    score,
                });
            }
        }
    }

    /// Cheapest time-feasible position for `stop` in `target` when the
    /// vehicle can carry it, otherwise the cheapest position outright.
    fn insertion_point(&self, slot: usize, target: &[usize], stop: usize) -> usize {
        let depot = self.problem.depot();
        let node_at = |i: usize| if i < target.len() { target[i] } else { depot };
        let delta = |pos: usize| {
            let prev = if pos == 0 { depot } else { target[pos - 1] };
            let next = node_at(pos);
            self.problem.cost(prev, stop) + self.problem.cost(stop, next)
                - self.problem.cost(prev, next)
        };

        let mut ranked: Vec<(usize, f64)> = (0..=target.len()).map(|p| (p, delta(p))).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        let cheapest = ranked.first().map_or(0, |&(p, _)| p);

        let fits = self.problem.route_load(target) + i64::from(self.problem.demand(stop))
            <= i64::from(self.problem.capacity(slot));
        if !fits {
            return cheapest;
        }
        let mut trial = Vec::with_capacity(target.len() + 1);
        ranked
            .iter()
            .map(|&(p, _)| p)
            .find(|&p| {
                trial.clear();
                trial.extend_from_slice(&target[..p]);
                trial.push(stop);
                trial.extend_from_slice(&target[p..]);
                self.evaluator.is_time_feasible(&trial)
            })
            .unwrap_or(cheapest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{ProblemBuilder, TimeWindow};

    fn problem(capacity: i32) -> Problem {
        let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)];
        let mut b = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, capacity);
        for id in 1..5 {
            b = b.stop(id, 2, TimeWindow::unbounded());
        }
        b.build().expect("valid problem")
    }

    #[test]
    fn test_scores_match_applied_partition() {
        let p = problem(4);
        let prox = ProximitySets::new(&p);
        let part = RoutePartition::new(vec![vec![1, 3], vec![2, 4]]);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let eval = RouteEvaluator::new(&p);
        let candidates = gen.candidates(&part, 3, true);
        assert!(!candidates.is_empty());
        for c in &candidates {
            let mut next = part.clone();
            c.mv.apply(&mut next);
            assert!(next.covers_exactly(&p));
            let fresh = eval.partition_score(&next);
            assert!((fresh.cost - c.score.cost).abs() < 1e-9);
            assert_eq!(fresh.infeasibility, c.score.infeasibility);
        }
    }

    #[test]
    fn test_intra_swaps_toggle() {
        let p = problem(10);
        let prox = ProximitySets::new(&p);
        let part = RoutePartition::new(vec![vec![1, 2, 3], vec![4]]);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let with = gen.candidates(&part, 2, true);
        let without = gen.candidates(&part, 2, false);
        assert_eq!(
            with.iter()
                .filter(|c| matches!(c.mv, Move::SwapWithin { .. }))
                .count(),
            3
        );
        assert!(without
            .iter()
            .all(|c| !matches!(c.mv, Move::SwapWithin { .. })));
    }

    #[test]
    fn test_proximity_limits_swaps() {
        let p = problem(10);
        let prox = ProximitySets::new(&p);
        // 1 and 2 lie on the x axis, 3 and 4 on the y axis.
        let part = RoutePartition::new(vec![vec![1, 2], vec![3, 4]]);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let narrow = gen.candidates(&part, 1, false);
        assert!(narrow.is_empty());
        let wide = gen.candidates(&part, 3, false);
        assert!(wide
            .iter()
            .any(|c| matches!(c.mv, Move::SwapAcross { .. })));
    }

    #[test]
    fn test_relocate_into_empty_route() {
        let p = problem(10);
        let prox = ProximitySets::new(&p);
        let part = RoutePartition::new(vec![vec![1, 2, 3, 4], vec![]]);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let candidates = gen.candidates(&part, 1, false);
        assert_eq!(candidates.len(), 4);
        assert!(candidates.iter().all(|c| matches!(
            c.mv,
            Move::Relocate {
                from_route: 0,
                to_route: 1,
                to_pos: 0,
                ..
            }
        )));
    }

    #[test]
    fn test_relocate_prefers_time_feasible_position() {
        // Stop 2 must be reached by t = 2.5; the cheap slots after 1 are
        // late once service time is counted, so it goes first.
        let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (5.0, 0.0)];
        let p = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts))
            .stop(1, 1, TimeWindow::unbounded())
            .stop(2, 1, TimeWindow::new(0.0, 2.5).expect("valid"))
            .stop(3, 1, TimeWindow::unbounded())
            .vehicles(2, 10)
            .service_time(1.0)
            .build()
            .expect("valid problem");
        let prox = ProximitySets::new(&p);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let part = RoutePartition::new(vec![vec![1, 3], vec![2]]);
        let c = gen
            .candidates(&part, 2, false)
            .into_iter()
            .find(|c| matches!(c.mv, Move::Relocate { stop: 2, .. }))
            .expect("relocation of stop 2");
        assert!(matches!(c.mv, Move::Relocate { to_pos: 0, .. }));
        assert!(c.is_feasible());
    }

    #[test]
    fn test_overload_is_kept_as_infeasible() {
        let p = problem(4);
        let prox = ProximitySets::new(&p);
        let part = RoutePartition::new(vec![vec![1, 2], vec![3, 4]]);
        let gen = NeighborhoodGenerator::new(&p, &prox);
        let relocations: Vec<_> = gen
            .candidates(&part, 3, false)
            .into_iter()
            .filter(|c| matches!(c.mv, Move::Relocate { .. }))
            .collect();
        assert!(!relocations.is_empty());
        assert!(relocations
            .iter()
            .all(|c| c.score.infeasibility.capacity_overage == 2));
    }
}
