//! Tabu search over route partitions.
//!
//! # Algorithm
//!
//! 1. Build an initial partition with the savings heuristic
//! 2. At each iteration:
//!    a. Enumerate swap and relocate candidates around the current partition
//!    b. Aspiration: a feasible candidate that beats the best known solution is
//!       taken even if tabu, and the tabu list is cleared
//!    c. Otherwise take the best non-tabu candidate: by cost while the current
//!       partition is feasible (falling back to an infeasible one when nothing
//!       feasible improves), by infeasibility then cost while it is not
//!    d. Forbid the reverse of the applied move for a random tenure
//!    e. Cycle default, diversifying and intensifying phases on random
//!       thresholds
//!    f. After a long stall, resequence the routes of the best partition
//! 3. Stop once the best solution has not changed for the stall limit
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! Gendreau, M., Hertz, A. & Laporte, G. (1994). "A Tabu Search Heuristic for
//! the Vehicle Routing Problem", *Management Science* 40(10), 1276-1290.

use rand::Rng;

use super::{
    Phase, ResequenceError, ResequenceRequest, Resequencer, SearchState, TabuConfig, TabuList,
};
use crate::constructive::clarke_wright_savings;
use crate::evaluation::{RouteEvaluator, RouteScore};
use crate::models::{Problem, ProblemError, RoutePartition, Solution};
use crate::neighborhood::{Candidate, Move, NeighborhoodGenerator, ProximitySets};

const EPS: f64 = 1e-9;

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A move was applied.
    Moved {
        /// The applied move.
        mv: Move,
        /// Whether it was taken by aspiration.
        aspiration: bool,
    },
    /// No admissible candidate; the partition is unchanged.
    Idle,
}

/// Tabu search engine for capacitated routing with time windows.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
/// use tabu_routing::models::{ProblemBuilder, TimeWindow};
/// use tabu_routing::tabu::{TabuConfig, TabuSearch};
///
/// let pts = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (0.0, 2.0)];
/// let mut builder = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts)).vehicles(2, 10);
/// for id in 1..5 {
///     builder = builder.stop(id, 4, TimeWindow::unbounded());
/// }
/// let problem = builder.build().unwrap();
///
/// let config = TabuConfig::default().with_stall_factor(10).with_seed(1);
/// let solution = TabuSearch::new(&problem, config).run();
/// assert!(solution.check(&problem));
/// assert!(solution.is_feasible());
/// ```
pub struct TabuSearch<'a> {
    problem: &'a Problem,
    config: TabuConfig,
    proximity: ProximitySets,
    resequencer: Option<Box<dyn Resequencer + 'a>>,
}

impl<'a> TabuSearch<'a> {
    /// Creates an engine for the given problem.
    pub fn new(problem: &'a Problem, config: TabuConfig) -> Self {
        Self {
            problem,
            config,
            proximity: ProximitySets::new(problem),
            resequencer: None,
        }
    }

    /// Attaches a resequencer used after long stalls.
    pub fn with_resequencer<S: Resequencer + 'a>(mut self, resequencer: S) -> Self {
        self.resequencer = Some(Box::new(resequencer));
        self
    }

    /// Solves with the savings partition as start and the configured seed.
    pub fn run(&mut self) -> Solution {
        let mut rng = u_numflow::random::create_rng(self.config.seed.unwrap_or(42));
        self.run_with_rng(&mut rng)
    }

    /// Solves with the savings partition as start and the given RNG.
    pub fn run_with_rng<R: Rng>(&mut self, rng: &mut R) -> Solution {
        let initial = clarke_wright_savings(self.problem);
        self.solve(initial, rng)
    }

    /// Solves from a caller-supplied partition.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::NotAStop`] or [`ProblemError::StopCoverage`]
    /// unless the partition holds every stop exactly once.
    pub fn run_from<R: Rng>(
        &mut self,
        initial: RoutePartition,
        rng: &mut R,
    ) -> Result<Solution, ProblemError> {
        initial.check_coverage(self.problem)?;
        Ok(self.solve(initial, rng))
    }

    #[tracing::instrument(level = "debug", name = "tabu_search", skip_all, fields(stops = self.problem.num_stops()))]
    fn solve<R: Rng>(&mut self, initial: RoutePartition, rng: &mut R) -> Solution {
        if self.problem.num_stops() == 0 {
            return Solution::from_partition(
                self.problem,
                &RoutePartition::empty(self.problem.num_vehicles()),
                0,
                0,
            );
        }

        let mut state = self.initial_state(initial, rng);
        while !self.is_finished(&state) {
            self.step(&mut state, rng);
        }

        let best = state.best_score;
        tracing::info!(
            iterations = state.iteration,
            best_iteration = state.best_iteration,
            cost = best.cost,
            feasible = best.infeasibility.is_feasible(),
            "tabu search finished"
        );
        Solution::from_partition(
            self.problem,
            &state.best,
            state.best_iteration,
            state.iteration,
        )
    }

    /// Fresh state around `initial`, padded to one slot per vehicle.
    pub fn initial_state<R: Rng>(&self, mut initial: RoutePartition, rng: &mut R) -> SearchState {
        initial.pad_to(self.problem.num_vehicles());
        let score = RouteEvaluator::new(self.problem).partition_score(&initial);
        let n = self.problem.num_stops();
        SearchState {
            current: initial.clone(),
            current_score: score,
            best: initial,
            best_score: score,
            best_iteration: 0,
            iteration: 0,
            tabu: TabuList::new(),
            phase: Phase::Default,
            width: self.default_width(),
            phase_started: 0,
            phase_length: rng.random_range(self.config.threshold_range(n)),
            diversifications: 0,
            cache: Default::default(),
        }
    }

    /// Returns `true` once the stall limit or the iteration cap is reached.
    pub fn is_finished(&self, state: &SearchState) -> bool {
        state.since_best() >= self.config.stall_limit(self.problem.num_stops())
            || self
                .config
                .max_iterations
                .is_some_and(|max| state.iteration >= max)
    }

    /// Runs one iteration.
    pub fn step<R: Rng>(&mut self, state: &mut SearchState, rng: &mut R) -> StepOutcome {
        state.iteration += 1;

        let intra = state.phase != Phase::Diversifying || self.config.intra_swaps_while_diversifying;
        let candidates = NeighborhoodGenerator::new(self.problem, &self.proximity).candidates(
            &state.current,
            state.width(),
            intra,
        );

        let outcome = if let Some(c) = aspirant(&candidates, &state.best_score) {
            state.tabu.clear();
            self.apply(state, c, rng);
            StepOutcome::Moved {
                mv: c.mv,
                aspiration: true,
            }
        } else if let Some(c) = admissible(&candidates, state) {
            state.tabu.tick();
            self.apply(state, c, rng);
            StepOutcome::Moved {
                mv: c.mv,
                aspiration: false,
            }
        } else {
            state.tabu.tick();
            StepOutcome::Idle
        };

        tracing::debug!(
            iteration = state.iteration,
            cost = state.current_score.cost,
            time_violations = state.current_score.infeasibility.time_violations,
            capacity_overage = state.current_score.infeasibility.capacity_overage,
            candidates = candidates.len(),
            "iteration"
        );

        if state.iteration - state.phase_started >= state.phase_length {
            self.advance_phase(state, rng);
        }

        if self.config.resequence_after.is_some_and(|k| k > 0 && state.since_best() == k) {
            self.resequence(state);
        }

        outcome
    }

    fn default_width(&self) -> usize {
        self.config.default_width(self.problem.num_vehicles())
    }

    fn apply<R: Rng>(&self, state: &mut SearchState, c: &Candidate, rng: &mut R) {
        c.mv.apply(&mut state.current);
        state.current_score = c.score;
        let tenure = rng.random_range(self.config.tenure_range(self.problem.num_stops()));
        state.tabu.insert(c.mv.reverse_signature(), tenure);
        record_if_better(state);
    }

    fn advance_phase<R: Rng>(&self, state: &mut SearchState, rng: &mut R) {
        let default = self.default_width();
        let (phase, width) = match state.phase {
            Phase::Default => {
                state.diversifications += 1;
                (Phase::Diversifying, rng.random_range(default..=default.saturating_mul(2)))
            }
            Phase::Diversifying => {
                let k = self.config.intensify_every;
                if k > 0 && state.diversifications % k == 0 {
                    state.tabu.clear();
                    (Phase::Intensifying, self.problem.num_vehicles().max(1))
                } else {
                    (Phase::Default, default)
                }
            }
            Phase::Intensifying => (Phase::Default, default),
        };
        tracing::debug!(
            iteration = state.iteration,
            from = ?state.phase,
            to = ?phase,
            width,
            "phase change"
        );
        state.phase = phase;
        state.width = width;
        state.phase_started = state.iteration;
        state.phase_length = rng.random_range(self.config.threshold_range(self.problem.num_stops()));
    }

    /// Re-orders each route of the best partition. Any failure leaves the
    /// partitions as they were; orders accepted before it are still cached.
    fn resequence(&mut self, state: &mut SearchState) {
        let problem = self.problem;
        let Some(resequencer) = self.resequencer.as_mut() else {
            return;
        };
        let evaluator = RouteEvaluator::new(problem);
        let mut partition = state.best.clone();
        let mut accepted = Vec::new();

        for slot in 0..partition.num_routes() {
            let stops = partition.route(slot).to_vec();
            if stops.len() < 2 {
                continue;
            }
            let order = match state.cache.get(&stops) {
                Some(cached) => cached.to_vec(),
                None => {
                    let request = ResequenceRequest::new(problem, slot, &stops);
                    match resequencer
                        .resequence(&request)
                        .and_then(|order| check_permutation(&stops, order))
                    {
                        Ok(order) => order,
                        Err(error) => {
                            tracing::warn!(slot, %error, "resequencing failed, keeping routes");
                            for order in accepted {
                                state.cache.insert(order);
                            }
                            return;
                        }
                    }
                }
            };
            let before = evaluator.score(slot, &stops);
            let after = evaluator.score(slot, &order);
            if after.cost <= before.cost + EPS
                && after.infeasibility.time_violations <= before.infeasibility.time_violations
            {
                accepted.push(order.clone());
                *partition.route_mut(slot) = order;
            }
        }

        let score = evaluator.partition_score(&partition);
        if score.infeasibility <= state.best_score.infeasibility
            && score.cost <= state.best_score.cost + EPS
        {
            for order in accepted {
                state.cache.insert(order);
            }
            tracing::debug!(
                iteration = state.iteration,
                before = state.best_score.cost,
                after = score.cost,
                "resequenced best routes"
            );
            state.current = partition;
            state.current_score = score;
            record_if_better(state);
        }
    }
}

/// Cheapest feasible candidate, tabu or not, if it beats the best known solution.
fn aspirant<'c>(candidates: &'c [Candidate], best: &RouteScore) -> Option<&'c Candidate> {
    candidates
        .iter()
        .filter(|c| c.is_feasible())
        .min_by(|a, b| a.cost().total_cmp(&b.cost()))
        .filter(|c| !best.infeasibility.is_feasible() || c.cost() < best.cost - EPS)
}

/// Best non-tabu candidate under the policy for the current feasibility.
fn admissible<'c>(candidates: &'c [Candidate], state: &SearchState) -> Option<&'c Candidate> {
    let open: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| !state.tabu.contains(&c.mv.signature()))
        .collect();
    if state.is_current_feasible() {
        let feasible = open
            .iter()
            .copied()
            .filter(|c| c.is_feasible())
            .min_by(|a, b| a.cost().total_cmp(&b.cost()));
        match feasible {
            Some(c) if c.cost() < state.current_score.cost - EPS => Some(c),
            _ => open
                .iter()
                .copied()
                .filter(|c| !c.is_feasible())
                .min_by(|a, b| a.cost().total_cmp(&b.cost()))
                .or(feasible),
        }
    } else {
        open.into_iter()
            .min_by(|a, b| a.score.cmp_by_quality(&b.score))
    }
}

/// Promotes the current partition to best if it is better.
fn record_if_better(state: &mut SearchState) {
    let current = state.current_score;
    let best = state.best_score;
    let better = if current.infeasibility.is_feasible() {
        !best.infeasibility.is_feasible() || current.cost < best.cost - EPS
    } else {
        !best.infeasibility.is_feasible()
            && (current.infeasibility < best.infeasibility
                || (current.infeasibility == best.infeasibility && current.cost < best.cost - EPS))
    };
    if better {
        tracing::info!(
            iteration = state.iteration,
            cost = current.cost,
            feasible = current.infeasibility.is_feasible(),
            "new best solution"
        );
        state.best = state.current.clone();
        state.best_score = current;
        state.best_iteration = state.iteration;
    }
}

fn check_permutation(stops: &[usize], order: Vec<usize>) -> Result<Vec<usize>, ResequenceError> {
    let mut expected = stops.to_vec();
    let mut got = order.clone();
    expected.sort_unstable();
    got.sort_unstable();
    if expected == got {
        Ok(order)
    } else {
        Err(ResequenceError::InvalidOrder)
    }
}
