//! Explicit search state threaded through every iteration.

use serde::{Deserialize, Serialize};

use super::{ResequenceCache, TabuList};
use crate::evaluation::RouteScore;
use crate::models::RoutePartition;

/// Neighborhood policy currently in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Default proximity width, all move types.
    Default,
    /// Wider neighborhoods; intra-route swaps off unless configured.
    Diversifying,
    /// Tabu list cleared, one neighbour per vehicle.
    Intensifying,
}

/// Everything the engine carries from one iteration to the next.
///
/// The engine's step function is `(state, problem, rng) -> state`; nothing
/// lives outside this struct.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub(crate) current: RoutePartition,
    pub(crate) current_score: RouteScore,
    pub(crate) best: RoutePartition,
    pub(crate) best_score: RouteScore,
    pub(crate) best_iteration: usize,
    pub(crate) iteration: usize,
    pub(crate) tabu: TabuList,
    pub(crate) phase: Phase,
    pub(crate) width: usize,
    pub(crate) phase_started: usize,
    pub(crate) phase_length: usize,
    pub(crate) diversifications: usize,
    pub(crate) cache: ResequenceCache,
}

impl SearchState {
    /// The partition being walked.
    pub fn current(&self) -> &RoutePartition {
        &self.current
    }

    /// Cost and infeasibility of the current partition.
    pub fn current_score(&self) -> RouteScore {
        self.current_score
    }

    /// Returns `true` if the current partition violates nothing.
    pub fn is_current_feasible(&self) -> bool {
        self.current_score.infeasibility.is_feasible()
    }

    /// Best partition seen so far.
    pub fn best(&self) -> &RoutePartition {
        &self.best
    }

    /// Cost and infeasibility of the best partition.
    pub fn best_score(&self) -> RouteScore {
        self.best_score
    }

    /// Iteration at which the best partition was found.
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Iterations executed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Iterations since the best partition was found.
    pub fn since_best(&self) -> usize {
        self.iteration - self.best_iteration
    }

    /// The tabu list.
    pub fn tabu(&self) -> &TabuList {
        &self.tabu
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current proximity width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of diversification phases entered.
    pub fn diversifications(&self) -> usize {
        self.diversifications
    }

    /// Accepted resequencings.
    pub fn cache(&self) -> &ResequenceCache {
        &self.cache
    }
}
