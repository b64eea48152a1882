//! Tabu search engine with strategic oscillation.
//!
//! - [`TabuConfig`] — tenure, phase and stopping parameters
//! - [`TabuList`] — forbidden move signatures with lifetimes
//! - [`SearchState`] / [`Phase`] — the state threaded through iterations
//! - [`TabuSearch`] — the engine
//! - [`Resequencer`] — pluggable single-route re-ordering, with
//!   [`TwoOptResequencer`] as the local implementation

mod config;
mod engine;
mod resequence;
mod state;
mod tabu_list;

pub use config::TabuConfig;
pub use engine::{StepOutcome, TabuSearch};
pub use resequence::{
    ResequenceCache, ResequenceError, ResequenceRequest, Resequencer, TwoOptResequencer,
};
pub use state::{Phase, SearchState};
pub use tabu_list::TabuList;
