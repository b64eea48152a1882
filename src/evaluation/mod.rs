//! Route feasibility checking and cost evaluation.
//!
//! The single time simulation used everywhere: by the savings builder, the
//! neighborhood generator, the tabu engine and the final report.

mod evaluator;

pub use evaluator::{Infeasibility, RouteEvaluator, RouteScore};
