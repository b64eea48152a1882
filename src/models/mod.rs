//! Domain model types for capacitated routing with time windows.
//!
//! Provides the immutable problem description (stops with demands and time
//! windows, vehicles with capacities, a cost matrix with sources collapsed
//! into one depot), the mutable route partition the search works on, and the
//! evaluated solution report.

mod error;
mod partition;
mod problem;
mod route;
mod solution;
mod stop;
mod vehicle;

pub use error::ProblemError;
pub use partition::RoutePartition;
pub use problem::{Problem, ProblemBuilder};
pub use route::{Route, Visit};
pub use solution::{Solution, Violation, ViolationType};
pub use stop::{Stop, TimeWindow};
pub use vehicle::Vehicle;
