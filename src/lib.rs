//! # tabu-routing
//!
//! Capacitated vehicle routing with time windows: a savings-based initial
//! builder and a tabu search that improves it through swap and relocate
//! moves, oscillating between feasible and infeasible regions.
//!
//! ## Modules
//!
//! - [`models`] — Problem description, route partition, solution report
//! - [`distance`] — Travel cost matrix
//! - [`evaluation`] — Time simulation, capacity and feasibility scoring
//! - [`constructive`] — Clarke-Wright savings builder
//! - [`neighborhood`] — Proximity lists, moves and candidate generation
//! - [`tabu`] — Tabu search engine, configuration and route resequencing
//!
//! ## Example
//!
//! ```
//! use tabu_routing::distance::DistanceMatrix;
//! use tabu_routing::models::{ProblemBuilder, TimeWindow};
//! use tabu_routing::tabu::{TabuConfig, TabuSearch};
//!
//! let pts = [(0.0, 0.0), (2.0, 0.0), (3.0, 1.0), (0.0, 4.0)];
//! let problem = ProblemBuilder::new(DistanceMatrix::from_coordinates(&pts))
//!     .stop(1, 4, TimeWindow::new(0.0, 10.0).unwrap())
//!     .stop(2, 3, TimeWindow::unbounded())
//!     .stop(3, 5, TimeWindow::new(2.0, 20.0).unwrap())
//!     .vehicles(2, 8)
//!     .service_time(1.0)
//!     .build()
//!     .unwrap();
//!
//! let solution = TabuSearch::new(&problem, TabuConfig::default().with_seed(7)).run();
//! assert!(solution.check(&problem));
//! assert_eq!(solution.paths().len(), 2);
//! ```

pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod models;
pub mod neighborhood;
pub mod tabu;
