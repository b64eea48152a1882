//! Neighborhood moves around a route partition.
//!
//! - [`ProximitySets`] — per-stop ranking of nearby stops
//! - [`Move`] / [`MoveSignature`] — swap-within, swap-across and relocate moves
//! - [`NeighborhoodGenerator`] — enumerates and scores [`Candidate`] moves

mod generator;
mod moves;
mod proximity;

pub use generator::{Candidate, NeighborhoodGenerator};
pub use moves::{Move, MoveSignature};
pub use proximity::ProximitySets;
