//! Travel cost matrices.
//!
//! Provides a dense cost matrix; costs are also used as travel times.

mod matrix;

pub use matrix::DistanceMatrix;
