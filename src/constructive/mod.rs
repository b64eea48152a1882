//! Constructive heuristics for building initial route partitions.
//!
//! - [`clarke_wright_savings`] — Clarke-Wright savings algorithm (1964) with
//!   capacity and time-window checks, O(n² log n)

mod clarke_wright;

pub use clarke_wright::clarke_wright_savings;
