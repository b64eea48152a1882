//! Structural errors raised while building a [`Problem`](super::Problem) or
//! checking a start partition against it.

/// A malformed problem description.
///
/// Returned by [`ProblemBuilder::build`](super::ProblemBuilder::build) and by
/// [`RoutePartition::check_coverage`](super::RoutePartition::check_coverage)
/// before any search starts. Infeasibility (capacity or time window violations) is
/// never reported through this type.
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// The cost matrix has no nodes.
    EmptyMatrix,
    /// No vehicles were given.
    EmptyFleet,
    /// A vehicle has negative capacity.
    NegativeCapacity {
        /// Vehicle index.
        vehicle: usize,
        /// Offending capacity.
        capacity: i32,
    },
    /// A node index does not exist in the cost matrix.
    NodeOutOfRange {
        /// Offending node index.
        node: usize,
        /// Number of nodes in the matrix.
        size: usize,
    },
    /// A travel cost is negative or not finite.
    InvalidCost {
        /// Origin node.
        from: usize,
        /// Destination node.
        to: usize,
        /// Offending value.
        value: f64,
    },
    /// The service time is negative or not finite.
    InvalidServiceTime(f64),
    /// A stop coincides with the depot or one of the sources.
    StopIsSource(usize),
    /// A stop has a time window but no demand.
    MissingDemand(usize),
    /// A stop has a demand but no time window.
    MissingTimeWindow(usize),
    /// A stop has negative demand.
    NegativeDemand {
        /// Stop node index.
        stop: usize,
        /// Offending demand.
        demand: i32,
    },
    /// A route visits a node that is not a stop.
    NotAStop(usize),
    /// A stop is missing from the routes or visited more than once.
    StopCoverage {
        /// Stop node index.
        stop: usize,
        /// How often the routes visit it.
        visits: usize,
    },
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::EmptyMatrix => write!(f, "cost matrix has no nodes"),
            ProblemError::EmptyFleet => write!(f, "fleet has no vehicles"),
            ProblemError::NegativeCapacity { vehicle, capacity } => {
                write!(f, "vehicle {} has negative capacity {}", vehicle, capacity)
            }
            ProblemError::NodeOutOfRange { node, size } => {
                write!(f, "node {} is outside the {}-node cost matrix", node, size)
            }
            ProblemError::InvalidCost { from, to, value } => {
                write!(f, "cost from {} to {} is invalid: {}", from, to, value)
            }
            ProblemError::InvalidServiceTime(t) => write!(f, "service time {} is invalid", t),
            ProblemError::StopIsSource(s) => {
                write!(f, "stop {} is also the depot or a source", s)
            }
            ProblemError::MissingDemand(s) => write!(f, "stop {} has no demand", s),
            ProblemError::MissingTimeWindow(s) => write!(f, "stop {} has no time window", s),
            ProblemError::NegativeDemand { stop, demand } => {
                write!(f, "stop {} has negative demand {}", stop, demand)
            }
            ProblemError::NotAStop(n) => write!(f, "node {} in a route is not a stop", n),
            ProblemError::StopCoverage { stop, visits } => {
                write!(f, "stop {} is visited {} times instead of once", stop, visits)
            }
        }
    }
}

impl std::error::Error for ProblemError {}
