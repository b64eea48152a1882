//! Moves between route partitions and their tabu signatures.

use crate::models::RoutePartition;

/// A transition from one route partition to another.
///
/// Positions refer to the partition the move was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Exchange two stops inside one route.
    SwapWithin {
        route: usize,
        stop_a: usize,
        pos_a: usize,
        stop_b: usize,
        pos_b: usize,
    },
    /// Exchange a stop of one route with a stop of another.
    SwapAcross {
        stop_a: usize,
        route_a: usize,
        pos_a: usize,
        stop_b: usize,
        route_b: usize,
        pos_b: usize,
    },
    /// Move a stop to a position in another route.
    Relocate {
        stop: usize,
        from_route: usize,
        from_pos: usize,
        to_route: usize,
        to_pos: usize,
    },
}

/// Identity of a move for the tabu list, independent of positions.
///
/// Swap signatures are normalized so that the two orders of the same swap
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSignature {
    SwapWithin {
        route: usize,
        low: usize,
        high: usize,
    },
    /// `(stop, route it leaves)` for both stops, lower stop id first.
    SwapAcross {
        first: (usize, usize),
        second: (usize, usize),
    },
    Relocate {
        stop: usize,
        from: usize,
        to: usize,
    },
}

impl MoveSignature {
    fn swap_across(a: (usize, usize), b: (usize, usize)) -> Self {
        if a.0 <= b.0 {
            Self::SwapAcross {
                first: a,
                second: b,
            }
        } else {
            Self::SwapAcross {
                first: b,
                second: a,
            }
        }
    }
}

impl Move {
    /// Applies the move in place.
    ///
    /// The partition must be the one the move was generated from.
    pub fn apply(&self, partition: &mut RoutePartition) {
        match *self {
            Move::SwapWithin {
                route, pos_a, pos_b, ..
            } => partition.route_mut(route).swap(pos_a, pos_b),
            Move::SwapAcross {
                stop_a,
                route_a,
                pos_a,
                stop_b,
                route_b,
                pos_b,
            } => {
                partition.route_mut(route_a)[pos_a] = stop_b;
                partition.route_mut(route_b)[pos_b] = stop_a;
            }
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
                ..
            } => {
                let stop = partition.route_mut(from_route).remove(from_pos);
                partition.route_mut(to_route).insert(to_pos, stop);
            }
        }
    }

    /// Signature of this move.
    pub fn signature(&self) -> MoveSignature {
        match *self {
            Move::SwapWithin {
                route,
                stop_a,
                stop_b,
                ..
            } => MoveSignature::SwapWithin {
                route,
                low: stop_a.min(stop_b),
                high: stop_a.max(stop_b),
            },
            Move::SwapAcross {
                stop_a,
                route_a,
                stop_b,
                route_b,
                ..
            } => MoveSignature::swap_across((stop_a, route_a), (stop_b, route_b)),
            Move::Relocate {
                stop,
                from_route,
                to_route,
                ..
            } => MoveSignature::Relocate {
                stop,
                from: from_route,
                to: to_route,
            },
        }
    }

    /// Signature of the move that would undo this one.
    ///
    /// This is what goes on the tabu list once the move is applied.
    pub fn reverse_signature(&self) -> MoveSignature {
        match *self {
            Move::SwapWithin { .. } => self.signature(),
            Move::SwapAcross {
                stop_a,
                route_a,
                stop_b,
                route_b,
                ..
            } => MoveSignature::swap_across((stop_a, route_b), (stop_b, route_a)),
            Move::Relocate {
                stop,
                from_route,
                to_route,
                ..
            } => MoveSignature::Relocate {
                stop,
                from: to_route,
                to: from_route,
            },
        }
    }
}
