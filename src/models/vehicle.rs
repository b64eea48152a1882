//! Vehicle type with capacity.

/// A vehicle of the fleet. Route slot `i` of a partition is served by vehicle `i`.
///
/// # Examples
///
/// ```
/// use tabu_routing::models::Vehicle;
///
/// let v = Vehicle::new(0, 200);
/// assert_eq!(v.id(), 0);
/// assert_eq!(v.capacity(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: usize,
    capacity: i32,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and capacity.
    pub fn new(id: usize, capacity: i32) -> Self {
        Self { id, capacity }
    }

    /// Vehicle ID (its route slot).
    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }
}
