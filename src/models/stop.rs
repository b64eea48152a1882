//! Stop and time window types.

use serde::{Deserialize, Serialize};

/// A time window constraint for service at a stop (or for the return to the depot).
///
/// A vehicle arriving before `ready` waits until `ready`; arriving after `due`
/// is a violation. `due` may be `f64::INFINITY` for an open-ended window.
///
/// # Examples
///
/// ```
/// use tabu_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.ready() <= tw.due());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
///
/// let open = TimeWindow::unbounded();
/// assert!(!open.is_violated(1e12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    ready: f64,
    due: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `ready > due`, `ready` is not finite, or `due` is NaN.
    pub fn new(ready: f64, due: f64) -> Option<Self> {
        if !ready.is_finite() || due.is_nan() || ready > due {
            return None;
        }
        Some(Self { ready, due })
    }

    /// The window `[0, ∞)`, which never constrains arrival.
    pub fn unbounded() -> Self {
        Self {
            ready: 0.0,
            due: f64::INFINITY,
        }
    }

    /// Earliest service start.
    pub fn ready(&self) -> f64 {
        self.ready
    }

    /// Latest allowable arrival time.
    pub fn due(&self) -> f64 {
        self.due
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.ready && time <= self.due
    }

    /// Returns the waiting time if arriving at the given time.
    ///
    /// Zero if the vehicle arrives within or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.ready {
            self.ready - arrival
        } else {
            0.0
        }
    }

    /// Returns `true` if arriving at the given time violates this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.due
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// A delivery stop: a node of the cost matrix that must be visited exactly once.
///
/// # Examples
///
/// ```
/// use tabu_routing::models::{Stop, TimeWindow};
///
/// let s = Stop::new(3, 10, TimeWindow::new(0.0, 50.0).unwrap());
/// assert_eq!(s.id(), 3);
/// assert_eq!(s.demand(), 10);
/// assert_eq!(s.time_window().due(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    id: usize,
    demand: i32,
    time_window: TimeWindow,
}

impl Stop {
    /// Creates a stop.
    pub fn new(id: usize, demand: i32, time_window: TimeWindow) -> Self {
        Self {
            id,
            demand,
            time_window,
        }
    }

    /// Node index of this stop in the cost matrix.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Load delivered at this stop.
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Service time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }
}
