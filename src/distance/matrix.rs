//! Dense cost matrix.

use std::cmp::Ordering;

/// A dense n×n travel cost matrix stored in row-major order.
///
/// Costs double as travel times in the time window simulation. The matrix
/// need not be symmetric.
///
/// # Examples
///
/// ```
/// use tabu_routing::distance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a cost matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a Euclidean cost matrix from node coordinates.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Creates a cost matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Creates a cost matrix from nested rows.
    ///
    /// Returns `None` if the rows do not form a square grid.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            data: rows.iter().flatten().copied().collect(),
            size,
        })
    }

    /// Returns the cost from node `from` to node `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost from node `from` to node `to`.
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[from * self.size + to] = cost;
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the first entry that is negative or not finite, as `(from, to, value)`.
    pub fn first_invalid(&self) -> Option<(usize, usize, f64)> {
        self.data
            .iter()
            .position(|&c| !c.is_finite() || c < 0.0)
            .map(|k| (k / self.size, k % self.size, self.data[k]))
    }

    /// Returns the `k` candidates closest to `from`, nearest first.
    ///
    /// Equal costs keep the order in which candidates were given.
    pub fn k_nearest(&self, from: usize, candidates: &[usize], k: usize) -> Vec<usize> {
        let mut ranked: Vec<usize> = candidates.to_vec();
        ranked.sort_by(|&a, &b| {
            self.get(from, a)
                .partial_cmp(&self.get(from, b))
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DistanceMatrix {
        DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (0.0, 8.0)])
    }

    #[test]
    fn test_from_coordinates() {
        let dm = sample();
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert!(dm.get(0, 0).abs() < 1e-10);
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_from_rows() {
        let dm = DistanceMatrix::from_rows(&[vec![0.0, 2.0], vec![3.0, 0.0]]).expect("square");
        assert_eq!(dm.get(0, 1), 2.0);
        assert_eq!(dm.get(1, 0), 3.0);
        assert!(!dm.is_symmetric(1e-10));
        assert!(DistanceMatrix::from_rows(&[vec![0.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn test_first_invalid() {
        let mut dm = DistanceMatrix::new(3);
        assert!(dm.first_invalid().is_none());
        dm.set(1, 2, -1.0);
        assert_eq!(dm.first_invalid(), Some((1, 2, -1.0)));
        dm.set(0, 1, f64::NAN);
        let (from, to, _) = dm.first_invalid().expect("nan");
        assert_eq!((from, to), (0, 1));
    }

    #[test]
    fn test_k_nearest() {
        let dm = sample();
        assert_eq!(dm.k_nearest(0, &[2, 1], 1), vec![1]);
        assert_eq!(dm.k_nearest(0, &[2, 1], 5), vec![1, 2]);
        assert!(dm.k_nearest(0, &[], 3).is_empty());
    }

    #[test]
    fn test_k_nearest_ties_keep_input_order() {
        let dm = DistanceMatrix::from_data(3, vec![0.0, 4.0, 4.0, 4.0, 0.0, 4.0, 4.0, 4.0, 0.0])
            .expect("valid");
        assert_eq!(dm.k_nearest(0, &[2, 1], 1), vec![2]);
        assert_eq!(dm.k_nearest(0, &[1, 2], 1), vec![1]);
    }
}
