//! Regular 3-D lattice of points between two corners.

use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    corner_a: [f64; 3],
    corner_b: [f64; 3],
    counts: [usize; 3],
}

impl Grid {
    /// An axis with one point sits at `corner_a`; a zero count makes the grid
    /// empty.
    pub fn new(
        corner_a: [f64; 3],
        corner_b: [f64; 3],
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> StageResult<Self> {
        if corner_a.iter().chain(corner_b.iter()).any(|c| !c.is_finite()) {
            return Err(StageError::InvalidGrid {
                reason: "corners must be finite".into(),
            });
        }
        Ok(Self {
            corner_a,
            corner_b,
            counts: [nx, ny, nz],
        })
    }

    #[inline]
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn coord(&self, axis: usize, i: usize) -> f64 {
        let n = self.counts[axis];
        let a = self.corner_a[axis];
        if n <= 1 {
            return a;
        }
        a + (self.corner_b[axis] - a) * i as f64 / (n - 1) as f64
    }

    /// Point at lattice index `(x, y, z)`, or `None` when out of range.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<[f64; 3]> {
        let [nx, ny, nz] = self.counts;
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some([self.coord(0, x), self.coord(1, y), self.coord(2, z)])
    }

    /// All points, x outermost and z innermost. Restartable via `Clone`.
    pub fn points(&self) -> GridPoints {
        GridPoints {
            grid: *self,
            next: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GridPoints {
    grid: Grid,
    next: usize,
}

impl Iterator for GridPoints {
    type Item = [f64; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.grid.len() {
            return None;
        }
        let [_, ny, nz] = self.grid.counts;
        let i = self.next;
        self.next += 1;
        let z = i % nz;
        let y = (i / nz) % ny;
        let x = i / (ny * nz);
        self.grid.get(x, y, z)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.grid.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridPoints {}

impl<'a> IntoIterator for &'a Grid {
    type Item = [f64; 3];
    type IntoIter = GridPoints;

    fn into_iter(self) -> GridPoints {
        self.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_x_major_z_minor() {
        let grid = Grid::new([0.0; 3], [1.0, 1.0, 1.0], 2, 2, 2).unwrap();
        let pts: Vec<_> = grid.points().collect();
        assert_eq!(pts.len(), 8);
        assert_eq!(pts[0], [0.0, 0.0, 0.0]);
        assert_eq!(pts[1], [0.0, 0.0, 1.0]);
        assert_eq!(pts[2], [0.0, 1.0, 0.0]);
        assert_eq!(pts[4], [1.0, 0.0, 0.0]);
        assert_eq!(pts[7], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn single_point_axis_sits_on_corner_a() {
        let grid = Grid::new([2.0, 0.0, 0.0], [4.0, 3.0, 0.0], 1, 4, 1).unwrap();
        assert_eq!(grid.get(0, 3, 0), Some([2.0, 3.0, 0.0]));
        assert_eq!(grid.get(0, 1, 0), Some([2.0, 1.0, 0.0]));
        assert_eq!(grid.get(1, 0, 0), None);
        assert_eq!(grid.points().len(), 4);
    }

    #[test]
    fn zero_count_is_empty_and_iteration_restarts() {
        let empty = Grid::new([0.0; 3], [1.0; 3], 3, 0, 2).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.points().next(), None);

        let grid = Grid::new([0.0; 3], [1.0; 3], 3, 1, 1).unwrap();
        let iter = grid.points();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = (&grid).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first[1], [0.5, 0.0, 0.0]);
    }

    #[test]
    fn rejects_non_finite_corners() {
        assert!(matches!(
            Grid::new([f64::NAN, 0.0, 0.0], [1.0; 3], 1, 1, 1),
            Err(StageError::InvalidGrid { .. })
        ));
    }
}
