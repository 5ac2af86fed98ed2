//! Proximity lookups over node locations
//!
//! Implementations must return neighbors deterministically: ascending by node
//! id, never including the center itself, with inclusive comparison against
//! the squared distance threshold. Every index must agree exactly with
//! [`BruteForceIndex`], which is kept as the correctness baseline.

use std::collections::HashMap;

use super::{FeatureError, NodeId, Point, Result};

/// Query interface for "which nodes lie within the threshold of this one"
pub trait ProximityIndex: Send + Sync {
    /// Ids of all other nodes within the threshold of `center`, ascending
    ///
    /// Fails with `NodeNotFound` when `center` is not one of the locations
    /// the index was built from.
    fn neighbors(&self, center: NodeId) -> Result<Vec<NodeId>>;

    /// Get the name of this index
    fn name(&self) -> &'static str;
}

/// Full O(n²) scan over every location
pub struct BruteForceIndex<'a> {
    locations: &'a [Point],
    squared_distance_threshold: f64,
}

impl<'a> BruteForceIndex<'a> {
    pub fn new(locations: &'a [Point], squared_distance_threshold: f64) -> Self {
        Self {
            locations,
            squared_distance_threshold,
        }
    }
}

impl ProximityIndex for BruteForceIndex<'_> {
    fn neighbors(&self, center: NodeId) -> Result<Vec<NodeId>> {
        let origin = location_of(self.locations, center)?;
        Ok(self
            .locations
            .iter()
            .enumerate()
            .filter(|(id, point)| {
                *id != center && origin.sqr_dist(point) <= self.squared_distance_threshold
            })
            .map(|(id, _)| id)
            .collect())
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }
}

fn location_of(locations: &[Point], center: NodeId) -> Result<Point> {
    locations
        .get(center)
        .copied()
        .ok_or_else(|| FeatureError::node_not_found(center))
}

type Cell = (i64, i64);

/// Uniform grid hash with cells one search radius wide
///
/// Any point within the radius of a center lies in the center's cell or one
/// of its eight neighbors, so a query only inspects a small block of cells.
pub struct GridIndex<'a> {
    locations: &'a [Point],
    squared_distance_threshold: f64,
    radius: f64,
    cell_size: f64,
    cells: HashMap<Cell, Vec<NodeId>>,
}

impl<'a> GridIndex<'a> {
    pub fn new(locations: &'a [Point], squared_distance_threshold: f64) -> Self {
        let radius = squared_distance_threshold.max(0.0).sqrt();
        // A zero radius only matches coincident points; any positive cell size works.
        let cell_size = if radius > 0.0 { radius } else { 1.0 };

        let mut cells: HashMap<Cell, Vec<NodeId>> = HashMap::new();
        for (id, point) in locations.iter().enumerate() {
            cells
                .entry(cell_of(point, cell_size))
                .or_default()
                .push(id);
        }

        Self {
            locations,
            squared_distance_threshold,
            radius,
            cell_size,
            cells,
        }
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

fn cell_of(point: &Point, cell_size: f64) -> Cell {
    (
        (point.x / cell_size).floor() as i64,
        (point.y / cell_size).floor() as i64,
    )
}

impl ProximityIndex for GridIndex<'_> {
    fn neighbors(&self, center: NodeId) -> Result<Vec<NodeId>> {
        let origin = location_of(self.locations, center)?;
        if self.squared_distance_threshold < 0.0 {
            return Ok(Vec::new());
        }

        let r = self.radius;
        let (x_lo, y_lo) = cell_of(&Point::new(origin.x - r, origin.y - r), self.cell_size);
        let (x_hi, y_hi) = cell_of(&Point::new(origin.x + r, origin.y + r), self.cell_size);

        let mut found = Vec::new();
        // One extra ring absorbs rounding at cell boundaries.
        for cx in x_lo.saturating_sub(1)..=x_hi.saturating_add(1) {
            for cy in y_lo.saturating_sub(1)..=y_hi.saturating_add(1) {
                let Some(bucket) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                found.extend(bucket.iter().copied().filter(|&id| {
                    id != center
                        && origin.sqr_dist(&self.locations[id]) <= self.squared_distance_threshold
                }));
            }
        }
        found.sort_unstable();
        Ok(found)
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(-1.5, -1.5),
            Point::new(10.0, 10.0),
        ]
    }

    #[test]
    fn test_brute_force_inclusive_threshold() {
        let points = sample();
        let index = BruteForceIndex::new(&points, 4.0);
        assert_eq!(index.neighbors(0).unwrap(), vec![1, 2, 3]);
        assert_eq!(index.name(), "brute-force");
    }

    #[test]
    fn test_brute_force_excludes_self_even_at_zero() {
        let points = vec![Point::new(1.0, 1.0), Point::new(1.0, 1.0)];
        let index = BruteForceIndex::new(&points, 0.0);
        assert_eq!(index.neighbors(0).unwrap(), vec![1]);
        assert_eq!(index.neighbors(1).unwrap(), vec![0]);
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let points = sample();
        for threshold in [-1.0, 0.0, 0.5, 1.0, 4.0, 4.5, 200.0, 1e6] {
            let brute = BruteForceIndex::new(&points, threshold);
            let grid = GridIndex::new(&points, threshold);
            for center in 0..points.len() {
                assert_eq!(
                    grid.neighbors(center).unwrap(),
                    brute.neighbors(center).unwrap(),
                    "threshold {threshold}, center {center}"
                );
            }
        }
    }

    #[test]
    fn test_grid_negative_threshold_finds_nothing() {
        let points = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)];
        let grid = GridIndex::new(&points, -1.0);
        assert!(grid.neighbors(0).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_center_is_not_found() {
        let points = vec![Point::new(0.0, 0.0)];
        let brute = BruteForceIndex::new(&points, 1.0);
        let grid = GridIndex::new(&points, 1.0);
        assert_eq!(brute.neighbors(5), Err(FeatureError::node_not_found(5)));
        assert_eq!(grid.neighbors(5), Err(FeatureError::node_not_found(5)));

        let negative = GridIndex::new(&points, -1.0);
        assert_eq!(negative.neighbors(1), Err(FeatureError::node_not_found(1)));
    }

    #[test]
    fn test_grid_buckets_points() {
        let points = sample();
        let grid = GridIndex::new(&points, 1.0);
        assert!(grid.cell_count() > 1);
        assert_eq!(grid.name(), "grid");
    }
}
