//! Generators for synthetic coordinate sequences and grids.
//!
//! These create predictable, verifiable latitude/longitude patterns that
//! can be used across the test suite.

/// Creates an arithmetic sequence.
///
/// # Example
///
/// ```
/// use test_utils::linear_sequence;
///
/// assert_eq!(linear_sequence(10.0, 1.0, 3), vec![10.0, 11.0, 12.0]);
/// ```
pub fn linear_sequence(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Cell-center coordinates of `count` equal cells spanning `from` to `to`.
///
/// # Example
///
/// ```
/// use test_utils::cell_centers;
///
/// assert_eq!(cell_centers(90.0, -90.0, 3), vec![60.0, 0.0, -60.0]);
/// ```
pub fn cell_centers(from: f64, to: f64, count: usize) -> Vec<f64> {
    let step = (to - from) / count as f64;
    linear_sequence(from + step / 2.0, step, count)
}

/// Replaces the values at `positions` with `fill`.
///
/// Out-of-range positions are ignored.
pub fn with_fill(mut values: Vec<f64>, positions: &[usize], fill: f64) -> Vec<f64> {
    for &i in positions {
        if let Some(v) = values.get_mut(i) {
            *v = fill;
        }
    }
    values
}

/// Creates a row-major grid where each cell holds `row * 1000 + col`.
///
/// Useful for checking that subsets pick the right cells.
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[5], 1001.0); // row 1, col 1
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((row * 1000 + col) as f64);
        }
    }
    data
}

/// Longitudes in [0, 360) form for `count` cells starting at `start`.
pub fn zero_to_360_longitudes(start: f64, step: f64, count: usize) -> Vec<f64> {
    linear_sequence(start, step, count)
        .into_iter()
        .map(|v| v.rem_euclid(360.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_sequence() {
        assert_eq!(linear_sequence(0.0, -2.5, 3), vec![0.0, -2.5, -5.0]);
        assert!(linear_sequence(1.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_cell_centers() {
        assert_eq!(cell_centers(-180.0, 180.0, 4), vec![-135.0, -45.0, 45.0, 135.0]);
    }

    #[test]
    fn test_with_fill() {
        let v = with_fill(vec![1.0, 2.0, 3.0], &[1, 7], -1.0);
        assert_eq!(v, vec![1.0, -1.0, 3.0]);
    }

    #[test]
    fn test_index_grid() {
        let grid = create_index_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1.0, 2.0, 1000.0, 1001.0, 1002.0]);
    }

    #[test]
    fn test_zero_to_360() {
        assert_eq!(
            zero_to_360_longitudes(350.0, 10.0, 3),
            vec![350.0, 0.0, 10.0]
        );
    }
}
