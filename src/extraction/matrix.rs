//! Row-major matrix of 8-bit samples.

use serde::{Deserialize, Serialize};

/// A `height × width` grid of byte values.
///
/// Holds either a colour channel (values in `0..=255`) or a binary bit
/// plane (values in `{0, 1}`). Storage is flat and row-major; on the wire
/// the matrix is a sequence of rows.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Matrix {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl Matrix {
    /// Creates a matrix from row-major data.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> Option<Self> {
        if data.len() != width.checked_mul(height)? {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a matrix by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Creates a matrix from nested rows.
    ///
    /// Returns `None` if the rows have differing lengths.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let data = rows.into_iter().flatten().collect();
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the matrix has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the value at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Returns the flat row-major values.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Iterates over rows.
    ///
    /// Yields `height` rows even when `width` is zero.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let width = self.width;
        (0..self.height).map(move |y| &self.data[y * width..(y + 1) * width])
    }

    /// Applies `f` to every cell, keeping the shape.
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Counts cells equal to exactly 1.
    pub fn count_ones(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1).count()
    }

    /// Converts to nested rows.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(<[u8]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<u8>>> for Matrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows).ok_or_else(|| "matrix rows have differing lengths".to_string())
    }
}

impl From<Matrix> for Vec<Vec<u8>> {
    fn from(matrix: Matrix) -> Self {
        matrix.to_rows()
    }
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matrix")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cells", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_shape() {
        assert!(Matrix::from_vec(vec![0; 6], 3, 2).is_some());
        assert!(Matrix::from_vec(vec![0; 5], 3, 2).is_none());
    }

    #[test]
    fn test_rows_round_trip_nested() {
        let rows = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let matrix = Matrix::from_rows(rows.clone()).unwrap();

        assert_eq!(matrix.width(), 3);
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.get(2, 1), Some(5));
        assert_eq!(matrix.get(3, 0), None);
        assert_eq!(matrix.to_rows(), rows);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(Matrix::from_rows(vec![vec![0, 1], vec![2]]).is_none());

        let parsed: Result<Matrix, _> = serde_json::from_str("[[0,1],[2]]");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_serializes_as_rows() {
        let matrix = Matrix::from_fn(2, 2, |x, y| (y * 2 + x) as u8);
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[0,1],[2,3]]");
    }

    #[test]
    fn test_zero_width_rows_survive_json() {
        let matrix: Matrix = serde_json::from_str("[[],[]]").unwrap();
        assert_eq!(matrix.width(), 0);
        assert_eq!(matrix.height(), 2);
        assert_eq!(matrix.rows().count(), 2);
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[],[]]");

        let single: Matrix = serde_json::from_str("[[]]").unwrap();
        assert_eq!(single.to_rows(), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_count_ones_ignores_other_values() {
        let matrix = Matrix::from_vec(vec![1, 0, 1, 255], 2, 2).unwrap();
        assert_eq!(matrix.count_ones(), 2);
    }
}
