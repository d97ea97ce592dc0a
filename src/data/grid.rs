//! Grid: a padded, row-major buffer for one rectangular sub-domain.
//!
//! Logical coordinates run over `0..width` × `0..height`; the padding border
//! extends them by `padding` cells on every side and is addressed with
//! negative or past-the-end coordinates (`x = -1`, `x = width`, ...).

use crate::heatsim_error::HeatsimError;

/// Rectangular buffer of `f64` cells with a symmetric padding border.
///
/// # Invariants
///
/// - `width_padded == width + 2 * padding`, same for `height_padded`.
/// - `data.len() == width_padded * height_padded`.
/// - `width > 0` and `height > 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    padding: usize,
    width_padded: usize,
    height_padded: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Allocate a zero-filled grid.
    ///
    /// # Errors
    /// Returns `Err(GridShape)` if `width` or `height` is zero.
    pub fn new(width: usize, height: usize, padding: usize) -> Result<Self, HeatsimError> {
        if width == 0 || height == 0 {
            return Err(HeatsimError::GridShape(format!(
                "grid extents must be non-zero, got {width}x{height}"
            )));
        }
        let width_padded = width + 2 * padding;
        let height_padded = height + 2 * padding;
        Ok(Self {
            width,
            height,
            padding,
            width_padded,
            height_padded,
            data: vec![0.0; width_padded * height_padded],
        })
    }

    /// Wrap an existing row-major buffer as an unpadded grid.
    ///
    /// # Errors
    /// Returns `Err(GridShape)` if the extents are zero or `data.len()` is not
    /// `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self, HeatsimError> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(HeatsimError::GridShape(format!(
                "buffer of {} cells does not describe a {width}x{height} grid",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            padding: 0,
            width_padded: width,
            height_padded: height,
            data,
        })
    }

    /// Grid whose every cell, padding included, holds `value`.
    pub fn filled(
        width: usize,
        height: usize,
        padding: usize,
        value: f64,
    ) -> Result<Self, HeatsimError> {
        let mut grid = Self::new(width, height, padding)?;
        grid.data.fill(value);
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn width_padded(&self) -> usize {
        self.width_padded
    }

    pub fn height_padded(&self) -> usize {
        self.height_padded
    }

    /// Number of logical (unpadded) cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Whole buffer, padding included.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Offset into `data` of logical cell `(x, y)`.
    ///
    /// Callers must keep `-padding <= x < width + padding` (same for `y`).
    #[inline]
    pub fn index(&self, x: isize, y: isize) -> usize {
        let p = self.padding as isize;
        debug_assert!(
            x >= -p && x < self.width as isize + p && y >= -p && y < self.height as isize + p,
            "cell ({x}, {y}) outside {}x{} grid with padding {}",
            self.width,
            self.height,
            self.padding
        );
        (y + p) as usize * self.width_padded + (x + p) as usize
    }

    #[inline]
    pub fn get(&self, x: isize, y: isize) -> f64 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: isize, y: isize, value: f64) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Logical cells of row `y`, padding columns excluded.
    pub fn row(&self, y: isize) -> &[f64] {
        let start = self.index(0, y);
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: isize) -> &mut [f64] {
        let start = self.index(0, y);
        let width = self.width;
        &mut self.data[start..start + width]
    }

    /// Copy of the logical interior laid out with a different padding.
    ///
    /// The new padding border is zero-filled.
    pub fn with_padding(&self, padding: usize) -> Grid {
        let width_padded = self.width + 2 * padding;
        let height_padded = self.height + 2 * padding;
        let mut out = Grid {
            width: self.width,
            height: self.height,
            padding,
            width_padded,
            height_padded,
            data: vec![0.0; width_padded * height_padded],
        };
        for y in 0..self.height as isize {
            out.row_mut(y).copy_from_slice(self.row(y));
        }
        out
    }

    /// Copy the logical interior of `other` into this grid.
    ///
    /// # Errors
    /// Returns `Err(GridShape)` if the logical extents differ.
    pub fn copy_interior_from(&mut self, other: &Grid) -> Result<(), HeatsimError> {
        if self.width != other.width || self.height != other.height {
            return Err(HeatsimError::GridShape(format!(
                "cannot copy {}x{} interior into {}x{} grid",
                other.width, other.height, self.width, self.height
            )));
        }
        for y in 0..self.height as isize {
            self.row_mut(y).copy_from_slice(other.row(y));
        }
        Ok(())
    }

    /// Logical interior flattened row-major.
    pub fn interior(&self) -> Vec<f64> {
        if self.padding == 0 {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.cell_count());
        for y in 0..self.height as isize {
            out.extend_from_slice(self.row(y));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_layout_matches_index_formula() {
        let mut g = Grid::new(3, 2, 1).unwrap();
        assert_eq!(g.width_padded(), 5);
        assert_eq!(g.height_padded(), 4);
        assert_eq!(g.data().len(), 20);
        g.set(0, 0, 7.0);
        assert_eq!(g.data()[6], 7.0);
        g.set(-1, -1, 1.0);
        assert_eq!(g.data()[0], 1.0);
        g.set(3, 2, 2.0);
        assert_eq!(g.data()[19], 2.0);
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(matches!(Grid::new(0, 4, 1), Err(HeatsimError::GridShape(_))));
        assert!(Grid::from_vec(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn with_padding_keeps_interior() {
        let g = Grid::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let padded = g.with_padding(1);
        assert_eq!(padded.get(0, 0), 1.0);
        assert_eq!(padded.get(1, 1), 4.0);
        assert_eq!(padded.get(-1, 0), 0.0);
        assert_eq!(padded.with_padding(0), g);
        assert_eq!(padded.interior(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn copy_interior_rejects_mismatched_extents() {
        let mut a = Grid::new(2, 2, 1).unwrap();
        let b = Grid::new(3, 2, 0).unwrap();
        assert!(a.copy_interior_from(&b).is_err());
    }
}
