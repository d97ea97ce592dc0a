//! Strided gather/scatter of grid borders.
//!
//! A border is described by `(offset, stride, count)` into a grid's flat
//! buffer: a column is `count = height` cells `stride = width_padded` apart,
//! a row is `count = width` contiguous cells. Borders travel as flat `f64`
//! buffers and are scattered back into the receiver's padding.

use crate::data::grid::Grid;
use crate::topology::cartesian::Direction;

/// Strided slice of a flat buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StridedLayout {
    pub offset: usize,
    pub stride: usize,
    pub count: usize,
}

impl StridedLayout {
    /// Logical border cells on side `dir` (e.g. `West` is column `x = 0`).
    pub fn border(grid: &Grid, dir: Direction) -> Self {
        let (w, h) = (grid.width() as isize, grid.height() as isize);
        match dir {
            Direction::West => Self::column(grid, 0),
            Direction::East => Self::column(grid, w - 1),
            Direction::North => Self::row(grid, 0),
            Direction::South => Self::row(grid, h - 1),
        }
    }

    /// Padding cells on side `dir` (e.g. `West` is column `x = -1`).
    ///
    /// Padding rows span only the logical width; corners are never touched.
    pub fn padding(grid: &Grid, dir: Direction) -> Self {
        let (w, h) = (grid.width() as isize, grid.height() as isize);
        match dir {
            Direction::West => Self::column(grid, -1),
            Direction::East => Self::column(grid, w),
            Direction::North => Self::row(grid, -1),
            Direction::South => Self::row(grid, h),
        }
    }

    fn column(grid: &Grid, x: isize) -> Self {
        Self {
            offset: grid.index(x, 0),
            stride: grid.width_padded(),
            count: grid.height(),
        }
    }

    fn row(grid: &Grid, y: isize) -> Self {
        Self {
            offset: grid.index(0, y),
            stride: 1,
            count: grid.width(),
        }
    }

    /// Buffer offsets covered by the layout.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(move |i| self.offset + i * self.stride)
    }

    /// Copy the strided cells into a flat buffer.
    pub fn gather(&self, data: &[f64]) -> Vec<f64> {
        if self.stride == 1 {
            return data[self.offset..self.offset + self.count].to_vec();
        }
        self.indices().map(|i| data[i]).collect()
    }

    /// Write a flat buffer back into the strided cells.
    ///
    /// `buf.len()` must equal `count`.
    pub fn scatter(&self, data: &mut [f64], buf: &[f64]) {
        debug_assert_eq!(buf.len(), self.count);
        if self.stride == 1 {
            data[self.offset..self.offset + self.count].copy_from_slice(buf);
            return;
        }
        for (i, &v) in self.indices().zip(buf) {
            data[i] = v;
        }
    }
}

/// Flat copy of the logical border on side `dir`.
pub fn pack_border(grid: &Grid, dir: Direction) -> Vec<f64> {
    StridedLayout::border(grid, dir).gather(grid.data())
}

/// Write `buf` into the padding on side `dir`.
pub fn unpack_padding(grid: &mut Grid, dir: Direction, buf: &[f64]) {
    let layout = StridedLayout::padding(grid, dir);
    layout.scatter(grid.data_mut(), buf);
}

/// Copy this grid's own border into its opposite padding.
///
/// Used when a rank is its own neighbour along an axis: the west padding
/// receives the east column, the north padding the south row, and so on.
pub fn wrap_into_padding(grid: &mut Grid, dir: Direction) {
    let src = StridedLayout::border(grid, dir);
    let dst = StridedLayout::padding(grid, dir.opposite());
    let data = grid.data_mut();
    for (s, d) in src.indices().zip(dst.indices()) {
        data[d] = data[s];
    }
}
