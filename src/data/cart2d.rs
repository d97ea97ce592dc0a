//! Cart2d: per-coordinate staging of sub-grids on the coordinating rank.
//!
//! The global grid is split into `dim_x × dim_y` rectangles whose extents
//! differ by at most one cell along each axis. [`Cart2d`] owns one [`Grid`]
//! per process coordinate, both before distribution and after collection.

use crate::data::grid::Grid;
use crate::heatsim_error::HeatsimError;
use crate::topology::cartesian::{Coord, ProcessShape};
use itertools::iproduct;

/// Split `n` cells into `parts` near-equal `(offset, len)` ranges.
///
/// The first `n % parts` ranges get one extra cell.
pub fn split_axis(n: usize, parts: usize) -> Vec<(usize, usize)> {
    let base = n / parts;
    let rem = n % parts;
    let mut offset = 0;
    (0..parts)
        .map(|i| {
            let len = base + usize::from(i < rem);
            let range = (offset, len);
            offset += len;
            range
        })
        .collect()
}

/// One grid per process coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Cart2d {
    shape: ProcessShape,
    global_width: usize,
    global_height: usize,
    columns: Vec<(usize, usize)>,
    rows: Vec<(usize, usize)>,
    /// Indexed by `x * dim_y + y`.
    grids: Vec<Option<Grid>>,
}

impl Cart2d {
    /// Allocate zero-filled sub-grids for a `global_width × global_height`
    /// domain split over `shape`.
    ///
    /// # Errors
    /// Returns `Err(MissingSubGrid)` for the first coordinate whose sub-grid
    /// would be empty (a global axis smaller than the process dimension), or
    /// `Err(Topology)` for a zero shape.
    pub fn empty(
        global_width: usize,
        global_height: usize,
        shape: ProcessShape,
        padding: usize,
    ) -> Result<Self, HeatsimError> {
        shape.validate(shape.len())?;
        let columns = split_axis(global_width, shape.dim_x);
        let rows = split_axis(global_height, shape.dim_y);
        let mut grids = Vec::with_capacity(shape.len());
        for (x, y) in iproduct!(0..shape.dim_x, 0..shape.dim_y) {
            let (w, h) = (columns[x].1, rows[y].1);
            if w == 0 || h == 0 {
                return Err(HeatsimError::MissingSubGrid { x, y });
            }
            grids.push(Some(Grid::new(w, h, padding)?));
        }
        Ok(Self {
            shape,
            global_width,
            global_height,
            columns,
            rows,
            grids,
        })
    }

    /// Split an (unpadded or padded) global grid's logical interior into
    /// padded sub-grids.
    pub fn partition(
        global: &Grid,
        shape: ProcessShape,
        padding: usize,
    ) -> Result<Self, HeatsimError> {
        let mut cart = Self::empty(global.width(), global.height(), shape, padding)?;
        for (x, y) in iproduct!(0..shape.dim_x, 0..shape.dim_y) {
            let (x0, w) = cart.columns[x];
            let (y0, h) = cart.rows[y];
            let Some(grid) = cart.grids[x * shape.dim_y + y].as_mut() else {
                return Err(HeatsimError::MissingSubGrid { x, y });
            };
            for row in 0..h {
                let src = global.row((y0 + row) as isize);
                grid.row_mut(row as isize)
                    .copy_from_slice(&src[x0..x0 + w]);
            }
        }
        log::debug!(
            "partitioned {}x{} grid over {}x{} processes",
            global.width(),
            global.height(),
            shape.dim_x,
            shape.dim_y
        );
        Ok(cart)
    }

    pub fn shape(&self) -> ProcessShape {
        self.shape
    }

    pub fn global_width(&self) -> usize {
        self.global_width
    }

    pub fn global_height(&self) -> usize {
        self.global_height
    }

    /// `(offset, len)` of column block `x` and row block `y` in the global grid.
    pub fn extent(&self, coord: Coord) -> ((usize, usize), (usize, usize)) {
        (self.columns[coord.x], self.rows[coord.y])
    }

    fn slot(&self, coord: Coord) -> Option<usize> {
        (coord.x < self.shape.dim_x && coord.y < self.shape.dim_y)
            .then(|| coord.x * self.shape.dim_y + coord.y)
    }

    pub fn get_grid(&self, coord: Coord) -> Option<&Grid> {
        self.slot(coord).and_then(|i| self.grids[i].as_ref())
    }

    pub fn get_grid_mut(&mut self, coord: Coord) -> Option<&mut Grid> {
        self.slot(coord).and_then(|i| self.grids[i].as_mut())
    }

    /// Move the grid out of its slot, leaving the slot empty.
    pub fn take_grid(&mut self, coord: Coord) -> Option<Grid> {
        self.slot(coord).and_then(|i| self.grids[i].take())
    }

    /// Rebuild the unpadded global grid from every slot's logical interior.
    ///
    /// # Errors
    /// Returns `Err(MissingSubGrid)` if any slot has been taken.
    pub fn assemble(&self) -> Result<Grid, HeatsimError> {
        let mut out = Grid::new(self.global_width, self.global_height, 0)?;
        for (x, y) in iproduct!(0..self.shape.dim_x, 0..self.shape.dim_y) {
            let grid = self
                .get_grid(Coord::new(x, y))
                .ok_or(HeatsimError::MissingSubGrid { x, y })?;
            let (x0, w) = self.columns[x];
            let (y0, _) = self.rows[y];
            for row in 0..grid.height() {
                out.row_mut((y0 + row) as isize)[x0..x0 + w]
                    .copy_from_slice(grid.row(row as isize));
            }
        }
        Ok(out)
    }
}
