//! Local stencil update applied between halo exchanges.
//!
//! [`StencilKernel`] is the seam between the distributed engine and the
//! per-cell math. [`DiffusionKernel`] is the explicit 5-point heat update
//!
//! `u' = u + α (u_n + u_s + u_e + u_w − 4u)`
//!
//! computed row-parallel with Rayon. It reads the padding but never writes it.

use crate::data::grid::Grid;
use crate::heatsim_error::HeatsimError;
use rayon::prelude::*;

/// Local compute step on a padded grid.
///
/// Implementations mutate only the logical interior; the padding keeps the
/// values of the last halo exchange.
pub trait StencilKernel {
    fn apply(&mut self, grid: &mut Grid) -> Result<(), HeatsimError>;
}

/// Explicit 5-point diffusion.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffusionKernel {
    alpha: f64,
    scratch: Vec<f64>,
}

impl DiffusionKernel {
    /// Largest coefficient for which the explicit scheme is stable.
    pub const MAX_ALPHA: f64 = 0.25;

    /// # Errors
    /// Returns `Err(Config)` unless `0 < alpha <= 0.25`.
    pub fn new(alpha: f64) -> Result<Self, HeatsimError> {
        if !(alpha > 0.0 && alpha <= Self::MAX_ALPHA) {
            return Err(HeatsimError::Config(format!(
                "diffusion coefficient {alpha} outside (0, {}]",
                Self::MAX_ALPHA
            )));
        }
        Ok(Self {
            alpha,
            scratch: Vec::new(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl StencilKernel for DiffusionKernel {
    fn apply(&mut self, grid: &mut Grid) -> Result<(), HeatsimError> {
        if grid.padding() == 0 {
            return Err(HeatsimError::GridShape(
                "diffusion needs a padded grid".into(),
            ));
        }
        let (w, alpha) = (grid.width(), self.alpha);
        self.scratch.resize(grid.cell_count(), 0.0);
        let src: &Grid = grid;
        self.scratch
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, out)| {
                let y = y as isize;
                let (up, row, down) = (src.row(y - 1), src.row(y), src.row(y + 1));
                for (x, cell) in out.iter_mut().enumerate() {
                    let xi = x as isize;
                    let c = row[x];
                    let lap = up[x] + down[x] + src.get(xi - 1, y) + src.get(xi + 1, y) - 4.0 * c;
                    *cell = c + alpha * lap;
                }
            });
        for (y, chunk) in self.scratch.chunks(w).enumerate() {
            grid.row_mut(y as isize).copy_from_slice(chunk);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstable_alpha_is_rejected() {
        assert!(DiffusionKernel::new(0.3).is_err());
        assert!(DiffusionKernel::new(0.0).is_err());
        assert!(DiffusionKernel::new(f64::NAN).is_err());
    }

    #[test]
    fn constant_field_is_fixed_point() {
        let mut g = Grid::filled(4, 3, 1, 2.5).unwrap();
        let mut k = DiffusionKernel::new(0.2).unwrap();
        k.apply(&mut g).unwrap();
        assert!(g.data().iter().all(|&v| v == 2.5));
    }

    #[test]
    fn hot_spot_spreads_and_padding_is_untouched() {
        let mut g = Grid::new(3, 3, 1).unwrap();
        g.set(1, 1, 1.0);
        g.set(-1, 0, 9.0);
        let mut k = DiffusionKernel::new(0.25).unwrap();
        k.apply(&mut g).unwrap();
        assert_eq!(g.get(1, 1), 0.0);
        assert_eq!(g.get(0, 1), 0.25);
        assert_eq!(g.get(0, 0), 0.25 * 9.0);
        assert_eq!(g.get(-1, 0), 9.0);
    }
}
