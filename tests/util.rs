#![allow(dead_code)]
use heatsim::data::grid::Grid;

/// Unpadded global grid whose cell `(x, y)` holds `100 * y + x`.
pub fn labelled_global(width: usize, height: usize) -> Grid {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (100 * y + x) as f64))
        .collect();
    Grid::from_vec(width, height, data).unwrap()
}

/// Cell of `global` at `(x, y)` with toroidal wraparound.
pub fn torus(global: &Grid, x: isize, y: isize) -> f64 {
    let w = global.width() as isize;
    let h = global.height() as isize;
    global.get(x.rem_euclid(w), y.rem_euclid(h))
}
