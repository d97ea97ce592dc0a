//! Data module: grids, border descriptors and coordinator-side staging

pub mod border;
pub mod cart2d;
pub mod grid;

pub use cart2d::Cart2d;
pub use grid::Grid;
