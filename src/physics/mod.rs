//! Local per-rank computation.

pub mod diffusion;

pub use diffusion::{DiffusionKernel, StencilKernel};
