//! Communication and the distributed protocol phases.

pub mod collect;
pub mod communicator;
pub mod distribute;
pub mod halo;
pub mod wire;

pub use collect::{receive_results, send_result};
pub use distribute::{receive_grid, send_grids};
pub use halo::exchange_borders;
