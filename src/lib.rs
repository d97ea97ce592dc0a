#![cfg_attr(docsrs, feature(doc_cfg))]
//! # heatsim
//!
//! heatsim is a distributed 2-D stencil engine. A global grid is split across
//! ranks arranged in a periodic (toroidal) Cartesian process grid; each rank
//! steps its own padded sub-grid and swaps one-cell borders with its four
//! neighbours before every step.
//!
//! ## Features
//! - Periodic Cartesian topology with explicit `rank_of`/`coord_of` mapping
//! - Near-equal domain decomposition (extents differ by at most one cell)
//! - Deadlock-free, parity-ordered halo exchange over blocking send/receive
//! - Scatter of sub-grids and gather of results on rank 0
//! - Pluggable communication backends (serial, threaded, MPI)
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! heatsim = "0.1"
//! # features = ["mpi-support"]
//! ```
//!
//! A run on four in-process ranks:
//!
//! ```rust
//! use heatsim::prelude::*;
//!
//! let global = Grid::filled(8, 8, 0, 1.0).unwrap();
//! let results = RayonComm::run_world(4, |comm| {
//!     let sim = Heatsim::init(comm, ProcessShape::new(2, 2)).unwrap();
//!     let mut kernel = DiffusionKernel::new(0.1).unwrap();
//!     sim.run(Some(&global), 10, &mut kernel).unwrap()
//! });
//! assert_eq!(results[0].as_ref().unwrap(), &global);
//! ```

pub mod algs;
pub mod data;
pub mod heatsim;
pub mod heatsim_error;
pub mod physics;
pub mod topology;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{CommTag, Communicator, HeatsimTags, NoComm, RayonComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::data::cart2d::Cart2d;
    pub use crate::data::grid::Grid;
    pub use crate::heatsim::{Heatsim, HeatsimConfig};
    pub use crate::heatsim_error::{CommError, HeatsimError};
    pub use crate::physics::diffusion::{DiffusionKernel, StencilKernel};
    pub use crate::topology::cartesian::{CartesianTopology, Coord, Direction, ProcessShape};
}
