//! Run driver: topology → distribution → N × (halo exchange + local step)
//! → collection.
//!
//! [`Heatsim`] bundles a communicator with its Cartesian topology and message
//! tags and exposes each protocol phase as a method. [`Heatsim::run`]
//! sequences them for a whole simulation. Any error is fatal to the run:
//! `run` aborts the communicator so that peers blocked on this rank fail
//! too (the in-process backend releases them, MPI tears the job down).

use crate::algs::collect::{receive_results, send_result};
use crate::algs::communicator::{CommTag, Communicator, HeatsimTags};
use crate::algs::distribute::{receive_grid, send_grids};
use crate::algs::halo::exchange_borders;
use crate::data::cart2d::Cart2d;
use crate::data::grid::Grid;
use crate::heatsim_error::HeatsimError;
use crate::physics::diffusion::StencilKernel;
use crate::topology::cartesian::{CartesianTopology, ProcessShape};
use serde::{Deserialize, Serialize};

/// Largest tag every MPI implementation must accept (`MPI_TAG_UB` ≥ 32767).
pub const MAX_PORTABLE_TAG: u16 = 32767;

/// Settings of one distributed run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatsimConfig {
    pub dim_x: usize,
    pub dim_y: usize,
    pub iterations: usize,
    /// First tag of the seven consecutive tags the run uses.
    pub tag_base: u16,
}

impl Default for HeatsimConfig {
    fn default() -> Self {
        Self {
            dim_x: 1,
            dim_y: 1,
            iterations: 100,
            tag_base: 0x4800,
        }
    }
}

impl HeatsimConfig {
    pub fn shape(&self) -> ProcessShape {
        ProcessShape::new(self.dim_x, self.dim_y)
    }

    pub fn tags(&self) -> HeatsimTags {
        HeatsimTags::from_base(CommTag::new(self.tag_base))
    }

    /// # Errors
    /// `Config` if the shape does not partition `process_count` processes or
    /// the seven tags would exceed [`MAX_PORTABLE_TAG`].
    pub fn validate(&self, process_count: usize) -> Result<(), HeatsimError> {
        self.shape()
            .validate(process_count)
            .map_err(|e| HeatsimError::Config(e.to_string()))?;
        if self.tag_base > MAX_PORTABLE_TAG - 6 {
            return Err(HeatsimError::Config(format!(
                "tag base {:#x} puts the last tag above {MAX_PORTABLE_TAG}",
                self.tag_base
            )));
        }
        Ok(())
    }
}

/// One rank's handle on a distributed run.
pub struct Heatsim<C: Communicator> {
    comm: C,
    topo: CartesianTopology,
    tags: HeatsimTags,
}

impl<C: Communicator> Heatsim<C> {
    /// Build the periodic topology for this rank.
    pub fn init(comm: C, shape: ProcessShape) -> Result<Self, HeatsimError> {
        let topo = CartesianTopology::from_comm(&comm, shape)?;
        Ok(Self {
            comm,
            topo,
            tags: HeatsimTags::default(),
        })
    }

    /// Build from a validated [`HeatsimConfig`].
    pub fn from_config(comm: C, config: &HeatsimConfig) -> Result<Self, HeatsimError> {
        config.validate(comm.size())?;
        Ok(Self::init(comm, config.shape())?.with_tags(config.tags()))
    }

    pub fn with_tags(mut self, tags: HeatsimTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn topology(&self) -> &CartesianTopology {
        &self.topo
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    pub fn tags(&self) -> &HeatsimTags {
        &self.tags
    }

    pub fn send_grids(&self, cart: &Cart2d) -> Result<(), HeatsimError> {
        send_grids(&self.topo, &self.comm, &self.tags, cart)
    }

    pub fn receive_grid(&self) -> Result<Grid, HeatsimError> {
        receive_grid(&self.comm, &self.tags)
    }

    pub fn exchange_borders(&self, grid: &mut Grid) -> Result<(), HeatsimError> {
        exchange_borders(&self.topo, &self.comm, &self.tags, grid)
    }

    pub fn send_result(&self, grid: &Grid) -> Result<(), HeatsimError> {
        send_result(&self.comm, &self.tags, grid)
    }

    pub fn receive_results(&self, own: &Grid, cart: &mut Cart2d) -> Result<(), HeatsimError> {
        receive_results(&self.topo, &self.comm, &self.tags, own, cart)
    }

    /// Scatter (coordinator) or receive (others) this rank's padded sub-grid.
    pub fn distribute(&self, global: Option<&Grid>) -> Result<Grid, HeatsimError> {
        if !self.topo.is_coordinator() {
            return self.receive_grid();
        }
        let global = global.ok_or_else(|| {
            HeatsimError::Config("coordinator needs the global grid".into())
        })?;
        let mut cart = Cart2d::partition(global, self.topo.shape(), 1)?;
        self.send_grids(&cart)?;
        let coord = self.topo.coords();
        cart.take_grid(coord).ok_or(HeatsimError::MissingSubGrid {
            x: coord.x,
            y: coord.y,
        })
    }

    /// Gather unpadded results; the coordinator gets the assembled global grid.
    pub fn collect(
        &self,
        local: &Grid,
        global_width: usize,
        global_height: usize,
    ) -> Result<Option<Grid>, HeatsimError> {
        let result = local.with_padding(0);
        if !self.topo.is_coordinator() {
            self.send_result(&result)?;
            return Ok(None);
        }
        let mut cart = Cart2d::empty(global_width, global_height, self.topo.shape(), 0)?;
        self.receive_results(&result, &mut cart)?;
        cart.assemble().map(Some)
    }

    /// Run `iterations` steps of `kernel` on the distributed grid.
    ///
    /// `global` is required on the coordinator and ignored elsewhere. Returns
    /// the assembled result on the coordinator and `None` on other ranks.
    ///
    /// On error the communicator is aborted before the error is returned.
    pub fn run<K: StencilKernel>(
        &self,
        global: Option<&Grid>,
        iterations: usize,
        kernel: &mut K,
    ) -> Result<Option<Grid>, HeatsimError> {
        self.run_inner(global, iterations, kernel).inspect_err(|e| {
            log::error!("rank {}: run aborted: {e}", self.topo.rank());
            self.comm.abort(&e.to_string());
        })
    }

    fn run_inner<K: StencilKernel>(
        &self,
        global: Option<&Grid>,
        iterations: usize,
        kernel: &mut K,
    ) -> Result<Option<Grid>, HeatsimError> {
        let extents = global.map(|g| (g.width(), g.height()));
        if self.topo.is_coordinator() {
            log::info!(
                "starting {iterations} iterations on {}x{} processes",
                self.topo.shape().dim_x,
                self.topo.shape().dim_y
            );
        }
        let mut grid = self.distribute(global)?;
        for _ in 0..iterations {
            self.exchange_borders(&mut grid)?;
            kernel.apply(&mut grid)?;
        }
        let (w, h) = extents.unwrap_or((0, 0));
        let out = self.collect(&grid, w, h)?;
        if self.topo.is_coordinator() {
            log::info!("run finished after {iterations} iterations");
        }
        Ok(out)
    }
}
