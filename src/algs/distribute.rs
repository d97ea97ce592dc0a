//! Scatter sub-grids from the coordinating rank.
//!
//! For every other rank the coordinator sends two messages: the
//! `(width, height, padding)` header, then exactly `width_padded ×
//! height_padded` cells. The receiver allocates its grid from the header
//! before reading the payload.

use crate::algs::communicator::{Communicator, HeatsimTags};
use crate::algs::wire::{WireGridParams, recv_into, send};
use crate::data::cart2d::Cart2d;
use crate::data::grid::Grid;
use crate::heatsim_error::HeatsimError;
use crate::topology::cartesian::CartesianTopology;
use bytemuck::Zeroable;

const COORDINATOR: usize = 0;

/// Send every non-coordinator rank the sub-grid at its coordinate.
///
/// Run by rank 0 only. Ranks are served in increasing order; the
/// coordinator's own slot is left in `cart`.
///
/// # Errors
/// `MissingSubGrid` if a rank's coordinate has no grid staged, `GridShape`
/// if its extents do not fit the wire header, or `Distribution` on the
/// first failed send.
pub fn send_grids<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    tags: &HeatsimTags,
    cart: &Cart2d,
) -> Result<(), HeatsimError> {
    for rank in 1..topo.rank_count() {
        let coord = topo.coord_of(rank);
        let grid = cart
            .get_grid(coord)
            .ok_or(HeatsimError::MissingSubGrid {
                x: coord.x,
                y: coord.y,
            })?;
        let params = WireGridParams::new(grid.width(), grid.height(), grid.padding())?;
        send(comm, rank, tags.grid_params, std::slice::from_ref(&params)).map_err(|source| {
            HeatsimError::Distribution {
                op: "send grid parameters",
                peer: rank,
                source,
            }
        })?;
        send(comm, rank, tags.grid_data, grid.data()).map_err(|source| {
            HeatsimError::Distribution {
                op: "send grid data",
                peer: rank,
                source,
            }
        })?;
        log::debug!(
            "sent {}x{} sub-grid ({}, {}) to rank {rank}",
            grid.width(),
            grid.height(),
            coord.x,
            coord.y
        );
    }
    Ok(())
}

/// Receive this rank's sub-grid from the coordinator.
///
/// Blocks for the header, allocates, then blocks for the payload.
pub fn receive_grid<C: Communicator>(
    comm: &C,
    tags: &HeatsimTags,
) -> Result<Grid, HeatsimError> {
    let mut params = WireGridParams::zeroed();
    recv_into(
        comm,
        COORDINATOR,
        tags.grid_params,
        std::slice::from_mut(&mut params),
    )
    .map_err(|source| HeatsimError::Distribution {
        op: "receive grid parameters",
        peer: COORDINATOR,
        source,
    })?;
    let mut grid = Grid::new(params.width(), params.height(), params.padding())?;
    recv_into(comm, COORDINATOR, tags.grid_data, grid.data_mut()).map_err(|source| {
        HeatsimError::Distribution {
            op: "receive grid data",
            peer: COORDINATOR,
            source,
        }
    })?;
    log::debug!(
        "rank {} received {}x{} sub-grid",
        comm.rank(),
        grid.width(),
        grid.height()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, RayonComm};
    use crate::topology::cartesian::{Coord, ProcessShape};

    #[test]
    fn worker_receives_its_coordinate() {
        let shape = ProcessShape::new(1, 2);
        let data: Vec<f64> = (0..6).map(f64::from).collect();
        let global = Grid::from_vec(2, 3, data).unwrap();
        let tags = HeatsimTags::default();

        let got = RayonComm::run_world(2, |comm| {
            let topo = CartesianTopology::from_comm(&comm, shape).unwrap();
            if topo.is_coordinator() {
                let cart = Cart2d::partition(&global, shape, 1).unwrap();
                send_grids(&topo, &comm, &tags, &cart).unwrap();
                None
            } else {
                Some(receive_grid(&comm, &tags).unwrap())
            }
        });
        let g = got[1].as_ref().unwrap();
        assert_eq!((g.width(), g.height(), g.padding()), (2, 1, 1));
        assert_eq!(g.row(0), &[4.0, 5.0]);
        assert_eq!(g.get(-1, 0), 0.0);
    }

    #[test]
    fn missing_slot_fails_before_sending() {
        let shape = ProcessShape::new(2, 1);
        let mut world = RayonComm::world(2);
        let comm = world.remove(0);
        let topo = CartesianTopology::from_comm(&comm, shape).unwrap();
        let mut cart = Cart2d::empty(4, 4, shape, 1).unwrap();
        cart.take_grid(Coord::new(1, 0));
        let err = send_grids(&topo, &comm, &HeatsimTags::default(), &cart).unwrap_err();
        assert_eq!(err, HeatsimError::MissingSubGrid { x: 1, y: 0 });
    }

    #[test]
    fn receive_without_coordinator_fails() {
        let err = receive_grid(&NoComm, &HeatsimTags::default()).unwrap_err();
        assert!(matches!(
            err,
            HeatsimError::Distribution {
                op: "receive grid parameters",
                peer: 0,
                ..
            }
        ));
    }
}
