//! Gather unpadded result grids on the coordinating rank.

use crate::algs::communicator::{Communicator, HeatsimTags};
use crate::algs::wire::{recv_into, send};
use crate::data::cart2d::Cart2d;
use crate::data::grid::Grid;
use crate::heatsim_error::HeatsimError;
use crate::topology::cartesian::CartesianTopology;

const COORDINATOR: usize = 0;

fn require_unpadded(grid: &Grid) -> Result<(), HeatsimError> {
    if grid.padding() != 0 {
        return Err(HeatsimError::GridShape(format!(
            "result grids must be unpadded, grid has padding {}",
            grid.padding()
        )));
    }
    Ok(())
}

/// Send this rank's final grid (`width × height` cells) to the coordinator.
pub fn send_result<C: Communicator>(
    comm: &C,
    tags: &HeatsimTags,
    grid: &Grid,
) -> Result<(), HeatsimError> {
    require_unpadded(grid)?;
    send(comm, COORDINATOR, tags.result, grid.data()).map_err(|source| {
        HeatsimError::Collection {
            op: "send result",
            peer: COORDINATOR,
            source,
        }
    })?;
    log::debug!("rank {} sent its result", comm.rank());
    Ok(())
}

/// Receive every other rank's result into its slot of `cart`, then copy the
/// coordinator's own grid into slot `coord_of(0)`.
///
/// Every slot of `cart` must be unpadded and sized like the grid its rank
/// was given, which holds for a `Cart2d::empty(.., padding = 0)` built from
/// the same global extents and shape.
pub fn receive_results<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    tags: &HeatsimTags,
    own: &Grid,
    cart: &mut Cart2d,
) -> Result<(), HeatsimError> {
    require_unpadded(own)?;
    for rank in 1..topo.rank_count() {
        let coord = topo.coord_of(rank);
        let slot = cart
            .get_grid_mut(coord)
            .ok_or(HeatsimError::MissingSubGrid {
                x: coord.x,
                y: coord.y,
            })?;
        require_unpadded(slot)?;
        recv_into(comm, rank, tags.result, slot.data_mut()).map_err(|source| {
            HeatsimError::Collection {
                op: "receive result",
                peer: rank,
                source,
            }
        })?;
        log::debug!("received result of rank {rank} ({}, {})", coord.x, coord.y);
    }
    let coord = topo.coords();
    cart.get_grid_mut(coord)
        .ok_or(HeatsimError::MissingSubGrid {
            x: coord.x,
            y: coord.y,
        })?
        .copy_interior_from(own)
}
