//! Parity-ordered halo exchange with the four cardinal neighbours.
//!
//! Each axis is exchanged in two phases with blocking send/receive. The
//! role of a rank is chosen by the parity of its coordinate along the axis:
//!
//! | parity | phase 1                          | phase 2                          |
//! |--------|----------------------------------|----------------------------------|
//! | even   | send upper border, recv lower pad | send lower border, recv upper pad |
//! | odd    | recv lower pad, send upper border | recv upper pad, send lower border |
//!
//! "Lower" is west (X) or north (Y); "upper" is east or south. Along any
//! chain of neighbours the alternation means every blocking send is matched
//! by a receive the peer reaches without waiting on the sender, so the
//! pairs never form a cycle. The X axis is exchanged before the Y axis on
//! every rank.
//!
//! When a rank is its own neighbour along an axis (process dimension 1),
//! nothing is sent: the border is copied straight into the opposite padding.

use crate::algs::communicator::{CommTag, Communicator, HeatsimTags};
use crate::algs::wire::{recv_into, send};
use crate::data::border::{pack_border, unpack_padding, wrap_into_padding};
use crate::data::grid::Grid;
use crate::heatsim_error::{CommError, HeatsimError};
use crate::topology::cartesian::{Axis, CartesianTopology, Direction};

/// Per-axis description of one two-phase exchange.
struct AxisPlan {
    axis: Axis,
    lower: Direction,
    upper: Direction,
    first: CommTag,
    second: CommTag,
}

impl AxisPlan {
    fn x(tags: &HeatsimTags) -> Self {
        Self {
            axis: Axis::X,
            lower: Direction::West,
            upper: Direction::East,
            first: tags.x_first,
            second: tags.x_second,
        }
    }

    fn y(tags: &HeatsimTags) -> Self {
        Self {
            axis: Axis::Y,
            lower: Direction::North,
            upper: Direction::South,
            first: tags.y_first,
            second: tags.y_second,
        }
    }
}

fn send_op(dir: Direction) -> &'static str {
    match dir {
        Direction::North => "send north border",
        Direction::South => "send south border",
        Direction::East => "send east border",
        Direction::West => "send west border",
    }
}

fn recv_op(dir: Direction) -> &'static str {
    match dir {
        Direction::North => "receive north border",
        Direction::South => "receive south border",
        Direction::East => "receive east border",
        Direction::West => "receive west border",
    }
}

fn halo_err(op: &'static str, peer: usize) -> impl FnOnce(CommError) -> HeatsimError {
    move |source| HeatsimError::HaloExchange { op, peer, source }
}

/// Send this grid's border on side `dir` to the neighbour on that side.
fn send_border<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    grid: &Grid,
    dir: Direction,
    tag: CommTag,
) -> Result<(), HeatsimError> {
    let peer = topo.neighbor(dir);
    send(comm, peer, tag, &pack_border(grid, dir)).map_err(halo_err(send_op(dir), peer))
}

/// Receive the neighbour's border into this grid's padding on side `dir`.
fn recv_padding<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    grid: &mut Grid,
    dir: Direction,
    tag: CommTag,
) -> Result<(), HeatsimError> {
    let peer = topo.neighbor(dir);
    let len = match dir.axis() {
        Axis::X => grid.height(),
        Axis::Y => grid.width(),
    };
    let mut buf = vec![0.0f64; len];
    recv_into(comm, peer, tag, &mut buf).map_err(halo_err(recv_op(dir), peer))?;
    unpack_padding(grid, dir, &buf);
    Ok(())
}

fn exchange_axis<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    grid: &mut Grid,
    plan: &AxisPlan,
) -> Result<(), HeatsimError> {
    let AxisPlan {
        lower,
        upper,
        first,
        second,
        ..
    } = *plan;

    if topo.neighbor(lower) == topo.rank() {
        wrap_into_padding(grid, upper);
        wrap_into_padding(grid, lower);
        log::trace!("rank {}: {:?} axis wrapped locally", topo.rank(), plan.axis);
        return Ok(());
    }

    if topo.coords().along(plan.axis) % 2 == 0 {
        send_border(topo, comm, grid, upper, first)?;
        recv_padding(topo, comm, grid, lower, first)?;
        send_border(topo, comm, grid, lower, second)?;
        recv_padding(topo, comm, grid, upper, second)?;
    } else {
        recv_padding(topo, comm, grid, lower, first)?;
        send_border(topo, comm, grid, upper, first)?;
        recv_padding(topo, comm, grid, upper, second)?;
        send_border(topo, comm, grid, lower, second)?;
    }
    log::trace!("rank {}: {:?} axis exchanged", topo.rank(), plan.axis);
    Ok(())
}

/// Exchange the four borders of `grid` with the cardinal neighbours.
///
/// After the call every padding side holds the facing border of the
/// neighbour on that side (corners are not exchanged).
///
/// # Errors
/// `GridShape` if `grid.padding() != 1`; `HaloExchange` on the first
/// transport failure, after which the padding is partially updated and the
/// run must be aborted.
pub fn exchange_borders<C: Communicator>(
    topo: &CartesianTopology,
    comm: &C,
    tags: &HeatsimTags,
    grid: &mut Grid,
) -> Result<(), HeatsimError> {
    if grid.padding() != 1 {
        return Err(HeatsimError::GridShape(format!(
            "halo exchange needs padding 1, grid has {}",
            grid.padding()
        )));
    }
    exchange_axis(topo, comm, grid, &AxisPlan::x(tags))?;
    exchange_axis(topo, comm, grid, &AxisPlan::y(tags))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, RayonComm};
    use crate::topology::cartesian::ProcessShape;

    fn labelled(w: usize, h: usize, base: f64) -> Grid {
        let mut g = Grid::new(w, h, 1).unwrap();
        for y in 0..h as isize {
            for x in 0..w as isize {
                g.set(x, y, base + (10 * y + x) as f64);
            }
        }
        g
    }

    #[test]
    fn single_rank_wraps_without_messages() {
        let topo = CartesianTopology::new(0, 1, ProcessShape::new(1, 1)).unwrap();
        let mut g = labelled(3, 2, 0.0);
        exchange_borders(&topo, &NoComm, &HeatsimTags::default(), &mut g).unwrap();
        assert_eq!([g.get(-1, 0), g.get(-1, 1)], [2.0, 12.0]);
        assert_eq!([g.get(3, 0), g.get(3, 1)], [0.0, 10.0]);
        assert_eq!(g.row(-1), &[10.0, 11.0, 12.0]);
        assert_eq!(g.row(2), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn unpadded_grid_is_rejected() {
        let topo = CartesianTopology::new(0, 1, ProcessShape::new(1, 1)).unwrap();
        let mut g = Grid::new(2, 2, 0).unwrap();
        let err = exchange_borders(&topo, &NoComm, &HeatsimTags::default(), &mut g);
        assert!(matches!(err, Err(HeatsimError::GridShape(_))));
    }

    #[test]
    fn two_ranks_along_x_swap_columns() {
        let shape = ProcessShape::new(2, 1);
        let tags = HeatsimTags::default();
        let grids = RayonComm::run_world(2, |comm| {
            let topo = CartesianTopology::from_comm(&comm, shape).unwrap();
            let mut g = labelled(2, 2, 100.0 * comm.rank() as f64);
            exchange_borders(&topo, &comm, &tags, &mut g).unwrap();
            g
        });
        // rank 1's east column is (1, y); it is both west and east of rank 0.
        assert_eq!([grids[0].get(-1, 0), grids[0].get(-1, 1)], [101.0, 111.0]);
        assert_eq!([grids[0].get(2, 0), grids[0].get(2, 1)], [100.0, 110.0]);
        assert_eq!([grids[1].get(-1, 0), grids[1].get(2, 1)], [1.0, 10.0]);
        // Y is a self-neighbour axis.
        assert_eq!(grids[1].row(-1), &[110.0, 111.0]);
    }

    #[test]
    fn missing_peer_message_is_fatal() {
        let world = RayonComm::world(2);
        let topo = CartesianTopology::from_comm(&world[1], ProcessShape::new(2, 1)).unwrap();
        let mut g = Grid::new(2, 2, 1).unwrap();
        // rank 0's phase-1 border arrives one cell short.
        send(&world[0], 1, HeatsimTags::default().x_first, &[0.0f64]).unwrap();
        let err = exchange_borders(&topo, &world[1], &HeatsimTags::default(), &mut g).unwrap_err();
        assert!(matches!(
            err,
            HeatsimError::HaloExchange {
                op: "receive west border",
                peer: 0,
                source: CommError::LengthMismatch { .. }
            }
        ));
    }
}
