//! Periodic 2-D Cartesian process topology.
//!
//! Ranks are laid out row-major in the first dimension, the layout of a
//! non-reordering Cartesian communicator: `rank = x * dim_y + y`. Axis X
//! (dimension 0) carries the west/east neighbours and axis Y (dimension 1)
//! the north/south neighbours. Both axes wrap around, so every rank has four
//! well-defined neighbours, possibly itself.

use crate::algs::communicator::Communicator;
use crate::heatsim_error::HeatsimError;
use serde::{Deserialize, Serialize};

/// Requested process-grid shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessShape {
    pub dim_x: usize,
    pub dim_y: usize,
}

impl ProcessShape {
    pub fn new(dim_x: usize, dim_y: usize) -> Self {
        Self { dim_x, dim_y }
    }

    /// Number of processes the shape describes.
    pub fn len(&self) -> usize {
        self.dim_x * self.dim_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extent along `axis`.
    pub fn dim(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.dim_x,
            Axis::Y => self.dim_y,
        }
    }

    /// Check that the shape exactly partitions `process_count` processes.
    pub fn validate(&self, process_count: usize) -> Result<(), HeatsimError> {
        if self.dim_x == 0 || self.dim_y == 0 {
            return Err(HeatsimError::Topology(format!(
                "process grid {}x{} has a zero dimension",
                self.dim_x, self.dim_y
            )));
        }
        if self.len() != process_count {
            return Err(HeatsimError::Topology(format!(
                "process grid {}x{} needs {} processes, communicator has {process_count}",
                self.dim_x,
                self.dim_y,
                self.len()
            )));
        }
        Ok(())
    }

    /// All coordinates in rank order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len()).map(move |r| coord_of(r, *self))
    }
}

/// Position of a process in the process grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Component along `axis`.
    pub fn along(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Cardinal direction of a neighbour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::X,
            Direction::North | Direction::South => Axis::Y,
        }
    }
}

/// Rank of the process at `coord`.
pub fn rank_of(coord: Coord, shape: ProcessShape) -> usize {
    coord.x * shape.dim_y + coord.y
}

/// Inverse of [`rank_of`].
pub fn coord_of(rank: usize, shape: ProcessShape) -> Coord {
    Coord {
        x: rank / shape.dim_y,
        y: rank % shape.dim_y,
    }
}

/// Coordinate one step from `coord` in `dir`, wrapping around the torus.
pub fn shift(coord: Coord, dir: Direction, shape: ProcessShape) -> Coord {
    let back = |c: usize, d: usize| (c + d - 1) % d;
    let fwd = |c: usize, d: usize| (c + 1) % d;
    match dir {
        Direction::West => Coord::new(back(coord.x, shape.dim_x), coord.y),
        Direction::East => Coord::new(fwd(coord.x, shape.dim_x), coord.y),
        Direction::North => Coord::new(coord.x, back(coord.y, shape.dim_y)),
        Direction::South => Coord::new(coord.x, fwd(coord.y, shape.dim_y)),
    }
}

/// Per-process view of the periodic topology. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartesianTopology {
    rank: usize,
    rank_count: usize,
    shape: ProcessShape,
    coords: Coord,
    north: usize,
    south: usize,
    east: usize,
    west: usize,
}

impl CartesianTopology {
    /// Build the topology for `rank` out of `rank_count` processes.
    ///
    /// # Errors
    /// Returns `Err(Topology)` if `shape` does not partition `rank_count`
    /// or `rank` is outside the communicator.
    pub fn new(rank: usize, rank_count: usize, shape: ProcessShape) -> Result<Self, HeatsimError> {
        shape.validate(rank_count)?;
        if rank >= rank_count {
            return Err(HeatsimError::Topology(format!(
                "rank {rank} outside communicator of size {rank_count}"
            )));
        }
        let coords = coord_of(rank, shape);
        let nbr = |dir| rank_of(shift(coords, dir, shape), shape);
        let topo = Self {
            rank,
            rank_count,
            shape,
            coords,
            north: nbr(Direction::North),
            south: nbr(Direction::South),
            east: nbr(Direction::East),
            west: nbr(Direction::West),
        };
        log::debug!(
            "rank {rank}: coords ({}, {}), N={} S={} E={} W={}",
            coords.x,
            coords.y,
            topo.north,
            topo.south,
            topo.east,
            topo.west
        );
        Ok(topo)
    }

    /// Build the topology from a communicator's rank and size.
    pub fn from_comm<C: Communicator>(comm: &C, shape: ProcessShape) -> Result<Self, HeatsimError> {
        Self::new(comm.rank(), comm.size(), shape)
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn rank_count(&self) -> usize {
        self.rank_count
    }

    pub fn shape(&self) -> ProcessShape {
        self.shape
    }

    pub fn coords(&self) -> Coord {
        self.coords
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    pub fn neighbor(&self, dir: Direction) -> usize {
        match dir {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    /// Coordinate of any rank in this topology.
    pub fn coord_of(&self, rank: usize) -> Coord {
        coord_of(rank, self.shape)
    }
}
