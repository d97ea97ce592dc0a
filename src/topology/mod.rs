//! Process topology.
//!
//! Only the periodic 2-D Cartesian layout is provided: ranks are addressed
//! by coordinate, and the four cardinal neighbours wrap around both axes.

pub mod cartesian;

pub use cartesian::{
    Axis, CartesianTopology, Coord, Direction, ProcessShape, coord_of, rank_of,
};
