mod util;

use heatsim::algs::communicator::RayonComm;
use heatsim::data::cart2d::Cart2d;
use heatsim::data::grid::Grid;
use heatsim::heatsim::Heatsim;
use heatsim::topology::cartesian::{Coord, ProcessShape};
use util::{labelled_global, torus};

/// Distribute `global`, run one halo exchange and return every rank's
/// coordinate and padded grid.
fn exchange_once(global: &Grid, shape: ProcessShape) -> Vec<(Coord, Grid)> {
    RayonComm::run_world(shape.len(), |comm| {
        let sim = Heatsim::init(comm, shape).unwrap();
        let mut g = sim.distribute(Some(global)).unwrap();
        sim.exchange_borders(&mut g).unwrap();
        (sim.topology().coords(), g)
    })
}

/// Every padding cell (corners excluded) must equal the torus neighbour cell.
fn assert_padding_matches_torus(global: &Grid, shape: ProcessShape) {
    let cart = Cart2d::empty(global.width(), global.height(), shape, 0).unwrap();
    for (coord, g) in exchange_once(global, shape) {
        let ((x0, _), (y0, _)) = cart.extent(coord);
        let (x0, y0) = (x0 as isize, y0 as isize);
        let (w, h) = (g.width() as isize, g.height() as isize);
        for y in 0..h {
            assert_eq!(g.get(-1, y), torus(global, x0 - 1, y0 + y), "west {coord:?}");
            assert_eq!(g.get(w, y), torus(global, x0 + w, y0 + y), "east {coord:?}");
        }
        for x in 0..w {
            assert_eq!(g.get(x, -1), torus(global, x0 + x, y0 - 1), "north {coord:?}");
            assert_eq!(g.get(x, h), torus(global, x0 + x, y0 + h), "south {coord:?}");
        }
        for y in 0..h {
            for x in 0..w {
                assert_eq!(g.get(x, y), global.get(x0 + x, y0 + y));
            }
        }
    }
}

#[test]
fn padding_matches_torus_for_even_shapes() {
    assert_padding_matches_torus(&labelled_global(4, 4), ProcessShape::new(2, 2));
    assert_padding_matches_torus(&labelled_global(8, 6), ProcessShape::new(4, 2));
}

#[test]
fn padding_matches_torus_for_odd_and_uneven_shapes() {
    assert_padding_matches_torus(&labelled_global(7, 5), ProcessShape::new(3, 1));
    assert_padding_matches_torus(&labelled_global(7, 8), ProcessShape::new(3, 3));
    assert_padding_matches_torus(&labelled_global(10, 5), ProcessShape::new(2, 5));
}

#[test]
fn self_neighbor_axes_wrap_locally() {
    assert_padding_matches_torus(&labelled_global(3, 2), ProcessShape::new(1, 1));
    assert_padding_matches_torus(&labelled_global(6, 4), ProcessShape::new(1, 2));
    assert_padding_matches_torus(&labelled_global(6, 4), ProcessShape::new(3, 1));
}

#[test]
fn constant_field_fills_padding() {
    let c = 3.25;
    let shape = ProcessShape::new(2, 3);
    let global = Grid::filled(9, 7, 0, c).unwrap();
    for (_, g) in exchange_once(&global, shape) {
        let (w, h) = (g.width() as isize, g.height() as isize);
        for y in 0..h {
            assert_eq!(g.get(-1, y), c);
            assert_eq!(g.get(w, y), c);
        }
        for x in 0..w {
            assert_eq!(g.get(x, -1), c);
            assert_eq!(g.get(x, h), c);
        }
    }
}

#[test]
fn labelled_four_by_four_scenario() {
    // Global [[A,B,C,D],[E,F,G,H],[I,J,K,L],[M,N,O,P]]; cell (x, y) = 100y + x.
    let global = labelled_global(4, 4);
    let grids = exchange_once(&global, ProcessShape::new(2, 2));
    let find = |c: Coord| grids.iter().find(|(k, _)| *k == c).map(|(_, g)| g).unwrap();
    let origin = find(Coord::new(0, 0));
    let east_of_wrap = find(Coord::new(1, 0));
    let south_of_wrap = find(Coord::new(0, 1));

    // West padding of (0,0) is (1,0)'s east-most column: D, H.
    assert_eq!([origin.get(-1, 0), origin.get(-1, 1)], [3.0, 103.0]);
    assert_eq!(
        [origin.get(-1, 0), origin.get(-1, 1)],
        [east_of_wrap.get(1, 0), east_of_wrap.get(1, 1)]
    );
    // North padding of (0,0) is (0,1)'s south-most row: M, N.
    assert_eq!(origin.row(-1), &[300.0, 301.0]);
    assert_eq!(origin.row(-1), south_of_wrap.row(1));
}

#[test]
fn repeated_rounds_stay_consistent() {
    let global = labelled_global(6, 6);
    let shape = ProcessShape::new(3, 2);
    let grids = RayonComm::run_world(shape.len(), |comm| {
        let sim = Heatsim::init(comm, shape).unwrap();
        let mut g = sim.distribute(Some(&global)).unwrap();
        for _ in 0..5 {
            sim.exchange_borders(&mut g).unwrap();
        }
        g
    });
    let once = exchange_once(&global, shape);
    for (g, (_, expect)) in grids.iter().zip(&once) {
        assert_eq!(g, expect);
    }
}
