use heatsim::data::cart2d::{Cart2d, split_axis};
use heatsim::data::grid::Grid;
use heatsim::topology::cartesian::{Coord, ProcessShape};
use proptest::prelude::*;

proptest! {
    #[test]
    fn split_covers_axis_evenly(n in 1usize..200, parts in 1usize..17) {
        prop_assume!(parts <= n);
        let ranges = split_axis(n, parts);
        prop_assert_eq!(ranges.len(), parts);
        prop_assert_eq!(ranges.iter().map(|r| r.1).sum::<usize>(), n);
        let min = ranges.iter().map(|r| r.1).min().unwrap();
        let max = ranges.iter().map(|r| r.1).max().unwrap();
        prop_assert!(max - min <= 1);
        for pair in ranges.windows(2) {
            prop_assert_eq!(pair[0].0 + pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn sub_grids_tile_the_global_grid(
        width in 1usize..40,
        height in 1usize..40,
        dim_x in 1usize..6,
        dim_y in 1usize..6,
    ) {
        prop_assume!(dim_x <= width && dim_y <= height);
        let shape = ProcessShape::new(dim_x, dim_y);
        let cart = Cart2d::empty(width, height, shape, 1).unwrap();
        for y in 0..dim_y {
            let row_width: usize = (0..dim_x)
                .map(|x| cart.get_grid(Coord::new(x, y)).unwrap().width())
                .sum();
            prop_assert_eq!(row_width, width);
        }
        for x in 0..dim_x {
            let col_height: usize = (0..dim_y)
                .map(|y| cart.get_grid(Coord::new(x, y)).unwrap().height())
                .sum();
            prop_assert_eq!(col_height, height);
        }
    }

    #[test]
    fn partition_then_assemble_is_identity(
        width in 1usize..24,
        height in 1usize..24,
        dim_x in 1usize..5,
        dim_y in 1usize..5,
        padding in 0usize..2,
    ) {
        prop_assume!(dim_x <= width && dim_y <= height);
        let data = (0..width * height).map(|i| i as f64 * 0.5).collect();
        let global = Grid::from_vec(width, height, data).unwrap();
        let cart = Cart2d::partition(&global, ProcessShape::new(dim_x, dim_y), padding).unwrap();
        prop_assert_eq!(cart.assemble().unwrap(), global);
    }
}
