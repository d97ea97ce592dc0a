// cargo run --example heatsim_threads
//
// Diffuses a hot square on a 32x24 torus using 6 in-process ranks laid out
// 3x2 and prints the total heat and peak before and after.
use heatsim::prelude::*;

fn main() -> Result<(), HeatsimError> {
    let (width, height) = (32, 24);
    let mut global = Grid::new(width, height, 0)?;
    for y in 10..14 {
        for x in 14..18 {
            global.set(x, y, 100.0);
        }
    }

    let config = HeatsimConfig {
        dim_x: 3,
        dim_y: 2,
        iterations: 200,
        ..HeatsimConfig::default()
    };

    let mut results = RayonComm::run_world(config.shape().len(), |comm| {
        let sim = Heatsim::from_config(comm, &config)?;
        let mut kernel = DiffusionKernel::new(0.2)?;
        sim.run(Some(&global), config.iterations, &mut kernel)
    });
    let result = results.swap_remove(0)?.ok_or_else(|| {
        HeatsimError::Config("coordinator returned no result".into())
    })?;

    let stats = |g: &Grid| {
        let total: f64 = g.data().iter().sum();
        let peak = g.data().iter().copied().fold(f64::MIN, f64::max);
        (total, peak)
    };
    println!("before: total {:.3}, peak {:.3}", stats(&global).0, stats(&global).1);
    println!("after:  total {:.3}, peak {:.3}", stats(&result).0, stats(&result).1);
    Ok(())
}
