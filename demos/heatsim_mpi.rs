// mpirun -n 4 cargo run --features mpi-support --example heatsim_mpi
//
// Same diffusion as `heatsim_threads`, one MPI process per rank on a 2x2
// process grid. Any failure aborts the whole MPI world.
use heatsim::prelude::*;
use mpi::traits::Communicator as _;

fn main() {
    let universe = mpi::initialize().unwrap();
    let world = universe.world();
    let comm = MpiComm::new().unwrap();
    if comm.size() != 4 {
        eprintln!("This example requires 4 MPI ranks");
        return;
    }

    let global = (comm.rank() == 0).then(|| {
        let mut g = Grid::new(32, 32, 0).unwrap();
        g.set(16, 16, 1000.0);
        g
    });

    let sim = Heatsim::init(comm, ProcessShape::new(2, 2)).unwrap();
    let mut kernel = DiffusionKernel::new(0.2).unwrap();
    match sim.run(global.as_ref(), 100, &mut kernel) {
        Ok(Some(result)) => {
            let total: f64 = result.data().iter().sum();
            println!("total heat after 100 steps: {total:.3}");
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("rank {}: {e}", sim.topology().rank());
            world.abort(1);
        }
    }
    world.barrier();
}
