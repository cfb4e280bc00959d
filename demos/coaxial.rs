use magrelax::prelude::*;

fn main() {
    let problem = ProblemDescriptor {
        outer_width: 0.11, // [m]
        outer_height: 0.06, // [m]
        inner_width: 0.04, // [m]
        inner_height: 0.03, // [m]
        inner_x: 0.02, // [m]
        inner_y: 0.015, // [m]
        step: 0.0025, // [m]
        inner_potential: 100.0, // [µWb / m]
        outer_potential: 0.0, // [µWb / m]
        relative_permeability: 1.0,
    };

    let mut simulation = Simulation::new(SimulationDescriptor {
        solver: GaussSeidelSolver::new(),
        problem,
        estimator: Box::new(FieldIntegral),
    })
    .unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        # of nodes:   {} x {}\n\
        Δ:            {:<9.2e} m\n",
        simulation.grid().n_rows(),
        simulation.grid().n_cols(),
        problem.step,
    );

    // relax until the inductance stops moving, checking every 100 sweeps
    let report = simulation
        .run(RunDescriptor {
            sweeps: 5_000,
            checkpoint_interval: 100,
            stop_policy: StopPolicy::Tolerance { epsilon: 1e-12 },
            verbose: true,
        })
        .unwrap();

    println!(
        "\n-- Result --\n\
        sweeps:       {} ({:?})\n\
        inductance:   {:<9.4e} H/m\n",
        simulation.total_sweeps(),
        report.stop_reason,
        simulation.inductance().unwrap(),
    );

    #[cfg(feature = "save")]
    simulation
        .save(magrelax::SaveSettings {
            filename: "data/coaxial.h5",
            save_type: magrelax::SaveType::Full,
            overwrite: true,
        })
        .unwrap();
}
