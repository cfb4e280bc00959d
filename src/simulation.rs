use std::cmp::min;
#[cfg(feature = "save")]
use std::path::Path;

use crate::{
    derive_field, BoundaryRectangle, ComputeDescriptor, CurrentEstimator, Error, Grid,
    GridDescriptor, HField, InductanceEstimator, Medium, Solver,
};

/// Problem specific parameters, all in SI units except the potentials.
#[derive(Copy, Clone, Debug)]
pub struct ProblemDescriptor {
    /// Width of the outer conductor, which fills the whole domain [m].
    pub outer_width: f64,
    /// Height of the outer conductor [m].
    pub outer_height: f64,
    /// Width of the inner conductor [m].
    pub inner_width: f64,
    /// Height of the inner conductor [m].
    pub inner_height: f64,
    /// Horizontal offset of the inner conductor from the origin [m].
    pub inner_x: f64,
    /// Vertical offset of the inner conductor from the origin [m].
    pub inner_y: f64,
    /// Node spacing [m].
    pub step: f64,
    /// Potential held on the inner conductor [µWb / m].
    pub inner_potential: f64,
    /// Potential held on the outer conductor [µWb / m].
    pub outer_potential: f64,
    /// Relative permeability of the medium between the conductors.
    pub relative_permeability: f64,
}

impl ProblemDescriptor {
    pub fn outer(&self) -> BoundaryRectangle {
        BoundaryRectangle {
            x0: 0.0,
            y0: 0.0,
            x1: self.outer_width,
            y1: self.outer_height,
            potential: self.outer_potential,
        }
    }

    pub fn inner(&self) -> BoundaryRectangle {
        BoundaryRectangle {
            x0: self.inner_x,
            y0: self.inner_y,
            x1: self.inner_x + self.inner_width,
            y1: self.inner_y + self.inner_height,
            potential: self.inner_potential,
        }
    }

    pub fn grid_descriptor(&self) -> GridDescriptor {
        GridDescriptor {
            width: self.outer_width,
            height: self.outer_height,
            step: self.step,
            outer: self.outer(),
            inner: self.inner(),
        }
    }
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
    /// The geometry, potentials and medium.
    pub problem: ProblemDescriptor,
    /// How the enclosed current is estimated.
    pub estimator: Box<dyn CurrentEstimator>,
}

/// When a run may stop before its sweep budget is spent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopPolicy {
    /// Always run every sweep.
    Budget,
    /// Stop once the inductance changes by at most `epsilon` [H / m] between checkpoints.
    Tolerance { epsilon: f64 },
}

/// Describes a simulation run.
#[derive(Copy, Clone, Debug)]
pub struct RunDescriptor {
    /// Maximum number of sweeps to perform.
    pub sweeps: usize,
    /// Number of sweeps between inductance checkpoints.
    pub checkpoint_interval: usize,
    /// Whether the run may end early.
    pub stop_policy: StopPolicy,
    /// Whether or not to print information to the console.
    pub verbose: bool,
}

/// The inductance observed after a batch of sweeps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Checkpoint {
    /// Sweeps performed since the simulation was created.
    pub sweeps: usize,
    /// `None` when the estimate was degenerate at this point.
    pub inductance: Option<f64>,
}

/// Why a run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every sweep was performed under `StopPolicy::Budget`.
    BudgetExhausted,
    /// The inductance settled within tolerance.
    Converged,
    /// Every sweep was performed without the inductance settling.
    ToleranceNotReached,
}

/// Summary of one call to `Simulation::run`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunReport {
    /// Sweeps performed during this run.
    pub sweeps: usize,
    pub stop_reason: StopReason,
}

/// How data should be saved to file.
#[cfg(feature = "save")]
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether or not to replace an existing file.
    pub overwrite: bool,
}

/// Represents what data to save.
#[cfg(feature = "save")]
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save the potential, the fixed mask and the convergence history.
    Potential,
    /// Also save both field components.
    Full,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
    problem: ProblemDescriptor,
    grid: Grid,
    estimator: InductanceEstimator,
    history: Vec<Checkpoint>,
    total_sweeps: usize,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance, validating the whole problem up front.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        let medium = Medium::new(desc.problem.relative_permeability)?;
        let grid = Grid::new(desc.problem.grid_descriptor())?;

        Ok(Self {
            solver: desc.solver,
            problem: desc.problem,
            grid,
            estimator: InductanceEstimator {
                medium,
                method: desc.estimator,
            },
            history: Vec::new(),
            total_sweeps: 0,
        })
    }

    /// Does a computational run.
    pub fn run(&mut self, desc: RunDescriptor) -> Result<RunReport, Error> {
        if desc.checkpoint_interval == 0 {
            return Err(Error::ZeroCheckpointInterval);
        }

        // setup output if verbose
        let bar = if desc.verbose {
            println!(
                "# of sweeps: {} ({}x{} nodes, {} free)",
                desc.sweeps,
                self.grid.n_rows(),
                self.grid.n_cols(),
                self.grid.free_nodes(),
            );
            Some(indicatif::ProgressBar::new(desc.sweeps as u64))
        } else {
            None
        };

        // separate sweeps into batches with a checkpoint after each one
        let mut done = 0;
        let mut stop_reason = match desc.stop_policy {
            StopPolicy::Budget => StopReason::BudgetExhausted,
            StopPolicy::Tolerance { .. } => StopReason::ToleranceNotReached,
        };
        while done < desc.sweeps {
            let nsweeps = min(desc.checkpoint_interval, desc.sweeps - done);
            self.solver.compute(ComputeDescriptor {
                grid: &mut self.grid,
                nsweeps,
                bar: &bar,
            });
            done += nsweeps;
            self.total_sweeps += nsweeps;

            let previous = self.history.last().and_then(|checkpoint| checkpoint.inductance);
            let inductance = self.inductance().ok();
            self.history.push(Checkpoint {
                sweeps: self.total_sweeps,
                inductance,
            });

            if let Some(ref bar) = bar {
                match inductance {
                    Some(value) => bar.println(format!(
                        "sweep {:>7}: inductance {:.6e} H/m",
                        self.total_sweeps, value,
                    )),
                    None => bar.println(format!(
                        "sweep {:>7}: inductance undefined",
                        self.total_sweeps,
                    )),
                }
            }

            if let (StopPolicy::Tolerance { epsilon }, Some(last), Some(next)) =
                (desc.stop_policy, previous, inductance)
            {
                if (next - last).abs() <= epsilon {
                    stop_reason = StopReason::Converged;
                    break;
                }
            }
        }

        if let Some(ref bar) = bar {
            bar.finish();
            if stop_reason == StopReason::ToleranceNotReached {
                eprintln!(
                    "warning: inductance did not settle within {} sweeps",
                    desc.sweeps,
                );
            }
        }

        Ok(RunReport {
            sweeps: done,
            stop_reason,
        })
    }

    /// Inductance per unit length [H / m] of the current state.
    #[inline]
    pub fn inductance(&self) -> Result<f64, Error> {
        self.estimator.estimate(&self.grid, &self.problem.inner())
    }

    /// Field intensity of the current state.
    #[inline]
    pub fn field(&self) -> HField {
        derive_field(&self.grid, &self.estimator.medium)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn problem(&self) -> &ProblemDescriptor {
        &self.problem
    }

    /// Every checkpoint recorded so far, oldest first.
    #[inline]
    pub fn history(&self) -> &[Checkpoint] {
        &self.history
    }

    #[inline]
    pub fn total_sweeps(&self) -> usize {
        self.total_sweeps
    }

    /// Writes the current state to an HDF5 file.
    #[cfg(feature = "save")]
    pub fn save<P: AsRef<Path>>(&self, settings: SaveSettings<P>) -> Result<(), Error> {
        let filename = settings.filename.as_ref();
        let file = if settings.overwrite {
            hdf5::File::create(filename)?
        } else {
            hdf5::File::create_excl(filename)?
        };
        let (n_rows, n_cols) = (self.grid.n_rows(), self.grid.n_cols());

        file.new_dataset::<f64>()
            .shape((n_rows, n_cols))
            .create("potential")?
            .write(self.grid.potential())?;
        file.new_dataset::<u8>()
            .shape((n_rows, n_cols))
            .create("fixed")?
            .write(&self.grid.fixed().mapv(u8::from))?;

        // only checkpoints with a defined inductance
        let (sweeps, inductances): (Vec<u64>, Vec<f64>) = self
            .history
            .iter()
            .filter_map(|c| c.inductance.map(|value| (c.sweeps as u64, value)))
            .unzip();
        let convergence_group = file.create_group("convergence")?;
        convergence_group.new_dataset::<u64>()
            .shape(sweeps.len())
            .create("sweeps")?
            .write(&ndarray::Array1::from(sweeps))?;
        convergence_group.new_dataset::<f64>()
            .shape(inductances.len())
            .create("inductance")?
            .write(&ndarray::Array1::from(inductances))?;

        if settings.save_type == SaveType::Full {
            let field = self.field();
            let field_group = file.create_group("field")?;
            field_group.new_dataset::<f64>()
                .shape(field.dim())
                .create("hx")?
                .write(&field.hx)?;
            field_group.new_dataset::<f64>()
                .shape(field.dim())
                .create("hy")?
                .write(&field.hy)?;
        }

        // save scalars as file attributes
        file.new_attr::<f64>()
            .shape(hdf5::Extents::Scalar)
            .create("step")?
            .write_scalar(&self.grid.step())?;
        file.new_attr::<u64>()
            .shape(hdf5::Extents::Scalar)
            .create("total_sweeps")?
            .write_scalar(&(self.total_sweeps as u64))?;

        file.close()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inductance::PotentialGradient;
    use crate::relax::GaussSeidelSolver;

    fn problem() -> ProblemDescriptor {
        ProblemDescriptor {
            outer_width: 3.0,
            outer_height: 2.0,
            inner_width: 1.0,
            inner_height: 0.5,
            inner_x: 1.0,
            inner_y: 0.75,
            step: 0.125,
            inner_potential: 100.0,
            outer_potential: 0.0,
            relative_permeability: 1.0,
        }
    }

    fn simulation(problem: ProblemDescriptor) -> Result<Simulation<GaussSeidelSolver>, Error> {
        Simulation::new(SimulationDescriptor {
            solver: GaussSeidelSolver::new(),
            problem,
            estimator: Box::new(PotentialGradient),
        })
    }

    fn run(sweeps: usize, checkpoint_interval: usize, stop_policy: StopPolicy) -> RunDescriptor {
        RunDescriptor {
            sweeps,
            checkpoint_interval,
            stop_policy,
            verbose: false,
        }
    }

    #[test]
    fn rectangles_follow_offsets() {
        let inner = problem().inner();
        assert_eq!((inner.x0, inner.y0, inner.x1, inner.y1), (1.0, 0.75, 2.0, 1.25));
        assert_eq!(inner.potential, 100.0);
        let outer = problem().outer();
        assert_eq!((outer.x0, outer.y0, outer.x1, outer.y1), (0.0, 0.0, 3.0, 2.0));
    }

    #[test]
    fn rejects_bad_permeability() {
        let err = simulation(ProblemDescriptor {
            relative_permeability: -1.0,
            ..problem()
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::NonPositive { .. }));
    }

    #[test]
    fn rejects_zero_checkpoint_interval() {
        let mut sim = simulation(problem()).unwrap();
        let err = sim.run(run(10, 0, StopPolicy::Budget)).unwrap_err();
        assert!(matches!(err, Error::ZeroCheckpointInterval));
        assert_eq!(sim.total_sweeps(), 0);
    }

    #[test]
    fn budget_runs_every_batch() {
        let mut sim = simulation(problem()).unwrap();
        let report = sim.run(run(250, 100, StopPolicy::Budget)).unwrap();

        assert_eq!(report, RunReport { sweeps: 250, stop_reason: StopReason::BudgetExhausted });
        let sweeps: Vec<usize> = sim.history().iter().map(|c| c.sweeps).collect();
        assert_eq!(sweeps, vec![100, 200, 250]);
        assert!(sim.history().iter().all(|c| c.inductance.is_some()));
    }

    #[test]
    fn tolerance_stops_early() {
        let mut sim = simulation(problem()).unwrap();
        let report = sim
            .run(run(20_000, 100, StopPolicy::Tolerance { epsilon: 1e-15 }))
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::Converged);
        assert!(report.sweeps < 20_000);
        assert_eq!(sim.total_sweeps(), report.sweeps);
    }

    #[test]
    fn tolerance_not_reached_is_reported() {
        let mut sim = simulation(problem()).unwrap();
        let report = sim
            .run(run(300, 100, StopPolicy::Tolerance { epsilon: 0.0 }))
            .unwrap();

        assert_eq!(report, RunReport { sweeps: 300, stop_reason: StopReason::ToleranceNotReached });
    }

    #[test]
    fn runs_accumulate() {
        let mut sim = simulation(problem()).unwrap();
        sim.run(run(50, 50, StopPolicy::Budget)).unwrap();
        sim.run(run(30, 50, StopPolicy::Budget)).unwrap();

        assert_eq!(sim.total_sweeps(), 80);
        assert_eq!(sim.history().last().unwrap().sweeps, 80);
    }

    #[test]
    fn empty_run_is_a_no_op() {
        let mut sim = simulation(problem()).unwrap();
        sim.run(run(200, 100, StopPolicy::Budget)).unwrap();
        let before = sim.grid().potential().to_owned();

        let report = sim.run(run(0, 100, StopPolicy::Budget)).unwrap();

        assert_eq!(report.sweeps, 0);
        assert_eq!(sim.grid().potential(), before.view());
        assert_eq!(sim.history().len(), 2);
    }

    #[cfg(feature = "save")]
    #[test]
    fn save_writes_layout_and_keeps_existing_files() {
        let mut sim = simulation(problem()).unwrap();
        sim.run(run(200, 100, StopPolicy::Budget)).unwrap();

        let path = std::env::temp_dir().join(format!("magrelax-save-{}.h5", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let settings = |overwrite| SaveSettings {
            filename: path.clone(),
            save_type: SaveType::Full,
            overwrite,
        };

        sim.save(settings(false)).unwrap();
        {
            let file = hdf5::File::open(&path).unwrap();
            let potential = file.dataset("potential").unwrap().read_2d::<f64>().unwrap();
            assert_eq!(potential, sim.grid().potential());
            let fixed = file.dataset("fixed").unwrap().read_2d::<u8>().unwrap();
            assert_eq!(fixed, sim.grid().fixed().mapv(u8::from));

            let sweeps = file.dataset("convergence/sweeps").unwrap().read_1d::<u64>().unwrap();
            assert_eq!(sweeps.to_vec(), vec![100, 200]);
            let inductance = file.dataset("convergence/inductance").unwrap().read_1d::<f64>().unwrap();
            assert_eq!(inductance.len(), 2);
            assert_eq!(inductance[1], sim.inductance().unwrap());

            let field = sim.field();
            assert_eq!(file.dataset("field/hx").unwrap().read_2d::<f64>().unwrap(), field.hx);
            assert_eq!(file.dataset("field/hy").unwrap().read_2d::<f64>().unwrap(), field.hy);

            assert_eq!(file.attr("step").unwrap().read_scalar::<f64>().unwrap(), 0.125);
            assert_eq!(file.attr("total_sweeps").unwrap().read_scalar::<u64>().unwrap(), 200);
        }

        assert!(matches!(sim.save(settings(false)), Err(Error::H5Error(_))));
        sim.save(settings(true)).unwrap();

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn field_matches_grid_shape() {
        let sim = simulation(problem()).unwrap();
        assert_eq!(
            sim.field().dim(),
            (sim.grid().n_rows() - 1, sim.grid().n_cols() - 1)
        );
    }
}
