//! A framework for relaxing 2-dimensional magnetostatic potentials on a uniform grid and
//! estimating the inductance per unit length of a two-conductor line.
//!
//! To get started, refer to the `demos` directory in the main repository.

mod simulation;

pub mod field;
pub mod grid;
pub mod inductance;
pub mod prelude;
pub mod relax;

pub use field::{derive_field, HField, Medium};
pub use grid::{BoundaryRectangle, Grid, GridDescriptor};
pub use inductance::{ContourPath, CurrentEstimator, InductanceEstimator};
pub use simulation::{
    Checkpoint, ProblemDescriptor, RunDescriptor, RunReport, Simulation, SimulationDescriptor,
    StopPolicy, StopReason,
};
#[cfg(feature = "save")]
pub use simulation::{SaveSettings, SaveType};

/// Vacuum permeability [H / m].
pub const MU_0: f64 = 4.0e-7 * std::f64::consts::PI;

/// Unit of the stored potential values, µWb / m expressed in Wb / m.
pub const POTENTIAL_UNIT: f64 = 1e-6;

/// Smallest enclosed current [A / m] accepted when dividing flux by current.
pub const MIN_CURRENT: f64 = 1e-12;

/// Largest number of nodes a grid may allocate.
pub const MAX_NODES: usize = 1 << 28;

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{parameter} must be strictly positive and finite ( got: {value} )")]
    NonPositive {
        parameter: &'static str,
        value: f64,
    },
    #[error("{parameter} must be finite ( got: {value} )")]
    NonFinite {
        parameter: &'static str,
        value: f64,
    },
    #[error("The {rectangle} boundary \
        ( x0: {x0}, y0: {y0}, x1: {x1}, y1: {y1} ) \
        does not lie inside the {container}")]
    BadGeometry {
        rectangle: &'static str,
        container: &'static str,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    #[error("A grid of {n_rows:e} x {n_cols:e} nodes exceeds the limit of {limit} nodes")]
    TooManyNodes {
        n_rows: f64,
        n_cols: f64,
        limit: usize,
    },
    #[error("Checkpoint interval must be at least one sweep")]
    ZeroCheckpointInterval,
    #[error("Integration contour around rows {row_start}..={row_end}, \
        columns {col_start}..={col_end} leaves the {n_rows}x{n_cols} grid")]
    DegenerateContour {
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
        n_rows: usize,
        n_cols: usize,
    },
    #[error("Enclosed current ( {current:e} A/m ) is too small to define an inductance")]
    DegenerateCurrent {
        current: f64,
    },
    #[cfg(feature = "save")]
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

/// Manages the relaxation sweeps.
pub trait Solver {
    /// Runs `desc.nsweeps` full sweeps over the free nodes of `desc.grid`.
    fn compute(&mut self, desc: ComputeDescriptor);

    /// Runs `nsweeps` sweeps without progress reporting.
    fn relax(&mut self, grid: &mut Grid, nsweeps: usize) {
        self.compute(ComputeDescriptor {
            grid,
            nsweeps,
            bar: &None,
        });
    }
}

/// Describes how a `Solver` should do computations.
pub struct ComputeDescriptor<'a> {
    pub grid: &'a mut Grid,
    pub nsweeps: usize,
    pub bar: &'a Option<indicatif::ProgressBar>,
}
