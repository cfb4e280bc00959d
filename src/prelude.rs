//! Includes commonly used library components.

pub use crate::{
    BoundaryRectangle,
    ComputeDescriptor,
    CurrentEstimator,
    Grid,
    GridDescriptor,
    HField,
    InductanceEstimator,
    Medium,
    ProblemDescriptor,
    RunDescriptor,
    RunReport,
    Simulation,
    SimulationDescriptor,
    Solver,
    StopPolicy,
    StopReason,
};
pub use crate::inductance::{FieldIntegral, PotentialGradient};
pub use crate::relax::{GaussSeidelSolver, JacobiSolver};
