//! Magnetic field intensity derived from the relaxed potential.

use ndarray::Array2;

use crate::{Error, Grid, MU_0, POTENTIAL_UNIT};

/// The medium filling the space between the conductors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Medium {
    relative_permeability: f64,
}

impl Medium {
    /// Creates a medium, rejecting non-positive permeabilities.
    pub fn new(relative_permeability: f64) -> Result<Self, Error> {
        if relative_permeability > 0.0 && relative_permeability.is_finite() {
            Ok(Self { relative_permeability })
        } else {
            Err(Error::NonPositive {
                parameter: "relative permeability",
                value: relative_permeability,
            })
        }
    }

    #[inline]
    pub fn relative_permeability(&self) -> f64 {
        self.relative_permeability
    }

    /// Absolute permeability [H / m].
    #[inline]
    pub fn permeability(&self) -> f64 {
        self.relative_permeability * MU_0
    }
}

/// Field intensity [A / m], one vector per cell of four neighbouring nodes.
///
/// Both arrays have shape `(n_rows - 1, n_cols - 1)`; cell `[[i, j]]` spans nodes
/// `[[i, j]]` to `[[i + 1, j + 1]]`.
#[derive(Clone, Debug)]
pub struct HField {
    pub hx: Array2<f64>,
    pub hy: Array2<f64>,
}

impl HField {
    /// Per-cell field magnitude.
    pub fn magnitude(&self) -> Array2<f64> {
        ndarray::Zip::from(&self.hx)
            .and(&self.hy)
            .map_collect(|&hx, &hy| hx.hypot(hy))
    }

    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        self.hx.dim()
    }
}

/// Finite-difference field of the grid's current potential.
///
/// Fixed and free nodes are treated alike. The result only means something once the grid
/// has converged.
pub fn derive_field(grid: &Grid, medium: &Medium) -> HField {
    let shape = (
        grid.n_rows().saturating_sub(1),
        grid.n_cols().saturating_sub(1),
    );
    let mut hx = Array2::<f64>::zeros(shape);
    let mut hy = Array2::<f64>::zeros(shape);
    let scale = POTENTIAL_UNIT / (2.0 * medium.permeability() * grid.step());

    ndarray::Zip::from(&mut hx)
        .and(&mut hy)
        .and(grid.potential().windows((2, 2)))
        .for_each(|hx, hy, a| {
            *hx = (a[[0, 0]] + a[[0, 1]] - a[[1, 0]] - a[[1, 1]]) * scale;
            *hy = (a[[0, 0]] + a[[1, 0]] - a[[0, 1]] - a[[1, 1]]) * scale;
        });

    HField { hx, hy }
}
