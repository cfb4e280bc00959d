//! Inductance per unit length from a discrete Ampère loop around the inner conductor.

mod field_integral;
mod potential_gradient;

pub use field_integral::FieldIntegral;
pub use potential_gradient::PotentialGradient;

use crate::{BoundaryRectangle, Error, Grid, Medium, MIN_CURRENT, POTENTIAL_UNIT};

/// Node indices of the inner conductor's perimeter.
///
/// Every index one node outside the perimeter is guaranteed to be on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContourPath {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl ContourPath {
    /// Locates `inner` on `grid`, failing if the loop just outside it would leave the grid.
    pub fn around(grid: &Grid, inner: &BoundaryRectangle) -> Result<Self, Error> {
        let path = Self {
            row_start: grid.index(inner.y0),
            row_end: grid.index(inner.y1),
            col_start: grid.index(inner.x0),
            col_end: grid.index(inner.x1),
        };

        if path.row_start == 0
            || path.col_start == 0
            || path.row_end >= grid.n_rows().saturating_sub(1)
            || path.col_end >= grid.n_cols().saturating_sub(1)
        {
            return Err(Error::DegenerateContour {
                row_start: path.row_start,
                row_end: path.row_end,
                col_start: path.col_start,
                col_end: path.col_end,
                n_rows: grid.n_rows(),
                n_cols: grid.n_cols(),
            });
        }

        Ok(path)
    }
}

/// Estimates the current enclosed by a `ContourPath`.
pub trait CurrentEstimator {
    /// Enclosed current per unit length [A / m], as a magnitude.
    fn enclosed_current(&self, grid: &Grid, path: &ContourPath, medium: &Medium) -> f64;
}

/// Divides the inner conductor's flux by the current it encloses.
pub struct InductanceEstimator {
    pub medium: Medium,
    pub method: Box<dyn CurrentEstimator>,
}

impl InductanceEstimator {
    /// Inductance per unit length [H / m] of the grid's current state.
    pub fn estimate(&self, grid: &Grid, inner: &BoundaryRectangle) -> Result<f64, Error> {
        let path = ContourPath::around(grid, inner)?;
        let current = self.method.enclosed_current(grid, &path, &self.medium);
        if !current.is_finite() || current.abs() < MIN_CURRENT {
            return Err(Error::DegenerateCurrent { current });
        }

        let flux = inner.potential * POTENTIAL_UNIT;
        Ok(flux / current)
    }
}

/// Trapezoidal sum of evenly spaced samples, in units of the spacing.
pub(crate) fn trapezoid<I: IntoIterator<Item = f64>>(samples: I) -> f64 {
    let mut samples = samples.into_iter();
    let first = match samples.next() {
        Some(first) => first,
        None => return 0.0,
    };
    let (sum, last) = samples.fold((first / 2.0, first), |(sum, _), item| (sum + item, item));
    sum - last / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridDescriptor, Solver};
    use crate::relax::GaussSeidelSolver;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, potential: f64) -> BoundaryRectangle {
        BoundaryRectangle {
            x0,
            y0,
            x1,
            y1,
            potential,
        }
    }

    fn relaxed(inner_potential: f64, outer_potential: f64) -> (Grid, BoundaryRectangle) {
        let inner = rect(1.0, 0.75, 2.0, 1.5, inner_potential);
        let mut grid = Grid::new(GridDescriptor {
            width: 3.0,
            height: 2.25,
            step: 0.125,
            outer: rect(0.0, 0.0, 3.0, 2.25, outer_potential),
            inner,
        })
        .unwrap();
        GaussSeidelSolver::new().relax(&mut grid, 1500);
        (grid, inner)
    }

    fn estimator(method: Box<dyn CurrentEstimator>) -> InductanceEstimator {
        InductanceEstimator {
            medium: Medium::new(1.0).unwrap(),
            method,
        }
    }

    #[test]
    fn trapezoid_halves_end_points() {
        assert_eq!(trapezoid(Vec::new()), 0.0);
        assert_eq!(trapezoid(vec![4.0]), 0.0);
        assert_eq!(trapezoid(vec![2.0, 4.0]), 3.0);
        assert_eq!(trapezoid(vec![2.0, 4.0, 4.0, 6.0]), 12.0);
    }

    #[test]
    fn contour_indices() {
        let (grid, inner) = relaxed(100.0, 0.0);
        let path = ContourPath::around(&grid, &inner).unwrap();
        assert_eq!(
            path,
            ContourPath {
                row_start: 6,
                row_end: 12,
                col_start: 8,
                col_end: 16,
            }
        );
    }

    #[test]
    fn contour_touching_grid_edge_is_degenerate() {
        let grid = Grid::from_potential(1.0, ndarray::Array2::zeros((4, 4))).unwrap();
        let err = ContourPath::around(&grid, &rect(0.5, 1.0, 2.0, 2.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::DegenerateContour { col_start: 0, .. }));

        let err = ContourPath::around(&grid, &rect(1.0, 1.0, 3.0, 2.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::DegenerateContour { col_end: 3, .. }));
    }

    #[test]
    fn far_away_contour_is_degenerate() {
        let grid = Grid::from_potential(1.0, ndarray::Array2::zeros((5, 5))).unwrap();
        let inner = rect(1.0, 1.0, 1e300, 2.0, 1.0);

        let err = ContourPath::around(&grid, &inner).unwrap_err();
        assert!(matches!(err, Error::DegenerateContour { col_end: usize::MAX, .. }));

        let err = estimator(Box::new(PotentialGradient)).estimate(&grid, &inner).unwrap_err();
        assert!(matches!(err, Error::DegenerateContour { .. }));

        let empty = Grid::from_potential(1.0, ndarray::Array2::zeros((0, 0))).unwrap();
        assert!(ContourPath::around(&empty, &rect(1.0, 1.0, 2.0, 2.0, 1.0)).is_err());
    }

    #[test]
    fn strategies_agree() {
        let (grid, inner) = relaxed(100.0, 0.0);
        let from_field = estimator(Box::new(FieldIntegral)).estimate(&grid, &inner).unwrap();
        let from_potential = estimator(Box::new(PotentialGradient))
            .estimate(&grid, &inner)
            .unwrap();

        assert!(from_field > 0.0 && from_potential > 0.0);
        assert_relative_eq!(from_field, from_potential, max_relative = 0.25);
    }

    #[test]
    fn inductance_scales_inversely_with_permeability() {
        let (grid, inner) = relaxed(100.0, 0.0);
        let vacuum = estimator(Box::new(PotentialGradient)).estimate(&grid, &inner).unwrap();
        let ferrite = InductanceEstimator {
            medium: Medium::new(10.0).unwrap(),
            method: Box::new(PotentialGradient),
        }
        .estimate(&grid, &inner)
        .unwrap();

        // the same potential implies ten times less current in the denser medium
        assert_relative_eq!(ferrite, 10.0 * vacuum, max_relative = 1e-12);
    }

    #[test]
    fn flipped_potentials_keep_sign_of_flux() {
        let (grid, inner) = relaxed(-100.0, 0.0);
        let inductance = estimator(Box::new(FieldIntegral)).estimate(&grid, &inner).unwrap();
        assert!(inductance < 0.0);
    }

    #[test]
    fn zero_potentials_are_degenerate() {
        let (grid, inner) = relaxed(0.0, 0.0);
        for method in [
            Box::new(FieldIntegral) as Box<dyn CurrentEstimator>,
            Box::new(PotentialGradient),
        ] {
            let err = estimator(method).estimate(&grid, &inner).unwrap_err();
            assert!(matches!(err, Error::DegenerateCurrent { .. }));
        }
    }
}
