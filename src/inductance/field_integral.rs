use crate::inductance::{trapezoid, ContourPath, CurrentEstimator};
use crate::{derive_field, Grid, Medium};

/// Integrates the tangential field over the ring of cells straddling the conductor's edge.
///
/// Each cell contributes the magnitude of its tangential component, so the result does not
/// depend on the direction the field circulates in.
#[derive(Copy, Clone, Debug, Default)]
pub struct FieldIntegral;

impl CurrentEstimator for FieldIntegral {
    fn enclosed_current(&self, grid: &Grid, path: &ContourPath, medium: &Medium) -> f64 {
        let field = derive_field(grid, medium);
        let (below, above) = (path.row_start - 1, path.row_end);
        let (left, right) = (path.col_start - 1, path.col_end);

        let horizontal = |row: usize| trapezoid((left..=right).map(|col| field.hx[[row, col]].abs()));
        let vertical = |col: usize| trapezoid((below..=above).map(|row| field.hy[[row, col]].abs()));

        grid.step() * (horizontal(below) + horizontal(above) + vertical(left) + vertical(right))
    }
}
