use crate::inductance::{trapezoid, ContourPath, CurrentEstimator};
use crate::{Grid, Medium, POTENTIAL_UNIT};

/// Sums the potential drop between each perimeter node and its outward neighbour.
///
/// Reads the potential directly, skipping field derivation.
#[derive(Copy, Clone, Debug, Default)]
pub struct PotentialGradient;

impl CurrentEstimator for PotentialGradient {
    fn enclosed_current(&self, grid: &Grid, path: &ContourPath, medium: &Medium) -> f64 {
        let a = grid.potential();
        let rows = path.row_start..=path.row_end;
        let cols = path.col_start..=path.col_end;

        let bottom = trapezoid(cols.clone().map(|col| a[[path.row_start, col]] - a[[path.row_start - 1, col]]));
        let top = trapezoid(cols.map(|col| a[[path.row_end, col]] - a[[path.row_end + 1, col]]));
        let left = trapezoid(rows.clone().map(|row| a[[row, path.col_start]] - a[[row, path.col_start - 1]]));
        let right = trapezoid(rows.map(|row| a[[row, path.col_end]] - a[[row, path.col_end + 1]]));

        // normal gradient times the step along the path: the step cancels
        (bottom + top + left + right).abs() * POTENTIAL_UNIT / medium.permeability()
    }
}
