//! Relaxation solvers for the discrete Laplace equation.
//!
//! Each sweep replaces every free interior node with the mean of its four axis neighbours.
//! Nodes on the array perimeter and nodes marked fixed are never written.

mod gauss_seidel;
mod jacobi;

pub use gauss_seidel::GaussSeidelSolver;
pub use jacobi::JacobiSolver;

use ndarray::ArrayView2;

/// Mean of the left, right, lower and upper neighbours of `[[row, col]]`.
#[inline]
pub(crate) fn stencil_mean(potential: ArrayView2<f64>, row: usize, col: usize) -> f64 {
    (potential[[row, col - 1]]
        + potential[[row, col + 1]]
        + potential[[row - 1, col]]
        + potential[[row + 1, col]])
        / 4.0
}

/// Whether a grid of this shape has any node with four neighbours.
#[inline]
pub(crate) fn has_interior((n_rows, n_cols): (usize, usize)) -> bool {
    n_rows >= 3 && n_cols >= 3
}
