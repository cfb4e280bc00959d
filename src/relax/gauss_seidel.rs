use crate::relax::{has_interior, stencil_mean};
use crate::{ComputeDescriptor, Solver};

/// Updates nodes in place, row by row, so later nodes of a sweep see earlier updates.
///
/// Converges in roughly half the sweeps of [`JacobiSolver`](super::JacobiSolver), but the
/// intermediate states depend on the sweep order.
#[derive(Copy, Clone, Debug, Default)]
pub struct GaussSeidelSolver;

impl GaussSeidelSolver {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Solver for GaussSeidelSolver {
    fn compute(&mut self, desc: ComputeDescriptor) {
        let (mut potential, fixed) = desc.grid.parts_mut();
        let (n_rows, n_cols) = potential.dim();
        let interior = has_interior((n_rows, n_cols));

        for _ in 0..desc.nsweeps {
            if interior {
                for row in 1..(n_rows - 1) {
                    for col in 1..(n_cols - 1) {
                        if fixed[[row, col]] {
                            continue;
                        }
                        let next = stencil_mean(potential.view(), row, col);
                        potential[[row, col]] = next;
                    }
                }
            }

            if let Some(ref bar) = desc.bar {
                bar.inc(1)
            }
        }
    }
}
