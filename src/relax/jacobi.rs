use ndarray::{s, Array2};

use crate::relax::has_interior;
use crate::{ComputeDescriptor, Solver};

/// Computes every node of a sweep from the previous sweep's values.
///
/// The result of a sweep does not depend on the order nodes are visited in, at the cost of
/// a second potential buffer kept between calls.
#[derive(Clone, Debug, Default)]
pub struct JacobiSolver {
    scratch: Array2<f64>,
}

impl JacobiSolver {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for JacobiSolver {
    fn compute(&mut self, desc: ComputeDescriptor) {
        let (mut potential, fixed) = desc.grid.parts_mut();
        if self.scratch.dim() != potential.dim() {
            self.scratch = Array2::zeros(potential.dim());
        }
        let interior = has_interior(potential.dim());

        for _ in 0..desc.nsweeps {
            // fixed and perimeter nodes carry over unchanged
            self.scratch.assign(&potential);

            if interior {
                ndarray::Zip::from(self.scratch.slice_mut(s![1..-1, 1..-1]))
                    .and(potential.windows((3, 3)))
                    .and(fixed.slice(s![1..-1, 1..-1]))
                    .for_each(|next, last, &is_fixed| {
                        if !is_fixed {
                            *next = (last[[1, 0]] + last[[1, 2]] + last[[0, 1]] + last[[2, 1]]) / 4.0;
                        }
                    });
            }
            potential.assign(&self.scratch);

            if let Some(ref bar) = desc.bar {
                bar.inc(1)
            }
        }
    }
}
