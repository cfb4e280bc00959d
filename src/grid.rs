use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::{Error, MAX_NODES};

/// A rectangular contour held at a fixed potential.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundaryRectangle {
    /// Left edge [m].
    pub x0: f64,
    /// Bottom edge [m].
    pub y0: f64,
    /// Right edge [m].
    pub x1: f64,
    /// Top edge [m].
    pub y1: f64,
    /// Potential imposed on every node of the perimeter [µWb / m].
    pub potential: f64,
}

impl BoundaryRectangle {
    /// Whether `self` lies inside `other`, edges allowed to touch.
    #[inline]
    pub fn is_within(&self, other: &BoundaryRectangle) -> bool {
        self.x0 >= other.x0 && self.x1 <= other.x1 && self.y0 >= other.y0 && self.y1 <= other.y1
    }

    /// Whether `self` lies inside `other` without touching any of its edges.
    #[inline]
    pub fn is_strictly_within(&self, other: &BoundaryRectangle) -> bool {
        self.x0 > other.x0 && self.x1 < other.x1 && self.y0 > other.y0 && self.y1 < other.y1
    }

    fn validate(&self, name: &'static str, potential_name: &'static str) -> Result<(), Error> {
        if !self.potential.is_finite() {
            return Err(Error::NonFinite {
                parameter: potential_name,
                value: self.potential,
            });
        }
        // also rejects NaN corners
        if !(self.x0 < self.x1 && self.y0 < self.y1) {
            return Err(self.bad_geometry(name, "set of rectangles with positive width and height"));
        }
        Ok(())
    }

    fn bad_geometry(&self, rectangle: &'static str, container: &'static str) -> Error {
        Error::BadGeometry {
            rectangle,
            container,
            x0: self.x0,
            y0: self.y0,
            x1: self.x1,
            y1: self.y1,
        }
    }
}

/// Describes the physical domain and its two boundary contours.
#[derive(Copy, Clone, Debug)]
pub struct GridDescriptor {
    /// Domain extent along `x` [m].
    pub width: f64,
    /// Domain extent along `y` [m].
    pub height: f64,
    /// Uniform node spacing [m].
    pub step: f64,
    /// The outer conductor.
    pub outer: BoundaryRectangle,
    /// The inner conductor.
    pub inner: BoundaryRectangle,
}

/// Node potentials of the domain and the mask of nodes held fixed.
///
/// Arrays are indexed `[[row, col]]`, rows following `y` and columns following `x`.
#[derive(Clone, Debug)]
pub struct Grid {
    step: f64,
    potential: Array2<f64>,
    fixed: Array2<bool>,
}

impl Grid {
    /// Creates a grid and stamps the outer, then the inner, boundary onto it.
    pub fn new(desc: GridDescriptor) -> Result<Self, Error> {
        check_positive("step", desc.step)?;
        check_positive("width", desc.width)?;
        check_positive("height", desc.height)?;
        desc.outer.validate("outer", "outer potential")?;
        desc.inner.validate("inner", "inner potential")?;

        let domain = BoundaryRectangle {
            x0: 0.0,
            y0: 0.0,
            x1: desc.width,
            y1: desc.height,
            potential: 0.0,
        };
        if !desc.outer.is_within(&domain) {
            return Err(desc.outer.bad_geometry("outer", "domain"));
        }
        if !desc.inner.is_strictly_within(&desc.outer) {
            return Err(desc.inner.bad_geometry("inner", "outer boundary"));
        }

        let rows = (desc.height / desc.step).floor() + 1.0;
        let cols = (desc.width / desc.step).floor() + 1.0;
        if rows * cols > MAX_NODES as f64 {
            return Err(Error::TooManyNodes {
                n_rows: rows,
                n_cols: cols,
                limit: MAX_NODES,
            });
        }
        let (n_rows, n_cols) = (rows as usize, cols as usize);

        // the outer boundary must stamp the outermost ring of nodes
        let index = |coord: f64| (coord / desc.step) as usize;
        if index(desc.outer.x0) != 0
            || index(desc.outer.y0) != 0
            || index(desc.outer.x1) != n_cols - 1
            || index(desc.outer.y1) != n_rows - 1
        {
            return Err(desc.outer.bad_geometry("outer", "domain perimeter"));
        }

        let mut grid = Self {
            step: desc.step,
            potential: Array2::zeros((n_rows, n_cols)),
            fixed: Array2::from_elem((n_rows, n_cols), false),
        };
        grid.stamp(&desc.outer);
        grid.stamp(&desc.inner);

        Ok(grid)
    }

    /// Creates a grid with every node free, starting from `potential`.
    pub fn from_potential(step: f64, potential: Array2<f64>) -> Result<Self, Error> {
        check_positive("step", step)?;
        let fixed = Array2::from_elem(potential.dim(), false);

        Ok(Self {
            step,
            potential,
            fixed,
        })
    }

    /// Sets every node on the perimeter of `rect` to its potential and marks it fixed.
    fn stamp(&mut self, rect: &BoundaryRectangle) {
        let (ix0, ix1) = (self.index(rect.x0), self.index(rect.x1));
        let (iy0, iy1) = (self.index(rect.y0), self.index(rect.y1));

        for col in ix0..=ix1 {
            for row in [iy0, iy1] {
                self.potential[[row, col]] = rect.potential;
                self.fixed[[row, col]] = true;
            }
        }
        for row in iy0..=iy1 {
            for col in [ix0, ix1] {
                self.potential[[row, col]] = rect.potential;
                self.fixed[[row, col]] = true;
            }
        }
    }

    /// Converts a physical coordinate to a node index, truncating.
    #[inline]
    pub fn index(&self, coord: f64) -> usize {
        (coord / self.step) as usize
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.potential.nrows()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.potential.ncols()
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[inline]
    pub fn potential(&self) -> ArrayView2<f64> {
        self.potential.view()
    }

    #[inline]
    pub fn fixed(&self) -> ArrayView2<bool> {
        self.fixed.view()
    }

    /// Number of nodes a solver is allowed to update.
    pub fn free_nodes(&self) -> usize {
        let (n_rows, n_cols) = self.potential.dim();
        if n_rows < 3 || n_cols < 3 {
            return 0;
        }
        self.fixed
            .slice(ndarray::s![1..-1, 1..-1])
            .iter()
            .filter(|&&fixed| !fixed)
            .count()
    }

    /// Mutable potentials alongside the read-only fixed mask, for solvers.
    #[inline]
    pub fn parts_mut(&mut self) -> (ArrayViewMut2<f64>, ArrayView2<bool>) {
        (self.potential.view_mut(), self.fixed.view())
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), Error> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonPositive { parameter, value })
    }
}
