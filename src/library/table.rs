//! Lookup tables with linear interpolation
//!
//! ```
//! use sclib::library::{Axis, NumericTable, Variable};
//!
//! let load = Axis::new(Variable::OutputLoad, vec![0.1, 0.5, 1.0]).unwrap();
//! let table = NumericTable::new_1d(load, vec![0.2, 0.4, 0.9]).unwrap();
//! assert_eq!(table.evaluate(&[0.5]), 0.4);
//! ```

use serde::{Deserialize, Serialize};

/// Independent variable of a table axis
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Transition time of the input signal
    InputSlope,
    /// Capacitive load on the output
    OutputLoad,
    /// Number of sinks of a net
    Fanout,
}

/// Error when building a table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    /// Tables have one or two dimensions
    #[error("tables have one or two dimensions, got {0}")]
    BadDimension(usize),
    /// An axis has no breakpoint
    #[error("axis {0} has no breakpoint")]
    EmptyAxis(usize),
    /// Breakpoints must be strictly increasing
    #[error("breakpoints of axis {axis} are not strictly increasing at position {position}")]
    NotIncreasing {
        /// Axis index
        axis: usize,
        /// Position of the first offending breakpoint
        position: usize,
    },
    /// Breakpoints must be finite
    #[error("breakpoint {position} of axis {axis} is not finite")]
    NonFiniteBreakpoint {
        /// Axis index
        axis: usize,
        /// Position of the offending breakpoint
        position: usize,
    },
    /// Values must be finite
    #[error("value {0} is not finite")]
    NonFiniteValue(usize),
    /// The number of values must match the breakpoints
    #[error("expected {expected} values, got {found}")]
    ShapeMismatch {
        /// Product of the axis lengths
        expected: usize,
        /// Number of values given
        found: usize,
    },
}

/// Axis of a table: a variable and its strictly increasing breakpoints
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    variable: Variable,
    breakpoints: Box<[f64]>,
}

impl Axis {
    /// Create an axis, checking that the breakpoints are finite and strictly increasing
    pub fn new(variable: Variable, breakpoints: Vec<f64>) -> Result<Axis, TableError> {
        let axis = Axis {
            variable,
            breakpoints: breakpoints.into(),
        };
        axis.check(0)?;
        Ok(axis)
    }

    fn check(&self, index: usize) -> Result<(), TableError> {
        if self.breakpoints.is_empty() {
            return Err(TableError::EmptyAxis(index));
        }
        if let Some(position) = self.breakpoints.iter().position(|b| !b.is_finite()) {
            return Err(TableError::NonFiniteBreakpoint {
                axis: index,
                position,
            });
        }
        if let Some(position) = self.breakpoints.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::NotIncreasing {
                axis: index,
                position: position + 1,
            });
        }
        Ok(())
    }

    /// Variable indexed by the axis
    pub fn variable(&self) -> Variable {
        self.variable
    }

    /// Breakpoints of the axis
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Number of breakpoints
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// Returns whether the axis has no breakpoint; never true for a valid axis
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Find the interval used for `x` and the position of `x` within it
    ///
    /// Coordinates outside the breakpoints use the first or last interval, with a position
    /// below 0 or above 1.
    fn segment(&self, x: f64) -> (usize, f64) {
        let n = self.breakpoints.len();
        if n == 1 {
            return (0, 0.0);
        }
        let upper = self.breakpoints.partition_point(|b| *b <= x).clamp(1, n - 1);
        let lower = upper - 1;
        let t = (x - self.breakpoints[lower]) / (self.breakpoints[upper] - self.breakpoints[lower]);
        (lower, t)
    }

    /// Interpolate along the axis, given the value at each breakpoint
    fn interpolate<F: Fn(usize) -> f64>(&self, x: f64, value: F) -> f64 {
        if self.breakpoints.len() == 1 {
            return value(0);
        }
        let (i, t) = self.segment(x);
        lerp(value(i), value(i + 1), t)
    }
}

/// Linear interpolation, exact at both ends
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// One or two-dimensional lookup table
///
/// Values are interpolated linearly (bilinearly in two dimensions) between breakpoints,
/// and extrapolated linearly outside, using the slope of the closest interval.
/// Two-dimensional values are stored row-major, with one row per breakpoint of the first axis.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    axes: Box<[Axis]>,
    values: Box<[f64]>,
}

impl NumericTable {
    /// Create a table from its axes and values
    pub fn new(axes: Vec<Axis>, values: Vec<f64>) -> Result<NumericTable, TableError> {
        if axes.is_empty() || axes.len() > 2 {
            return Err(TableError::BadDimension(axes.len()));
        }
        for (i, a) in axes.iter().enumerate() {
            a.check(i)?;
        }
        let expected: usize = axes.iter().map(|a| a.len()).product();
        if values.len() != expected {
            return Err(TableError::ShapeMismatch {
                expected,
                found: values.len(),
            });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(TableError::NonFiniteValue(i));
        }
        Ok(NumericTable {
            axes: axes.into(),
            values: values.into(),
        })
    }

    /// Create a one-dimensional table
    pub fn new_1d(axis: Axis, values: Vec<f64>) -> Result<NumericTable, TableError> {
        NumericTable::new(vec![axis], values)
    }

    /// Create a two-dimensional table from row-major values
    pub fn new_2d(axis1: Axis, axis2: Axis, values: Vec<f64>) -> Result<NumericTable, TableError> {
        NumericTable::new(vec![axis1, axis2], values)
    }

    /// Create a table with the same value everywhere
    pub fn constant(value: f64) -> NumericTable {
        NumericTable {
            axes: vec![Axis {
                variable: Variable::OutputLoad,
                breakpoints: vec![0.0].into(),
            }]
            .into(),
            values: vec![value].into(),
        }
    }

    /// Number of dimensions
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Axes of the table
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Values of the table, row-major
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Evaluate the table; coordinates are given in the order of the axes
    ///
    /// A missing coordinate is taken as the first breakpoint of its axis.
    pub fn evaluate(&self, coords: &[f64]) -> f64 {
        let coord = |i: usize| {
            coords
                .get(i)
                .copied()
                .unwrap_or(self.axes[i].breakpoints[0])
        };
        match &*self.axes {
            [a] => a.interpolate(coord(0), |k| self.values[k]),
            [a, b] => {
                let y = coord(1);
                a.interpolate(coord(0), |r| {
                    b.interpolate(y, |k| self.values[r * b.len() + k])
                })
            }
            _ => self.values[0],
        }
    }

    /// Evaluate the table, with coordinates given by variable
    pub fn evaluate_with<F: Fn(Variable) -> f64>(&self, coord: F) -> f64 {
        match &*self.axes {
            [a] => self.evaluate(&[coord(a.variable)]),
            [a, b] => self.evaluate(&[coord(a.variable), coord(b.variable)]),
            _ => self.values[0],
        }
    }

    /// Copy of the table with all values multiplied by a factor
    pub fn scaled(&self, factor: f64) -> NumericTable {
        NumericTable {
            axes: self.axes.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }
}
