//! Derived libraries for other operating corners
//!
//! A scaled library has the same cells and functions as its base library, with area, delays and
//! output slopes multiplied by constant factors. It shares the function index of the base library.

use crate::error::LibraryError;
use crate::library::cell::TimingArc;
use crate::library::library::Library;

/// Multiplicative factors applied by [`Library::scaled`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    /// Factor applied to the cell areas
    pub area: f64,
    /// Factor applied to the delay tables
    pub delay: f64,
    /// Factor applied to the output slope tables
    pub slope: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        ScaleFactors {
            area: 1.0,
            delay: 1.0,
            slope: 1.0,
        }
    }
}

impl ScaleFactors {
    /// Check that all factors are finite and non-negative
    pub fn check(&self) -> Result<(), LibraryError> {
        for (name, value) in [("area", self.area), ("delay", self.delay), ("slope", self.slope)] {
            if !value.is_finite() || value < 0.0 {
                return Err(LibraryError::InvalidScaleFactor { name, value });
            }
        }
        Ok(())
    }
}

impl Library {
    /// Create a library with scaled area and timing
    ///
    /// The scaled library owns its cells, and remains valid after the base library is dropped.
    pub fn scaled(&self, factors: &ScaleFactors) -> Result<Library, LibraryError> {
        factors.check()?;
        let mut cells = self.cells.clone();
        for c in &mut cells {
            c.area *= factors.area;
            for o in &mut c.outputs {
                for arc in &mut o.arcs {
                    *arc = TimingArc {
                        input: arc.input,
                        delay: arc.delay.scaled(factors.delay),
                        slope: arc.slope.scaled(factors.slope),
                    };
                }
            }
        }
        log::info!(
            "Scaled library {} by area {}, delay {}, slope {}",
            self.name(),
            factors.area,
            factors.delay,
            factors.slope
        );
        Ok(self.with_cells(cells))
    }
}
