use crate::error::LibraryError;
use crate::library::table::{Axis, NumericTable, TableError, Variable};

/// Wire load model: estimated net capacitance as a function of the fanout
#[derive(Debug, Clone, PartialEq)]
pub struct WireLoad {
    name: String,
    capacitance: NumericTable,
}

impl WireLoad {
    /// Create a model from the capacitance at each fanout breakpoint
    pub fn new(
        name: &str,
        fanout: Vec<f64>,
        capacitance: Vec<f64>,
    ) -> Result<WireLoad, LibraryError> {
        let table = Axis::new(Variable::Fanout, fanout)
            .and_then(|axis| NumericTable::new_1d(axis, capacitance))
            .map_err(|source| LibraryError::MalformedWireLoad {
                name: name.to_string(),
                source,
            })?;
        Ok(WireLoad {
            name: name.to_string(),
            capacitance: table,
        })
    }

    /// Create a model from a one-dimensional table indexed by fanout
    pub fn from_table(name: &str, table: NumericTable) -> Result<WireLoad, LibraryError> {
        let axes = table.axes();
        if axes.len() != 1 || axes[0].variable() != Variable::Fanout {
            return Err(LibraryError::MalformedWireLoad {
                name: name.to_string(),
                source: TableError::BadDimension(axes.len()),
            });
        }
        Ok(WireLoad {
            name: name.to_string(),
            capacitance: table,
        })
    }

    /// Name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacitance table
    pub fn table(&self) -> &NumericTable {
        &self.capacitance
    }

    /// Estimated wire capacitance of a net with this fanout
    pub fn capacitance(&self, fanout: usize) -> f64 {
        self.capacitance.evaluate(&[fanout as f64])
    }
}

#[cfg(test)]
mod tests {
    use super::WireLoad;
    use crate::error::LibraryError;
    use crate::library::{Axis, NumericTable, Variable};

    #[test]
    fn test_capacitance() {
        let w = WireLoad::new("small", vec![1.0, 2.0, 4.0], vec![0.01, 0.02, 0.05]).unwrap();
        assert_eq!(w.name(), "small");
        assert_eq!(w.capacitance(1), 0.01);
        assert_eq!(w.capacitance(4), 0.05);
        assert!((w.capacitance(3) - 0.035).abs() < 1e-12);
        // Extrapolated with the last interval
        assert!((w.capacitance(6) - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_malformed() {
        let res = WireLoad::new("bad", vec![2.0, 1.0], vec![0.01, 0.02]);
        assert!(matches!(res, Err(LibraryError::MalformedWireLoad { name, .. }) if name == "bad"));
        let res = WireLoad::new("bad", vec![1.0, 2.0], vec![0.01]);
        assert!(res.is_err());
        let load = Axis::new(Variable::OutputLoad, vec![1.0]).unwrap();
        let table = NumericTable::new_1d(load, vec![0.1]).unwrap();
        assert!(WireLoad::from_table("load", table).is_err());
    }
}
