//! Compute library statistics
//!
//! ```
//! # use sclib::Library;
//! # let lib = Library::build(Vec::new()).unwrap();
//! use sclib::library::stats::stats;
//! let stats = stats(&lib);
//!
//! // Check that there is no multi-output cell
//! assert_eq!(stats.nb_multi_output, 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::fmt;

use crate::library::library::Library;

/// Number of cells, functions and area range of a library
#[derive(Clone, Debug)]
pub struct LibraryStats {
    /// Number of cells
    pub nb_cells: usize,
    /// Number of cell outputs
    pub nb_outputs: usize,
    /// Number of cells with several outputs
    pub nb_multi_output: usize,
    /// Number of NPN classes
    pub nb_classes: usize,
    /// Number of groups of cells with the same functions
    pub nb_size_groups: usize,
    /// Number of cells by number of inputs
    pub arity: Vec<usize>,
    /// Smallest cell area
    pub min_area: f64,
    /// Largest cell area
    pub max_area: f64,
    /// Sum of the cell areas
    pub total_area: f64,
}

impl LibraryStats {
    /// Record a new cell
    fn add_cell(&mut self, nb_inputs: usize, nb_outputs: usize, area: f64) {
        self.nb_cells += 1;
        self.nb_outputs += nb_outputs;
        if nb_outputs > 1 {
            self.nb_multi_output += 1;
        }
        while self.arity.len() <= nb_inputs {
            self.arity.push(0);
        }
        self.arity[nb_inputs] += 1;
        self.min_area = self.min_area.min(area);
        self.max_area = self.max_area.max(area);
        self.total_area += area;
    }
}

impl fmt::Display for LibraryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Cells: {}", self.nb_cells)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        if self.nb_multi_output != 0 {
            writeln!(f, "      multi-output cells: {}", self.nb_multi_output)?;
        }
        writeln!(f, "  NPN classes: {}", self.nb_classes)?;
        writeln!(f, "  Size groups: {}", self.nb_size_groups)?;
        if self.nb_cells != 0 {
            writeln!(f, "  Inputs:")?;
            for (i, nb) in self.arity.iter().enumerate() {
                if *nb != 0 {
                    writeln!(f, "      {}: {}", i, nb)?;
                }
            }
            writeln!(
                f,
                "  Area: {} to {}, total {}",
                self.min_area, self.max_area, self.total_area
            )?;
        }
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the library
pub fn stats(lib: &Library) -> LibraryStats {
    let mut ret = LibraryStats {
        nb_cells: 0,
        nb_outputs: 0,
        nb_multi_output: 0,
        nb_classes: lib.nb_classes(),
        nb_size_groups: lib.nb_size_groups(),
        arity: Vec::new(),
        min_area: f64::INFINITY,
        max_area: f64::NEG_INFINITY,
        total_area: 0.0,
    };
    for c in lib.cells() {
        ret.add_cell(c.nb_inputs(), c.nb_outputs(), c.area());
    }
    if ret.nb_cells == 0 {
        ret.min_area = 0.0;
        ret.max_area = 0.0;
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::stats;
    use crate::library::{Cell, InputPin, Library, NumericTable, OutputPin, TimingArc};
    use crate::npn::TruthTable;

    fn arcs(n: usize) -> Vec<TimingArc> {
        (0..n)
            .map(|i| TimingArc::new(i, NumericTable::constant(0.1), NumericTable::constant(0.1)))
            .collect()
    }

    #[test]
    fn test_stats() {
        let inv = Cell::new(
            "INV",
            1.0,
            vec![InputPin::new("A", 0.001)],
            vec![OutputPin::new("Y", TruthTable::parse(1, "01").unwrap(), arcs(1))],
        )
        .unwrap();
        let ha = Cell::new(
            "HA",
            6.0,
            vec![InputPin::new("A", 0.001), InputPin::new("B", 0.001)],
            vec![
                OutputPin::new("S", TruthTable::parse(2, "0110").unwrap(), arcs(2)),
                OutputPin::new("C", TruthTable::parse(2, "1000").unwrap(), arcs(2)),
            ],
        )
        .unwrap();
        let tie = Cell::new(
            "TIEHI",
            0.5,
            vec![],
            vec![OutputPin::new("Y", TruthTable::one(0), vec![])],
        )
        .unwrap();
        let lib = Library::build(vec![inv, ha, tie]).unwrap();
        let s = stats(&lib);
        assert_eq!(s.nb_cells, 3);
        assert_eq!(s.nb_outputs, 4);
        assert_eq!(s.nb_multi_output, 1);
        assert_eq!(s.nb_classes, 4);
        assert_eq!(s.nb_size_groups, 3);
        assert_eq!(s.arity, vec![1, 1, 1]);
        assert_eq!(s.min_area, 0.5);
        assert_eq!(s.max_area, 6.0);
        assert_eq!(s.total_area, 7.5);
        assert!(format!("{}", s).contains("multi-output cells: 1"));
    }

    #[test]
    fn test_empty() {
        let s = stats(&Library::build(Vec::new()).unwrap());
        assert_eq!(s.nb_cells, 0);
        assert_eq!(s.min_area, 0.0);
        assert!(s.arity.is_empty());
    }
}
