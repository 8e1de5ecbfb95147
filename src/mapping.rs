//! Queries used by technology mappers
//!
//! A mapper enumerates the functions of cuts in the subject graph, looks up the cells that
//! implement them, and evaluates their area and timing with the cut inputs wired onto the cell pins.
//!
//! ```
//! use sclib::mapping::MappingQuery;
//! use sclib::npn::TruthTable;
//! use sclib::{Cell, InputPin, Library, NumericTable, OutputPin, TimingArc};
//!
//! let arcs = (0..2)
//!     .map(|i| TimingArc::new(i, NumericTable::constant(0.1), NumericTable::constant(0.05)))
//!     .collect();
//! let nand = TruthTable::parse(2, "0111").unwrap();
//! let cell = Cell::new(
//!     "NAND2",
//!     1.0,
//!     vec![InputPin::new("A", 0.001), InputPin::new("B", 0.001)],
//!     vec![OutputPin::new("Y", nand, arcs)],
//! )
//! .unwrap();
//! let lib = Library::build(vec![cell]).unwrap();
//!
//! // An Or gate is a Nand with complemented inputs
//! let or = TruthTable::parse(2, "1110").unwrap();
//! let matches = lib.find_matches(&or);
//! assert_eq!(matches.len(), 1);
//! assert!(matches[0].needs_input_inverters());
//! assert_eq!(lib.match_area(&matches[0]), 1.0);
//! ```

use crate::error::QueryError;
use crate::library::{Library, Match};
use crate::npn::TruthTable;
use crate::timing::{ArcCombination, InputTiming, OutputTiming};

/// Cell lookup and evaluation for technology mapping
pub trait MappingQuery {
    /// Cells implementing the function, up to input permutation and complementation, by increasing area
    fn find_matches(&self, function: &TruthTable) -> Vec<Match<'_>>;

    /// Area of the cell used by the match
    fn match_area(&self, m: &Match<'_>) -> f64;

    /// Capacitance seen by the query input `i` on the cell used by the match
    fn match_input_load(&self, m: &Match<'_>, i: usize) -> Result<f64, QueryError>;

    /// Timing at the output of the match, given the timing of the query inputs in query order
    ///
    /// Inverters required by the match are not taken into account.
    fn match_timing(
        &self,
        m: &Match<'_>,
        inputs: &[InputTiming],
        output_load: f64,
        combine: ArcCombination,
    ) -> Result<OutputTiming, QueryError>;
}

impl MappingQuery for Library {
    fn find_matches(&self, function: &TruthTable) -> Vec<Match<'_>> {
        self.matches(function)
    }

    fn match_area(&self, m: &Match<'_>) -> f64 {
        m.cell.area()
    }

    fn match_input_load(&self, m: &Match<'_>, i: usize) -> Result<f64, QueryError> {
        if i >= m.transform.num_vars() {
            return Err(QueryError::NoSuchInput {
                input: i,
                nb_inputs: m.transform.num_vars(),
            });
        }
        Ok(m.cell.input_capacitance(m.transform.target(i)))
    }

    fn match_timing(
        &self,
        m: &Match<'_>,
        inputs: &[InputTiming],
        output_load: f64,
        combine: ArcCombination,
    ) -> Result<OutputTiming, QueryError> {
        if inputs.len() != m.transform.num_vars() {
            return Err(QueryError::InputCountMismatch {
                expected: m.transform.num_vars(),
                found: inputs.len(),
            });
        }
        let pin_inputs: Vec<InputTiming> = m
            .pin_binding()
            .into_iter()
            .map(|(i, _)| inputs[i])
            .collect();
        self.output_timing(m.id, m.output, &pin_inputs, output_load, combine)
    }
}

#[cfg(test)]
mod tests {
    use super::MappingQuery;
    use crate::error::QueryError;
    use crate::library::{Cell, InputPin, Library, NumericTable, OutputPin, Rewiring, TimingArc};
    use crate::npn::TruthTable;
    use crate::timing::{ArcCombination, InputTiming};

    fn cell(name: &str, area: f64, function: &str, delays: &[f64]) -> Cell {
        let n = delays.len();
        let inputs = (0..n)
            .map(|i| InputPin::new(&format!("A{}", i), 0.001 * (i + 1) as f64))
            .collect();
        let arcs = delays
            .iter()
            .enumerate()
            .map(|(i, d)| {
                TimingArc::new(i, NumericTable::constant(*d), NumericTable::constant(0.1))
            })
            .collect();
        let f = TruthTable::parse(n, function).unwrap();
        Cell::new(name, area, inputs, vec![OutputPin::new("Y", f, arcs)]).unwrap()
    }

    #[test]
    fn test_and_or_nor() {
        let lib = Library::build(vec![
            cell("AND2", 1.0, "1000", &[0.1, 0.1]),
            cell("OR2", 1.0, "1110", &[0.1, 0.1]),
        ])
        .unwrap();
        let and = TruthTable::parse(2, "1000").unwrap();
        let nor = TruthTable::parse(2, "0001").unwrap();

        let m = lib.matches_with(&and, Rewiring::PermutationOnly);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].cell.name(), "AND2");
        assert!(lib.matches_with(&nor, Rewiring::PermutationOnly).is_empty());

        // With inverters, both cells implement both functions
        for f in [&and, &nor] {
            let m = lib.find_matches(f);
            assert_eq!(m.len(), 2);
            for x in &m {
                assert_eq!(x.transform.apply(x.cell.output(x.output).function()), *f);
            }
        }
    }

    #[test]
    fn test_match_timing() {
        // A0 & !A1 & A2
        let lib = Library::build(vec![cell("ANDN3", 2.0, "00100000", &[0.2, 0.2, 0.2])]).unwrap();
        // y0 & y1 & !y2
        let query = TruthTable::from_fn(3, |m| m == 0b011);
        let m = lib.find_matches(&query);
        assert_eq!(m.len(), 1);
        let m = &m[0];
        assert_eq!(m.transform.apply(m.cell.output(0).function()), query);
        assert_eq!(lib.match_area(m), 2.0);
        let total: f64 = (0..3).map(|i| lib.match_input_load(m, i).unwrap()).sum();
        assert!((total - 0.006).abs() < 1e-12);
        assert_eq!(
            lib.match_input_load(m, 3),
            Err(QueryError::NoSuchInput {
                input: 3,
                nb_inputs: 3
            })
        );

        let inputs = [
            InputTiming {
                arrival: 0.0,
                slope: 0.0,
            },
            InputTiming {
                arrival: 0.5,
                slope: 0.0,
            },
            InputTiming {
                arrival: 1.0,
                slope: 0.0,
            },
        ];
        let t = lib.match_timing(m, &inputs, 0.0, ArcCombination::Max).unwrap();
        assert!((t.arrival - 1.2).abs() < 1e-12);
        let t = lib.match_timing(m, &inputs, 0.0, ArcCombination::Mean).unwrap();
        assert!((t.arrival - 0.7).abs() < 1e-12);
        let res = lib.match_timing(m, &inputs[..1], 0.0, ArcCombination::Max);
        assert!(matches!(res, Err(QueryError::InputCountMismatch { expected: 3, found: 1 })));
    }

    #[test]
    fn test_match_timing_follows_binding() {
        // (A0 & A1) | A2
        let lib = Library::build(vec![cell("AO21", 2.0, "11111000", &[0.1, 0.2, 0.4])]).unwrap();
        let query = TruthTable::from_fn(3, |m| (m & 1 != 0 && m & 2 != 0) || m & 4 == 0);
        let inputs: Vec<InputTiming> = (0..3)
            .map(|i| InputTiming {
                arrival: i as f64,
                slope: 0.0,
            })
            .collect();
        let delays = [0.1, 0.2, 0.4];
        let m = lib.find_matches(&query);
        assert_eq!(m.len(), 1);
        let expected = (0..3)
            .map(|i| inputs[i].arrival + delays[m[0].transform.target(i)])
            .fold(f64::NEG_INFINITY, f64::max);
        let t = lib.match_timing(&m[0], &inputs, 0.0, ArcCombination::Max).unwrap();
        assert_eq!(t.arrival, expected);
    }
}
