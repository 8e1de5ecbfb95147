//! Delay and slope evaluation on library cells
//!
//! Each timing arc gives the delay from an input to an output and the output slope, as a function
//! of the input slope and of the output load. Evaluation is stateless: callers provide the
//! operating point and combine the results as their timing model requires.

use crate::error::QueryError;
use crate::library::{Cell, CellId, Library, TimingArc, Variable, WireLoad};

/// Delay and output slope of a timing arc at an operating point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcTiming {
    /// Propagation delay from the input to the output
    pub delay: f64,
    /// Transition time at the output
    pub slope: f64,
}

/// Arrival time and slope of a signal at a cell input
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputTiming {
    /// Arrival time
    pub arrival: f64,
    /// Transition time
    pub slope: f64,
}

/// Arrival time and slope at a cell output
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct OutputTiming {
    /// Arrival time
    pub arrival: f64,
    /// Transition time
    pub slope: f64,
}

/// How to combine the timing of several arcs ending at the same output
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArcCombination {
    /// Latest arrival and largest slope, for worst-case analysis
    #[default]
    Max,
    /// Average arrival and slope over all arcs
    Mean,
}

impl TimingArc {
    /// Evaluate the arc for an input slope and an output load
    pub fn evaluate(&self, input_slope: f64, output_load: f64) -> ArcTiming {
        let coord = |v: Variable| match v {
            Variable::InputSlope => input_slope,
            Variable::OutputLoad => output_load,
            // Arc tables are not indexed by fanout
            Variable::Fanout => 0.0,
        };
        ArcTiming {
            delay: self.delay().evaluate_with(coord),
            slope: self.slope().evaluate_with(coord),
        }
    }
}

impl Library {
    fn lookup(&self, cell: CellId) -> Result<&Cell, QueryError> {
        self.get_cell(cell)
            .ok_or(QueryError::UnknownCell(cell.index()))
    }

    /// Delay and output slope from an input to an output of a cell
    ///
    /// Returns an error if the output does not depend on the input.
    pub fn delay(
        &self,
        cell: CellId,
        output: usize,
        input: usize,
        input_slope: f64,
        output_load: f64,
    ) -> Result<ArcTiming, QueryError> {
        let c = self.lookup(cell)?;
        check_output(c, output)?;
        if input >= c.nb_inputs() {
            return Err(no_such_pin(c, input));
        }
        let o = c.output(output);
        match o.arc(input) {
            Some(arc) => Ok(arc.evaluate(input_slope, output_load)),
            None => Err(QueryError::NoSuchArc {
                cell: c.name().to_string(),
                output: o.name().to_string(),
                input: c.input(input).name().to_string(),
            }),
        }
    }

    /// Arrival time and slope at an output, given the timing at each input of the cell
    ///
    /// Only the inputs the output depends on contribute. A constant output is ready at time 0.
    pub fn output_timing(
        &self,
        cell: CellId,
        output: usize,
        inputs: &[InputTiming],
        output_load: f64,
        combine: ArcCombination,
    ) -> Result<OutputTiming, QueryError> {
        let c = self.lookup(cell)?;
        check_output(c, output)?;
        if inputs.len() != c.nb_inputs() {
            return Err(QueryError::InputCountMismatch {
                expected: c.nb_inputs(),
                found: inputs.len(),
            });
        }
        let arcs = c.output(output).arcs();
        let mut ret = match combine {
            ArcCombination::Max => OutputTiming {
                arrival: f64::NEG_INFINITY,
                slope: f64::NEG_INFINITY,
            },
            ArcCombination::Mean => OutputTiming::default(),
        };
        for arc in arcs {
            let t = inputs[arc.input()];
            let a = arc.evaluate(t.slope, output_load);
            let arrival = t.arrival + a.delay;
            match combine {
                ArcCombination::Max => {
                    ret.arrival = ret.arrival.max(arrival);
                    ret.slope = ret.slope.max(a.slope);
                }
                ArcCombination::Mean => {
                    ret.arrival += arrival;
                    ret.slope += a.slope;
                }
            }
        }
        if arcs.is_empty() {
            return Ok(OutputTiming::default());
        }
        if combine == ArcCombination::Mean {
            ret.arrival /= arcs.len() as f64;
            ret.slope /= arcs.len() as f64;
        }
        Ok(ret)
    }

    /// Capacitive load of a net driving the given cell inputs, with an optional wire load model
    pub fn net_load(
        &self,
        wire_load: Option<&WireLoad>,
        sinks: &[(CellId, usize)],
    ) -> Result<f64, QueryError> {
        let mut load = 0.0;
        for &(cell, input) in sinks {
            let c = self.lookup(cell)?;
            if input >= c.nb_inputs() {
                return Err(no_such_pin(c, input));
            }
            load += c.input_capacitance(input);
        }
        if let Some(w) = wire_load {
            load += w.capacitance(sinks.len());
        }
        Ok(load)
    }
}

fn check_output(c: &Cell, output: usize) -> Result<(), QueryError> {
    if output >= c.nb_outputs() {
        Err(QueryError::NoSuchPin {
            cell: c.name().to_string(),
            pin: format!("output #{}", output),
        })
    } else {
        Ok(())
    }
}

fn no_such_pin(c: &Cell, input: usize) -> QueryError {
    QueryError::NoSuchPin {
        cell: c.name().to_string(),
        pin: format!("input #{}", input),
    }
}

#[cfg(test)]
mod tests {
    use super::{ArcCombination, InputTiming};
    use crate::error::QueryError;
    use crate::library::{
        Axis, Cell, CellId, InputPin, Library, NumericTable, OutputPin, TimingArc, Variable,
        WireLoad,
    };
    use crate::npn::TruthTable;

    fn delay_table(offset: f64) -> NumericTable {
        let slope = Axis::new(Variable::InputSlope, vec![0.0, 1.0]).unwrap();
        let load = Axis::new(Variable::OutputLoad, vec![0.0, 1.0]).unwrap();
        let values = vec![offset, offset + 1.0, offset + 0.5, offset + 1.5];
        NumericTable::new_2d(slope, load, values).unwrap()
    }

    /// Nand cell with an unused third input, and a tie cell
    fn library() -> Library {
        // Y = !(A & B)
        let f = TruthTable::from_fn(3, |m| m & 3 != 3);
        let arcs = vec![
            TimingArc::new(0, delay_table(0.1), NumericTable::constant(0.2)),
            TimingArc::new(1, delay_table(0.3), NumericTable::constant(0.4)),
        ];
        let cell = Cell::new(
            "NAND2B",
            2.0,
            vec![
                InputPin::new("A", 0.01),
                InputPin::new("B", 0.02),
                InputPin::new("C", 0.04),
            ],
            vec![OutputPin::new("Y", f, arcs)],
        )
        .unwrap();
        let tie = Cell::new(
            "TIELO",
            0.5,
            vec![],
            vec![OutputPin::new("Y", TruthTable::zero(0), vec![])],
        )
        .unwrap();
        Library::build(vec![cell, tie]).unwrap()
    }

    #[test]
    fn test_delay() {
        let lib = library();
        let id = lib.cell_id("NAND2B").unwrap();
        let t = lib.delay(id, 0, 0, 0.0, 0.0).unwrap();
        assert_eq!(t.delay, 0.1);
        assert_eq!(t.slope, 0.2);
        let t = lib.delay(id, 0, 1, 1.0, 1.0).unwrap();
        assert!((t.delay - 1.8).abs() < 1e-12);
        let t = lib.delay(id, 0, 0, 0.5, 0.5).unwrap();
        assert!((t.delay - 0.85).abs() < 1e-12);
        // Extrapolation
        let t = lib.delay(id, 0, 0, 0.0, 2.0).unwrap();
        assert!((t.delay - 2.1).abs() < 1e-12);
    }

    #[test]
    fn test_delay_errors() {
        let lib = library();
        let id = lib.cell_id("NAND2B").unwrap();
        let res = lib.delay(id, 0, 2, 0.1, 0.1);
        assert_eq!(
            res,
            Err(QueryError::NoSuchArc {
                cell: "NAND2B".to_string(),
                output: "Y".to_string(),
                input: "C".to_string(),
            })
        );
        assert!(matches!(lib.delay(id, 0, 3, 0.1, 0.1), Err(QueryError::NoSuchPin { .. })));
        assert!(matches!(lib.delay(id, 1, 0, 0.1, 0.1), Err(QueryError::NoSuchPin { .. })));
        assert_eq!(lib.delay(CellId(7), 0, 0, 0.1, 0.1), Err(QueryError::UnknownCell(7)));
    }

    #[test]
    fn test_output_timing() {
        let lib = library();
        let id = lib.cell_id("NAND2B").unwrap();
        let inputs = [
            InputTiming {
                arrival: 1.0,
                slope: 0.0,
            },
            InputTiming {
                arrival: 0.5,
                slope: 0.0,
            },
            InputTiming {
                arrival: 100.0,
                slope: 0.0,
            },
        ];
        let t = lib.output_timing(id, 0, &inputs, 0.0, ArcCombination::Max).unwrap();
        assert!((t.arrival - 1.1).abs() < 1e-12);
        assert_eq!(t.slope, 0.4);
        let t = lib.output_timing(id, 0, &inputs, 0.0, ArcCombination::Mean).unwrap();
        assert!((t.arrival - 0.95).abs() < 1e-12);
        assert!((t.slope - 0.3).abs() < 1e-12);
        let res = lib.output_timing(id, 0, &inputs[..2], 0.0, ArcCombination::Max);
        assert_eq!(
            res,
            Err(QueryError::InputCountMismatch {
                expected: 3,
                found: 2
            })
        );
        let tie = lib.cell_id("TIELO").unwrap();
        let t = lib.output_timing(tie, 0, &[], 0.3, ArcCombination::Max).unwrap();
        assert_eq!(t.arrival, 0.0);
    }

    #[test]
    fn test_net_load() {
        let lib = library();
        let id = lib.cell_id("NAND2B").unwrap();
        let w = WireLoad::new("wl", vec![1.0, 2.0], vec![0.1, 0.2]).unwrap();
        let load = lib.net_load(None, &[(id, 0), (id, 2)]).unwrap();
        assert!((load - 0.05).abs() < 1e-12);
        let load = lib.net_load(Some(&w), &[(id, 0), (id, 2)]).unwrap();
        assert!((load - 0.25).abs() < 1e-12);
        assert!(lib.net_load(None, &[(id, 3)]).is_err());
    }
}
