use std::fmt;

use fxhash::FxHashSet;

use crate::error::LibraryError;
use crate::library::table::NumericTable;
use crate::npn::TruthTable;

/// Direction of a pin
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
}

/// Input pin of a cell
#[derive(Debug, Clone, PartialEq)]
pub struct InputPin {
    name: String,
    capacitance: f64,
}

impl InputPin {
    /// Create an input pin with its input capacitance
    pub fn new(name: &str, capacitance: f64) -> InputPin {
        InputPin {
            name: name.to_string(),
            capacitance,
        }
    }

    /// Name of the pin
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacitance seen by the net driving the pin
    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }
}

/// Timing arc from an input to an output: delay and output slope, indexed by input slope and output load
#[derive(Debug, Clone, PartialEq)]
pub struct TimingArc {
    pub(crate) input: usize,
    pub(crate) delay: NumericTable,
    pub(crate) slope: NumericTable,
}

impl TimingArc {
    /// Create an arc from the input at the given index
    pub fn new(input: usize, delay: NumericTable, slope: NumericTable) -> TimingArc {
        TimingArc {
            input,
            delay,
            slope,
        }
    }

    /// Index of the input pin
    pub fn input(&self) -> usize {
        self.input
    }

    /// Delay table
    pub fn delay(&self) -> &NumericTable {
        &self.delay
    }

    /// Output slope table
    pub fn slope(&self) -> &NumericTable {
        &self.slope
    }
}

/// Output pin of a cell, with its function and timing arcs
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPin {
    name: String,
    function: TruthTable,
    pub(crate) arcs: Vec<TimingArc>,
    max_capacitance: Option<f64>,
}

impl OutputPin {
    /// Create an output pin; the function is expressed over the inputs of the cell, in order
    pub fn new(name: &str, function: TruthTable, arcs: Vec<TimingArc>) -> OutputPin {
        OutputPin {
            name: name.to_string(),
            function,
            arcs,
            max_capacitance: None,
        }
    }

    /// Set the maximum load the output may drive
    pub fn with_max_capacitance(mut self, max_capacitance: f64) -> OutputPin {
        self.max_capacitance = Some(max_capacitance);
        self
    }

    /// Name of the pin
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Function of the output
    pub fn function(&self) -> &TruthTable {
        &self.function
    }

    /// Timing arcs, one per input the function depends on
    pub fn arcs(&self) -> &[TimingArc] {
        &self.arcs
    }

    /// Timing arc from the given input, if any
    pub fn arc(&self, input: usize) -> Option<&TimingArc> {
        self.arcs.iter().find(|a| a.input == input)
    }

    /// Maximum load the output may drive
    pub fn max_capacitance(&self) -> Option<f64> {
        self.max_capacitance
    }
}

/// A library cell: pins, functions, area and timing
///
/// Cells are immutable once built. The number of inputs is fixed, and each output function is
/// expressed over all the inputs of the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    name: String,
    pub(crate) area: f64,
    inputs: Vec<InputPin>,
    pub(crate) outputs: Vec<OutputPin>,
    drive_strength: Option<u32>,
    footprint: Option<String>,
}

impl Cell {
    /// Create a cell, checking its consistency
    ///
    /// Each output function must have one variable per input, and exactly one timing arc per input
    /// it depends on.
    pub fn new(
        name: &str,
        area: f64,
        inputs: Vec<InputPin>,
        outputs: Vec<OutputPin>,
    ) -> Result<Cell, LibraryError> {
        let cell = Cell {
            name: name.to_string(),
            area,
            inputs,
            outputs,
            drive_strength: None,
            footprint: None,
        };
        cell.check()?;
        Ok(cell)
    }

    /// Set the drive strength
    pub fn with_drive_strength(mut self, drive_strength: u32) -> Cell {
        self.drive_strength = Some(drive_strength);
        self
    }

    /// Set the footprint, shared by cells that can replace each other
    pub fn with_footprint(mut self, footprint: &str) -> Cell {
        self.footprint = Some(footprint.to_string());
        self
    }

    /// Check the cell invariants
    fn check(&self) -> Result<(), LibraryError> {
        let err = |reason: String| Err(LibraryError::invalid_cell(&self.name, reason));
        if !self.area.is_finite() || self.area < 0.0 {
            return err(format!("area {} is not a non-negative number", self.area));
        }
        if self.outputs.is_empty() {
            return err("cell has no output".to_string());
        }
        let mut names = FxHashSet::default();
        for name in self.input_names().chain(self.output_names()) {
            if !names.insert(name) {
                return err(format!("pin name {} is used more than once", name));
            }
        }
        for pin in &self.inputs {
            if !pin.capacitance.is_finite() || pin.capacitance < 0.0 {
                return err(format!(
                    "capacitance {} of pin {} is not a non-negative number",
                    pin.capacitance, pin.name
                ));
            }
        }
        for o in &self.outputs {
            if o.function.num_vars() != self.inputs.len() {
                return err(format!(
                    "function of output {} has {} inputs, but the cell has {}",
                    o.name,
                    o.function.num_vars(),
                    self.inputs.len()
                ));
            }
            let mut seen = vec![false; self.inputs.len()];
            for arc in &o.arcs {
                if arc.input >= self.inputs.len() {
                    return err(format!(
                        "timing arc of output {} references input {}, but the cell has {} inputs",
                        o.name,
                        arc.input,
                        self.inputs.len()
                    ));
                }
                let input = &self.inputs[arc.input].name;
                if seen[arc.input] {
                    return err(format!("duplicate timing arc {} -> {}", input, o.name));
                }
                seen[arc.input] = true;
                if !o.function.depends_on(arc.input) {
                    return err(format!(
                        "timing arc {} -> {} on an input the function does not depend on",
                        input, o.name
                    ));
                }
            }
            if let Some(v) = o.function.support().into_iter().find(|v| !seen[*v]) {
                return err(format!(
                    "output {} depends on input {} but has no timing arc from it",
                    o.name, self.inputs[v].name
                ));
            }
            if let Some(c) = o.max_capacitance {
                if !c.is_finite() || c < 0.0 {
                    return err(format!(
                        "maximum capacitance {} of output {} is not a non-negative number",
                        c, o.name
                    ));
                }
            }
        }
        Ok(())
    }

    /// Name of the cell
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Area of the cell
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Drive strength, if given
    pub fn drive_strength(&self) -> Option<u32> {
        self.drive_strength
    }

    /// Footprint, if given
    pub fn footprint(&self) -> Option<&str> {
        self.footprint.as_deref()
    }

    /// Number of inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Input pins, in order
    pub fn inputs(&self) -> &[InputPin] {
        &self.inputs
    }

    /// Output pins, in order
    pub fn outputs(&self) -> &[OutputPin] {
        &self.outputs
    }

    /// Get the input at index i
    pub fn input(&self, i: usize) -> &InputPin {
        &self.inputs[i]
    }

    /// Get the output at index i
    pub fn output(&self, i: usize) -> &OutputPin {
        &self.outputs[i]
    }

    /// Names of the inputs, in order
    pub fn input_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inputs.iter().map(|p| p.name())
    }

    /// Names of the outputs, in order
    pub fn output_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.outputs.iter().map(|p| p.name())
    }

    /// Index of the input with this name
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|p| p.name == name)
    }

    /// Index of the output with this name
    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|p| p.name == name)
    }

    /// Direction and index of the pin with this name
    pub fn pin(&self, name: &str) -> Option<(PinDirection, usize)> {
        if let Some(i) = self.input_index(name) {
            Some((PinDirection::Input, i))
        } else {
            self.output_index(name).map(|i| (PinDirection::Output, i))
        }
    }

    /// Capacitance of the input at index i
    pub fn input_capacitance(&self, i: usize) -> f64 {
        self.inputs[i].capacitance
    }

    /// Returns whether there is a timing arc between these pins
    pub fn has_arc(&self, output: usize, input: usize) -> bool {
        self.outputs
            .get(output)
            .map_or(false, |o| o.arc(input).is_some())
    }

    /// Functions of the outputs, in order
    pub fn functions(&self) -> impl Iterator<Item = &TruthTable> + '_ {
        self.outputs.iter().map(|o| o.function())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs = self.input_names().collect::<Vec<_>>().join(", ");
        write!(f, "{}({})", self.name, inputs)?;
        for o in &self.outputs {
            write!(f, " {}=0x{}", o.name, o.function)?;
        }
        write!(f, " area={}", self.area)
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, InputPin, OutputPin, PinDirection, TimingArc};
    use crate::error::LibraryError;
    use crate::library::NumericTable;
    use crate::npn::TruthTable;

    fn arc(input: usize) -> TimingArc {
        TimingArc::new(input, NumericTable::constant(1.0), NumericTable::constant(0.5))
    }

    fn nand2(arcs: Vec<TimingArc>) -> Result<Cell, LibraryError> {
        let f = TruthTable::parse(2, "0111").unwrap();
        Cell::new(
            "NAND2",
            2.0,
            vec![InputPin::new("A", 0.01), InputPin::new("B", 0.012)],
            vec![OutputPin::new("Y", f, arcs)],
        )
    }

    #[test]
    fn test_accessors() {
        let c = nand2(vec![arc(0), arc(1)]).unwrap().with_drive_strength(2);
        assert_eq!(c.name(), "NAND2");
        assert_eq!(c.nb_inputs(), 2);
        assert_eq!(c.nb_outputs(), 1);
        assert_eq!(c.input_index("B"), Some(1));
        assert_eq!(c.pin("Y"), Some((PinDirection::Output, 0)));
        assert_eq!(c.pin("Z"), None);
        assert_eq!(c.input_capacitance(1), 0.012);
        assert!(c.has_arc(0, 1));
        assert!(!c.has_arc(1, 1));
        assert_eq!(c.drive_strength(), Some(2));
        assert_eq!(c.to_string(), "NAND2(A, B) Y=0x7 area=2");
    }

    #[test]
    fn test_invalid_arcs() {
        assert!(matches!(nand2(vec![arc(0)]), Err(LibraryError::InvalidCell { .. })));
        assert!(nand2(vec![arc(0), arc(1), arc(1)]).is_err());
        assert!(nand2(vec![arc(0), arc(2)]).is_err());
    }

    #[test]
    fn test_invalid_function() {
        let f = TruthTable::parse(3, "80").unwrap();
        let c = Cell::new(
            "AND",
            1.0,
            vec![InputPin::new("A", 0.0), InputPin::new("B", 0.0)],
            vec![OutputPin::new("Y", f, vec![arc(0), arc(1)])],
        );
        assert!(c.is_err());
        let buf_with_unused = Cell::new(
            "BUF",
            1.0,
            vec![InputPin::new("A", 0.0), InputPin::new("B", 0.0)],
            vec![OutputPin::new("Y", TruthTable::nth_var(2, 0), vec![arc(0), arc(1)])],
        );
        assert!(buf_with_unused.is_err());
    }

    #[test]
    fn test_invalid_values() {
        let f = TruthTable::parse(2, "0111").unwrap();
        let inputs = vec![InputPin::new("A", 0.0), InputPin::new("A", 0.0)];
        let outputs = vec![OutputPin::new("Y", f.clone(), vec![arc(0), arc(1)])];
        let c = Cell::new("X", 1.0, inputs, outputs);
        assert!(c.is_err());
        let inputs = vec![InputPin::new("A", 0.0), InputPin::new("B", 0.0)];
        let c = Cell::new("X", -1.0, inputs, vec![OutputPin::new("Y", f, vec![arc(0), arc(1)])]);
        assert!(c.is_err());
    }

    #[test]
    fn test_tie_cell() {
        let c = Cell::new(
            "TIEHI",
            0.5,
            vec![],
            vec![OutputPin::new("Y", TruthTable::one(0), vec![])],
        )
        .unwrap();
        assert_eq!(c.output(0).arcs().len(), 0);
    }
}
