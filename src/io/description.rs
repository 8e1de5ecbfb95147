//! Serializable description of a library

use serde::{Deserialize, Serialize};

use crate::error::LibraryError;
use crate::library::{
    Axis, Cell, InputPin, Library, LibraryOptions, NumericTable, OutputPin, TableError, TimingArc,
    Variable, WireLoad,
};
use crate::npn::TruthTable;

/// Description of a library, as read from a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDescription {
    /// Name of the library
    pub name: String,
    /// Cells of the library
    pub cells: Vec<CellDescription>,
    /// Wire load models
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wire_loads: Vec<WireLoadDescription>,
    /// Name of the wire load model used by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_wire_load: Option<String>,
}

/// Description of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDescription {
    /// Name of the cell
    pub name: String,
    /// Area of the cell
    pub area: f64,
    /// Drive strength, shared by the variants of a cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_strength: Option<u32>,
    /// Footprint, shared by cells with the same layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    /// Input pins, in order
    pub inputs: Vec<InputDescription>,
    /// Output pins, in order
    pub outputs: Vec<OutputDescription>,
}

/// Description of an input pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescription {
    /// Name of the pin
    pub name: String,
    /// Input capacitance
    pub capacitance: f64,
}

/// Description of an output pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescription {
    /// Name of the pin
    pub name: String,
    /// Truth table over the cell inputs, in hexadecimal or binary
    pub function: String,
    /// Maximum capacitance the output can drive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacitance: Option<f64>,
    /// Timing arcs from the inputs
    #[serde(default)]
    pub arcs: Vec<ArcDescription>,
}

/// Description of a timing arc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDescription {
    /// Name of the input pin
    pub input: String,
    /// Delay table
    pub delay: TableDescription,
    /// Output slope table
    pub slope: TableDescription,
}

/// Description of a lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescription {
    /// Variable of each axis
    pub variables: Vec<Variable>,
    /// Breakpoints of the first axis
    pub index_1: Vec<f64>,
    /// Breakpoints of the second axis, for two-dimensional tables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_2: Vec<f64>,
    /// Values, row-major
    pub values: Vec<f64>,
}

/// Description of a wire load model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLoadDescription {
    /// Name of the model
    pub name: String,
    /// Fanout breakpoints
    pub fanout: Vec<f64>,
    /// Capacitance at each breakpoint
    pub capacitance: Vec<f64>,
}

impl TableDescription {
    /// Build the table
    pub fn to_table(&self) -> Result<NumericTable, TableError> {
        let indices = if self.index_2.is_empty() {
            vec![self.index_1.clone()]
        } else {
            vec![self.index_1.clone(), self.index_2.clone()]
        };
        if indices.len() != self.variables.len() {
            return Err(TableError::BadDimension(self.variables.len()));
        }
        let axes = self
            .variables
            .iter()
            .zip(indices)
            .map(|(v, b)| Axis::new(*v, b))
            .collect::<Result<Vec<_>, _>>()?;
        NumericTable::new(axes, self.values.clone())
    }

    /// Describe a table
    pub fn from_table(table: &NumericTable) -> TableDescription {
        let axes = table.axes();
        TableDescription {
            variables: axes.iter().map(|a| a.variable()).collect(),
            index_1: axes[0].breakpoints().to_vec(),
            index_2: axes.get(1).map(|a| a.breakpoints().to_vec()).unwrap_or_default(),
            values: table.values().to_vec(),
        }
    }
}

impl CellDescription {
    /// Build the cell, resolving pin names and parsing the functions
    pub fn to_cell(&self) -> Result<Cell, LibraryError> {
        let inputs = self
            .inputs
            .iter()
            .map(|i| InputPin::new(&i.name, i.capacitance))
            .collect();
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for o in &self.outputs {
            let function = TruthTable::parse(self.inputs.len(), &o.function).ok_or_else(|| {
                LibraryError::invalid_cell(
                    &self.name,
                    format!(
                        "cannot parse function '{}' of output {} with {} inputs",
                        o.function,
                        o.name,
                        self.inputs.len()
                    ),
                )
            })?;
            let mut arcs = Vec::with_capacity(o.arcs.len());
            for a in &o.arcs {
                let input = self
                    .inputs
                    .iter()
                    .position(|i| i.name == a.input)
                    .ok_or_else(|| {
                        let reason = format!(
                            "timing arc of output {} from unknown input {}",
                            o.name, a.input
                        );
                        LibraryError::invalid_cell(&self.name, reason)
                    })?;
                let malformed = |source| LibraryError::MalformedTable {
                    cell: self.name.clone(),
                    output: o.name.clone(),
                    input: a.input.clone(),
                    source,
                };
                let delay = a.delay.to_table().map_err(malformed)?;
                let slope = a.slope.to_table().map_err(malformed)?;
                arcs.push(TimingArc::new(input, delay, slope));
            }
            let mut pin = OutputPin::new(&o.name, function, arcs);
            if let Some(c) = o.max_capacitance {
                pin = pin.with_max_capacitance(c);
            }
            outputs.push(pin);
        }
        let mut cell = Cell::new(&self.name, self.area, inputs, outputs)?;
        if let Some(d) = self.drive_strength {
            cell = cell.with_drive_strength(d);
        }
        if let Some(f) = &self.footprint {
            cell = cell.with_footprint(f);
        }
        Ok(cell)
    }

    /// Describe a cell
    pub fn from_cell(cell: &Cell) -> CellDescription {
        CellDescription {
            name: cell.name().to_string(),
            area: cell.area(),
            drive_strength: cell.drive_strength(),
            footprint: cell.footprint().map(|f| f.to_string()),
            inputs: cell
                .inputs()
                .iter()
                .map(|i| InputDescription {
                    name: i.name().to_string(),
                    capacitance: i.capacitance(),
                })
                .collect(),
            outputs: cell
                .outputs()
                .iter()
                .map(|o| OutputDescription {
                    name: o.name().to_string(),
                    function: o.function().to_hex_string(),
                    max_capacitance: o.max_capacitance(),
                    arcs: o
                        .arcs()
                        .iter()
                        .map(|a| ArcDescription {
                            input: cell.input(a.input()).name().to_string(),
                            delay: TableDescription::from_table(a.delay()),
                            slope: TableDescription::from_table(a.slope()),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Library {
    /// Build a library from its description
    pub fn from_description(
        desc: &LibraryDescription,
        options: &LibraryOptions,
    ) -> Result<Library, LibraryError> {
        let cells = desc
            .cells
            .iter()
            .map(|c| c.to_cell())
            .collect::<Result<Vec<_>, _>>()?;
        let wire_loads = desc
            .wire_loads
            .iter()
            .map(|w| WireLoad::new(&w.name, w.fanout.clone(), w.capacitance.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Library::build_with(
            &desc.name,
            cells,
            wire_loads,
            desc.default_wire_load.as_deref(),
            options,
        )
    }

    /// Describe the library, for example to save it after scaling
    pub fn to_description(&self) -> LibraryDescription {
        LibraryDescription {
            name: self.name().to_string(),
            cells: self.cells().iter().map(CellDescription::from_cell).collect(),
            wire_loads: self
                .wire_loads()
                .iter()
                .map(|w| WireLoadDescription {
                    name: w.name().to_string(),
                    fanout: w.table().axes()[0].breakpoints().to_vec(),
                    capacitance: w.table().values().to_vec(),
                })
                .collect(),
            default_wire_load: self.default_wire_load().map(|w| w.name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LibraryDescription, TableDescription};
    use crate::error::LibraryError;
    use crate::library::{Library, LibraryOptions, TableError, Variable};
    use crate::npn::TruthTable;

    const NAND_LIB: &str = r#"{
        "name": "tiny",
        "cells": [
            {
                "name": "NAND2_X1",
                "area": 1.5,
                "drive_strength": 1,
                "inputs": [
                    { "name": "A", "capacitance": 0.0015 },
                    { "name": "B", "capacitance": 0.0016 }
                ],
                "outputs": [
                    {
                        "name": "Y",
                        "function": "0111",
                        "max_capacitance": 0.2,
                        "arcs": [
                            {
                                "input": "A",
                                "delay": {
                                    "variables": ["input_slope", "output_load"],
                                    "index_1": [0.01, 0.1],
                                    "index_2": [0.001, 0.01],
                                    "values": [0.02, 0.05, 0.03, 0.07]
                                },
                                "slope": {
                                    "variables": ["output_load"],
                                    "index_1": [0.001, 0.01],
                                    "values": [0.01, 0.04]
                                }
                            },
                            {
                                "input": "B",
                                "delay": {
                                    "variables": ["input_slope", "output_load"],
                                    "index_1": [0.01, 0.1],
                                    "index_2": [0.001, 0.01],
                                    "values": [0.025, 0.055, 0.035, 0.075]
                                },
                                "slope": {
                                    "variables": ["output_load"],
                                    "index_1": [0.001, 0.01],
                                    "values": [0.012, 0.045]
                                }
                            }
                        ]
                    }
                ]
            },
            {
                "name": "TIEHI",
                "area": 0.5,
                "inputs": [],
                "outputs": [{ "name": "Y", "function": "1" }]
            }
        ],
        "wire_loads": [
            { "name": "small", "fanout": [1, 2, 4], "capacitance": [0.001, 0.002, 0.004] }
        ],
        "default_wire_load": "small"
    }"#;

    fn parse(s: &str) -> LibraryDescription {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn test_build() {
        let lib = Library::from_description(&parse(NAND_LIB), &LibraryOptions::default()).unwrap();
        assert_eq!(lib.name(), "tiny");
        assert_eq!(lib.nb_cells(), 2);
        let nand = lib.cell_by_name("NAND2_X1").unwrap();
        assert_eq!(nand.drive_strength(), Some(1));
        assert_eq!(nand.output(0).max_capacitance(), Some(0.2));
        assert_eq!(*nand.output(0).function(), TruthTable::parse(2, "0111").unwrap());
        assert_eq!(nand.output(0).arc(1).unwrap().delay().dimension(), 2);
        assert_eq!(lib.cell_by_name("TIEHI").unwrap().output(0).arcs().len(), 0);
        assert_eq!(lib.default_wire_load().unwrap().capacitance(2), 0.002);
    }

    #[test]
    fn test_round_trip() {
        let lib = Library::from_description(&parse(NAND_LIB), &LibraryOptions::default()).unwrap();
        let desc = lib.to_description();
        let text = serde_json::to_string_pretty(&desc).unwrap();
        let again: LibraryDescription = serde_json::from_str(&text).unwrap();
        assert_eq!(again, desc);
        let lib2 = Library::from_description(&again, &LibraryOptions::default()).unwrap();
        assert_eq!(lib2.cells(), lib.cells());
        assert_eq!(lib2.wire_loads(), lib.wire_loads());
    }

    #[test]
    fn test_errors() {
        let mut desc = parse(NAND_LIB);
        desc.cells[0].outputs[0].arcs[1].input = "C".to_string();
        let res = Library::from_description(&desc, &LibraryOptions::default());
        assert!(matches!(res, Err(LibraryError::InvalidCell { cell, .. }) if cell == "NAND2_X1"));

        let mut desc = parse(NAND_LIB);
        desc.cells[0].outputs[0].arcs[1].delay.values.pop();
        let res = Library::from_description(&desc, &LibraryOptions::default());
        match res {
            Err(LibraryError::MalformedTable {
                cell,
                output,
                input,
                source,
            }) => {
                assert_eq!(
                    (cell.as_str(), output.as_str(), input.as_str()),
                    ("NAND2_X1", "Y", "B")
                );
                assert_eq!(source, TableError::ShapeMismatch { expected: 4, found: 3 });
            }
            _ => panic!("Expected a malformed table"),
        }

        let mut desc = parse(NAND_LIB);
        desc.cells[0].outputs[0].function = "01110".to_string();
        let res = Library::from_description(&desc, &LibraryOptions::default());
        assert!(matches!(res, Err(LibraryError::InvalidCell { .. })));

        let mut desc = parse(NAND_LIB);
        desc.cells[1].name = "NAND2_X1".to_string();
        let res = Library::from_description(&desc, &LibraryOptions::default());
        assert!(matches!(res, Err(LibraryError::DuplicateCellName(_))));
    }

    #[test]
    fn test_table_dimensions() {
        let t = TableDescription {
            variables: vec![Variable::InputSlope, Variable::OutputLoad],
            index_1: vec![0.0, 1.0],
            index_2: vec![],
            values: vec![0.0, 1.0],
        };
        assert_eq!(t.to_table(), Err(TableError::BadDimension(2)));
    }
}
