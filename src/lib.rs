//! Standard-cell library core for logic synthesis
//!
//! This crate provides the library view used by technology mapping: cells with their pins, Boolean
//! functions, area and timing tables, indexed so that the cells implementing a function can be found quickly.
//!
//! # Usage
//!
//! Sclib is distributed as a library as well as a binary program, working on libraries described in JSON.
//!
//! ```bash
//! # Show available commands
//! sclib help
//! # Show statistics and cells of a library
//! sclib show mylib.json --cells
//! # Find the cells implementing a 3-input majority, and how to connect them
//! sclib match mylib.json e8 -n 3
//! # Evaluate the delay of a cell
//! sclib delay mylib.json NAND2_X1 --slope 0.05 --load 0.01
//! # Derive a slower corner
//! sclib scale mylib.json -o slow.json --delay 1.3 --slope 1.2
//! # Count the NPN classes of 4-input functions
//! sclib npn 4
//! ```
//!
//! # Development
//!
//! ## Datastructures
//!
//! A [`Library`] owns its [`Cell`]s, referenced by [`CellId`] handles. Each output of a cell has a function,
//! given as a [`TruthTable`](npn::TruthTable) over the cell inputs, and a timing arc for each input it
//! depends on. Arcs hold delay and output slope [`NumericTable`]s, interpolated linearly.
//!
//! When the library is built, every output function is classified up to NPN equivalence: permutation
//! and complementation of the inputs, complementation of the output. Finding the cells for a function
//! then only requires classifying the function, and composing the transforms to obtain the wiring.
//! Functions with up to 6 inputs are classified exactly; larger functions use a signature, and the
//! candidates are verified before being returned.
//!
//! For example, here is a library with a single Nand gate, used to implement an Or gate:
//! ```
//! # use sclib::{Cell, InputPin, Library, NumericTable, OutputPin, TimingArc};
//! use sclib::npn::TruthTable;
//!
//! let arcs = (0..2)
//!     .map(|i| TimingArc::new(i, NumericTable::constant(0.02), NumericTable::constant(0.01)))
//!     .collect();
//! let nand = Cell::new(
//!     "NAND2",
//!     1.0,
//!     vec![InputPin::new("A", 0.001), InputPin::new("B", 0.001)],
//!     vec![OutputPin::new("Y", TruthTable::parse(2, "0111").unwrap(), arcs)],
//! )
//! .unwrap();
//! let lib = Library::build(vec![nand]).unwrap();
//! let or = TruthTable::parse(2, "1110").unwrap();
//! let m = &lib.matches(&or)[0];
//! assert!(m.needs_input_inverters() && !m.needs_output_inverter());
//! ```
//!
//! Libraries are immutable once built and can be shared between threads. Scaled versions for other
//! operating corners share the function index of their base library.

#![warn(missing_docs)]

pub mod error;
pub mod io;
pub mod library;
pub mod mapping;
pub mod npn;
pub mod timing;

pub use error::{LibraryError, QueryError};
pub use library::{
    stats, Cell, CellId, InputPin, Library, LibraryOptions, Match, NumericTable, OutputPin,
    Rewiring, ScaleFactors, TimingArc,
};
