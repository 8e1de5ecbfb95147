//! Representation and indexing of standard-cell libraries

mod cell;
#[allow(clippy::module_inception)]
mod library;
mod scale;
pub mod stats;
mod table;
mod wire_load;

pub use cell::{Cell, InputPin, OutputPin, PinDirection, TimingArc};
pub use library::{CellId, Library, LibraryOptions, Match, Rewiring};
pub use scale::ScaleFactors;
pub use table::{Axis, NumericTable, TableError, Variable};
pub use wire_load::WireLoad;
