use std::fmt;
use std::sync::Arc;

use fxhash::FxHashMap;
use itertools::Itertools;

use crate::error::LibraryError;
use crate::library::cell::Cell;
use crate::library::wire_load::WireLoad;
use crate::npn::{
    find_permutation, find_transform, ClassKey, Classifier, NpnTransform, TruthTable,
    DEFAULT_EXACT_LIMIT, MAX_EXACT_LIMIT,
};

/// Handle to a cell in a library
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    /// Position of the cell in the library
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options for library construction
#[derive(Clone, Copy, Debug)]
pub struct LibraryOptions {
    /// Maximum number of inputs for exact NPN canonization; larger functions use a signature
    ///
    /// At most [`MAX_EXACT_LIMIT`](crate::npn::MAX_EXACT_LIMIT).
    pub exact_limit: usize,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        LibraryOptions {
            exact_limit: DEFAULT_EXACT_LIMIT,
        }
    }
}

/// Rewiring allowed when matching a function against the library cells
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rewiring {
    /// Input permutation, input and output complementation
    #[default]
    Npn,
    /// Input permutation only: the cell implements the function without any inverter
    PermutationOnly,
}

/// Cell output registered under an NPN class
#[derive(Debug, Clone)]
struct IndexEntry {
    cell: CellId,
    output: usize,
    transform: NpnTransform,
}

/// Part of a library that only depends on the cell functions, shared by scaled libraries
#[derive(Debug)]
struct LibraryIndex {
    names: FxHashMap<String, CellId>,
    classes: FxHashMap<ClassKey, Vec<IndexEntry>>,
    size_groups: Vec<Vec<CellId>>,
    size_group_of: Vec<usize>,
}

/// A cell matching a function
///
/// The transform maps the cell function to the query function (see [`NpnTransform`]):
/// query input `i` drives cell pin `transform.target(i)`, complemented if `transform.is_input_negated(i)`,
/// and the cell output must be complemented if `transform.is_output_negated()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    /// Matching cell
    pub cell: &'a Cell,
    /// Handle of the matching cell
    pub id: CellId,
    /// Index of the matching output
    pub output: usize,
    /// Transform from the cell output function to the query function
    pub transform: NpnTransform,
}

impl<'a> Match<'a> {
    /// For each cell input pin, the query input driving it and whether it is complemented
    pub fn pin_binding(&self) -> Vec<(usize, bool)> {
        let mut ret = vec![(0, false); self.transform.num_vars()];
        for i in 0..self.transform.num_vars() {
            ret[self.transform.target(i)] = (i, self.transform.is_input_negated(i));
        }
        ret
    }

    /// Returns whether the match requires an inverter at the output
    pub fn needs_output_inverter(&self) -> bool {
        self.transform.is_output_negated()
    }

    /// Returns whether the match requires an inverter on at least one input
    pub fn needs_input_inverters(&self) -> bool {
        self.transform.input_neg() != 0
    }
}

/// A standard-cell library: the cells of a technology, indexed by function
///
/// Libraries are immutable once built, and can be queried from multiple threads.
/// Cells are identified by a [`CellId`] handle.
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    pub(crate) cells: Vec<Cell>,
    wire_loads: Vec<WireLoad>,
    default_wire_load: Option<usize>,
    index: Arc<LibraryIndex>,
    classifier: Arc<Classifier>,
}

impl Library {
    /// Build a library from its cells, with default options
    pub fn build(cells: Vec<Cell>) -> Result<Library, LibraryError> {
        Library::build_with("library", cells, Vec::new(), None, &LibraryOptions::default())
    }

    /// Build a library from its cells and wire load models
    pub fn build_with(
        name: &str,
        cells: Vec<Cell>,
        wire_loads: Vec<WireLoad>,
        default_wire_load: Option<&str>,
        options: &LibraryOptions,
    ) -> Result<Library, LibraryError> {
        if options.exact_limit > MAX_EXACT_LIMIT {
            return Err(LibraryError::InvalidExactLimit {
                value: options.exact_limit,
                max: MAX_EXACT_LIMIT,
            });
        }
        let mut names = FxHashMap::default();
        for (i, c) in cells.iter().enumerate() {
            if names.insert(c.name().to_string(), CellId(i)).is_some() {
                return Err(LibraryError::DuplicateCellName(c.name().to_string()));
            }
        }
        if let Some(w) = wire_loads.iter().map(|w| w.name()).duplicates().next() {
            return Err(LibraryError::DuplicateWireLoad(w.to_string()));
        }
        let default_wire_load = match default_wire_load {
            None => None,
            Some(n) => Some(
                wire_loads
                    .iter()
                    .position(|w| w.name() == n)
                    .ok_or_else(|| LibraryError::UnknownWireLoad(n.to_string()))?,
            ),
        };

        let classifier = Classifier::new(options.exact_limit);
        let mut classes: FxHashMap<ClassKey, Vec<IndexEntry>> = FxHashMap::default();
        for (i, c) in cells.iter().enumerate() {
            for (output, o) in c.outputs().iter().enumerate() {
                let class = classifier.classify(o.function());
                classes.entry(class.key).or_default().push(IndexEntry {
                    cell: CellId(i),
                    output,
                    transform: class.transform,
                });
            }
        }
        for bucket in classes.values_mut() {
            bucket.sort_by(|a, b| {
                compare_cells(&cells, a.cell, b.cell).then(a.output.cmp(&b.output))
            });
        }

        let mut groups: FxHashMap<Vec<&TruthTable>, usize> = FxHashMap::default();
        let mut size_groups: Vec<Vec<CellId>> = Vec::new();
        let mut size_group_of = Vec::with_capacity(cells.len());
        for (i, c) in cells.iter().enumerate() {
            let g = *groups.entry(c.functions().collect()).or_insert_with(|| {
                size_groups.push(Vec::new());
                size_groups.len() - 1
            });
            size_groups[g].push(CellId(i));
            size_group_of.push(g);
        }
        for g in &mut size_groups {
            g.sort_by(|a, b| compare_cells(&cells, *a, *b));
        }

        log::info!(
            "Built library {} with {} cells, {} NPN classes and {} size groups",
            name,
            cells.len(),
            classes.len(),
            size_groups.len()
        );
        log::debug!("Classifier cache holds {} functions", classifier.cache_len());

        Ok(Library {
            name: name.to_string(),
            cells,
            wire_loads,
            default_wire_load,
            index: Arc::new(LibraryIndex {
                names,
                classes,
                size_groups,
                size_group_of,
            }),
            classifier: Arc::new(classifier),
        })
    }

    /// Copy of the library with different cells, sharing the index
    ///
    /// The cells must have the same names and functions as the original ones.
    pub(crate) fn with_cells(&self, cells: Vec<Cell>) -> Library {
        debug_assert!(cells.len() == self.cells.len());
        Library {
            name: self.name.clone(),
            cells,
            wire_loads: self.wire_loads.clone(),
            default_wire_load: self.default_wire_load,
            index: self.index.clone(),
            classifier: self.classifier.clone(),
        }
    }

    /// Name of the library
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the number of cells
    pub fn nb_cells(&self) -> usize {
        self.cells.len()
    }

    /// Return the number of NPN classes with at least one cell
    pub fn nb_classes(&self) -> usize {
        self.index.classes.len()
    }

    /// Return the number of groups of cells implementing the same functions
    pub fn nb_size_groups(&self) -> usize {
        self.index.size_groups.len()
    }

    /// All cells, in the order they were given
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Handles of all cells
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }

    /// Get the cell with this handle
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this library or one of its scaled versions.
    /// Use [`Library::get_cell`] for handles of unknown origin.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.0]
    }

    /// Get the cell with this handle, if it exists
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    /// Handle of the cell with this name
    pub fn cell_id(&self, name: &str) -> Option<CellId> {
        self.index.names.get(name).copied()
    }

    /// Get the cell with this name
    pub fn cell_by_name(&self, name: &str) -> Option<&Cell> {
        self.cell_id(name).map(|id| self.cell(id))
    }

    /// Classifier used to index the library
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Wire load models
    pub fn wire_loads(&self) -> &[WireLoad] {
        &self.wire_loads
    }

    /// Wire load model with this name
    pub fn wire_load(&self, name: &str) -> Option<&WireLoad> {
        self.wire_loads.iter().find(|w| w.name() == name)
    }

    /// Default wire load model
    pub fn default_wire_load(&self) -> Option<&WireLoad> {
        self.default_wire_load.map(|i| &self.wire_loads[i])
    }

    /// Returns whether both libraries share the same function index, as a library and its scaled
    /// versions do
    pub fn shares_index_with(&self, other: &Library) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }

    /// Cells implementing the same functions as this one, by increasing area: its drive strength
    /// variants
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this library, like [`Library::cell`].
    pub fn sizes(&self, id: CellId) -> &[CellId] {
        &self.index.size_groups[self.index.size_group_of[id.0]]
    }

    /// Drive strength variants of the cell, if the handle exists
    pub fn get_sizes(&self, id: CellId) -> Option<&[CellId]> {
        let g = *self.index.size_group_of.get(id.0)?;
        Some(&self.index.size_groups[g])
    }

    /// Find all cell outputs implementing the function, up to input permutation and complementation
    ///
    /// Matches are sorted by increasing area, then by name.
    /// Each match comes with the transform mapping the cell function to the query function,
    /// and only verified matches are returned.
    pub fn matches(&self, function: &TruthTable) -> Vec<Match<'_>> {
        self.matches_with(function, Rewiring::Npn)
    }

    /// Find all cell outputs implementing the function with the allowed rewiring
    ///
    /// With [`Rewiring::PermutationOnly`], only cells that implement the function up to a
    /// reordering of their pins are returned.
    pub fn matches_with(&self, function: &TruthTable, rewiring: Rewiring) -> Vec<Match<'_>> {
        let query = self.classifier.classify(function);
        let Some(bucket) = self.index.classes.get(&query.key) else {
            return Vec::new();
        };
        let to_query = query.transform.inverse();
        let mut ret = Vec::with_capacity(bucket.len());
        for e in bucket {
            let cell = &self.cells[e.cell.0];
            let cell_function = cell.output(e.output).function();
            let mut transform = e.transform.then(&to_query);
            if !query.key.is_exact() && transform.apply(cell_function) != *function {
                // Signatures only give a candidate: search for an actual transform
                match find_transform(cell_function, function) {
                    Some(t) => transform = t,
                    None => {
                        log::trace!("Rejected candidate {} for function {}", cell.name(), function);
                        continue;
                    }
                }
            }
            if rewiring == Rewiring::PermutationOnly && !transform.is_permutation() {
                // Another transform between the same functions may avoid the inverters
                match find_permutation(cell_function, function) {
                    Some(t) => transform = t,
                    None => continue,
                }
            }
            debug_assert_eq!(transform.apply(cell_function), *function);
            ret.push(Match {
                cell,
                id: e.cell,
                output: e.output,
                transform,
            });
        }
        ret.sort_by(|a, b| compare_cells(&self.cells, a.id, b.id).then(a.output.cmp(&b.output)));
        ret
    }
}

/// Order cells by area, then name
fn compare_cells(cells: &[Cell], a: CellId, b: CellId) -> std::cmp::Ordering {
    let (a, b) = (&cells[a.0], &cells[b.0]);
    a.area().total_cmp(&b.area()).then_with(|| a.name().cmp(b.name()))
}
