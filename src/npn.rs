//! Classification of Boolean functions up to NPN equivalence
//!
//! Two functions are NPN-equivalent if one is obtained from the other by permuting the inputs,
//! complementing some inputs and optionally complementing the output.
//! Cells implementing equivalent functions can replace each other by rewiring their pins.
//!
//! ```
//! use sclib::npn::{Classifier, TruthTable};
//!
//! let classifier = Classifier::default();
//! let and = TruthTable::parse(2, "1000").unwrap();
//! let nor = TruthTable::parse(2, "0001").unwrap();
//! assert_eq!(classifier.classify(&and).key, classifier.classify(&nor).key);
//! ```

mod classifier;
mod matching;
mod transform;
mod truth_table;

pub use classifier::{
    canonize, ClassKey, Classification, Classifier, Signature, DEFAULT_CACHE_CAPACITY,
    DEFAULT_EXACT_LIMIT, MAX_EXACT_LIMIT,
};
pub use matching::{find_permutation, find_transform};
pub use transform::NpnTransform;
pub use truth_table::{TruthTable, MAX_VARS};
