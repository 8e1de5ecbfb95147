use std::sync::{PoisonError, RwLock};

use fxhash::FxHashMap;
use itertools::Itertools;

use crate::npn::transform::NpnTransform;
use crate::npn::truth_table::TruthTable;

/// Default maximum arity for exact NPN canonization
///
/// Beyond this, the search over all `n! * 2^(n+1)` transforms is replaced by a signature.
pub const DEFAULT_EXACT_LIMIT: usize = 6;

/// Largest supported arity for exact NPN canonization
///
/// An exact canonization of an 8-input function enumerates about 10 million transforms.
pub const MAX_EXACT_LIMIT: usize = 8;

/// Default maximum number of functions memoized by a [`Classifier`]
pub const DEFAULT_CACHE_CAPACITY: usize = 1 << 16;

/// Key identifying an NPN class
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ClassKey {
    /// Smallest table reachable by an NPN transform
    Exact(TruthTable),
    /// NPN-invariant signature, shared by all functions of the class but possibly by other classes
    Signature(Signature),
}

impl ClassKey {
    /// Returns whether the key identifies exactly one NPN class
    pub fn is_exact(&self) -> bool {
        matches!(self, ClassKey::Exact(_))
    }

    /// Number of inputs of the functions in the class
    pub fn num_vars(&self) -> usize {
        match self {
            ClassKey::Exact(t) => t.num_vars(),
            ClassKey::Signature(s) => s.num_vars,
        }
    }
}

/// NPN-invariant signature of a function
///
/// It is made of the number of true rows and of the unordered pair of cofactor weights of each input,
/// sorted. The polarity of the output yielding the smallest signature is used.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct Signature {
    num_vars: usize,
    weight: u64,
    cofactors: Box<[(u64, u64)]>,
}

impl Signature {
    fn from_table(f: &TruthTable) -> Signature {
        let cofactors = (0..f.num_vars())
            .map(|v| {
                let (a, b) = f.cofactor_weights(v);
                (a.min(b), a.max(b))
            })
            .sorted()
            .collect();
        Signature {
            num_vars: f.num_vars(),
            weight: f.count_ones(),
            cofactors,
        }
    }
}

/// Class of a function, with the transform mapping the function to its class representative
///
/// For exact keys, `transform.apply(f)` is the key's table.
/// For signature keys, the transform normalizes input order and polarities; two functions of the
/// same class usually, but not always, normalize to the same table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Classification {
    /// Class of the function
    pub key: ClassKey,
    /// Transform from the function to its representative
    pub transform: NpnTransform,
}

/// Compute the NPN class of a function
///
/// Functions with at most `exact_limit` inputs are canonized exactly, others get a signature.
/// The limit is capped to [`MAX_EXACT_LIMIT`].
/// This is a pure function: the result only depends on its arguments.
pub fn canonize(f: &TruthTable, exact_limit: usize) -> Classification {
    if f.num_vars() <= exact_limit.min(MAX_EXACT_LIMIT) {
        exact_canonization(f)
    } else {
        signature_canonization(f)
    }
}

/// Exhaustive search for the smallest table reachable by an NPN transform
///
/// Permutations are enumerated in lexicographic order, then input complementation masks in increasing
/// order, then the output polarity. The first transform reaching the minimum is kept.
fn exact_canonization(f: &TruthTable) -> Classification {
    let n = f.num_vars();
    let mut best = f.clone();
    let mut best_transform = NpnTransform::identity(n);
    let perms: Vec<Vec<usize>> = if n == 0 {
        vec![Vec::new()]
    } else {
        (0..n).permutations(n).collect()
    };
    for perm in perms {
        let permuted = f.permute(&perm);
        for mask in 0..f.num_bits() {
            let flipped = permuted.flip_inputs(mask);
            let complemented = !&flipped;
            if flipped < best {
                best = flipped;
                best_transform = NpnTransform::new(&perm, mask as u32, false);
            }
            if complemented < best {
                best = complemented;
                best_transform = NpnTransform::new(&perm, mask as u32, true);
            }
        }
    }
    debug_assert_eq!(best_transform.apply(f), best);
    Classification {
        key: ClassKey::Exact(best),
        transform: best_transform,
    }
}

/// Signature and normalizing transform for large functions
fn signature_canonization(f: &TruthTable) -> Classification {
    let plain = Signature::from_table(f);
    let complemented = Signature::from_table(&!f);
    let output_neg = complemented < plain;
    let g = if output_neg { !f } else { f.clone() };

    // Sort inputs by cofactor weights, and give the heavier cofactor to the positive polarity
    let weights: Vec<(u64, u64)> = (0..g.num_vars()).map(|v| g.cofactor_weights(v)).collect();
    let perm: Vec<usize> = (0..g.num_vars())
        .sorted_by_key(|v| {
            let (a, b) = weights[*v];
            (a.min(b), a.max(b))
        })
        .collect();
    let mut input_neg = 0;
    for (i, v) in perm.iter().enumerate() {
        let (pos, neg) = weights[*v];
        if pos < neg {
            input_neg |= 1 << i;
        }
    }
    log::trace!("Signature canonization of {}-input function {}", f.num_vars(), f);
    Classification {
        key: ClassKey::Signature(if output_neg { complemented } else { plain }),
        transform: NpnTransform::new(&perm, input_neg, output_neg),
    }
}

/// NPN classifier with a memoization cache
///
/// The cache belongs to the classifier: independent classifiers do not share state, and
/// [`Classifier::clear_cache`] resets it. Once it holds `capacity` functions, new results are
/// computed but no longer stored, so the functions classified first stay cached.
/// Classification is safe to call from multiple threads.
#[derive(Debug)]
pub struct Classifier {
    exact_limit: usize,
    capacity: usize,
    cache: RwLock<FxHashMap<TruthTable, Classification>>,
}

impl Classifier {
    /// Create a classifier canonizing functions exactly up to `exact_limit` inputs
    ///
    /// The limit is capped to [`MAX_EXACT_LIMIT`].
    pub fn new(exact_limit: usize) -> Classifier {
        Classifier::with_capacity(exact_limit, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a classifier memoizing at most `capacity` functions
    pub fn with_capacity(exact_limit: usize, capacity: usize) -> Classifier {
        Classifier {
            exact_limit: exact_limit.min(MAX_EXACT_LIMIT),
            capacity,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Maximum number of functions in the cache
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum arity for exact canonization
    pub fn exact_limit(&self) -> usize {
        self.exact_limit
    }

    /// Returns whether functions with this number of inputs are canonized exactly
    pub fn is_exact(&self, num_vars: usize) -> bool {
        num_vars <= self.exact_limit
    }

    /// Compute the NPN class of a function, reusing previous results
    pub fn classify(&self, f: &TruthTable) -> Classification {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = cache.get(f) {
                return c.clone();
            }
        }
        let c = canonize(f, self.exact_limit);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() >= self.capacity {
            return c;
        }
        cache.entry(f.clone()).or_insert(c).clone()
    }

    /// Number of functions in the cache
    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Remove all cached results
    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(DEFAULT_EXACT_LIMIT)
    }
}
