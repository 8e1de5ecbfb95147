use std::fmt;

use crate::npn::truth_table::TruthTable;

/// Input permutation with input and output complementation
///
/// Applying a transform to `f` yields the function `g` with `g(y) = f(x) ^ output_neg`,
/// where `x[perm[i]] = y[i] ^ input_neg[i]`.
/// In other words, input `i` of `g` drives input `perm[i]` of `f`, possibly complemented.
///
/// When matching a library cell, the transform maps the cell function to the query function:
/// query input `i` is wired to cell pin `perm[i]`.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NpnTransform {
    perm: Box<[u8]>,
    input_neg: u32,
    output_neg: bool,
}

impl NpnTransform {
    /// Transform that leaves all functions unchanged
    pub fn identity(num_vars: usize) -> NpnTransform {
        NpnTransform {
            perm: (0..num_vars as u8).collect(),
            input_neg: 0,
            output_neg: false,
        }
    }

    /// Build a transform; `input_neg` holds one bit per input
    pub fn new(perm: &[usize], input_neg: u32, output_neg: bool) -> NpnTransform {
        let n = perm.len();
        let mut seen = vec![false; n];
        for &p in perm {
            assert!(p < n && !seen[p], "{:?} is not a permutation", perm);
            seen[p] = true;
        }
        assert!(n >= 32 || input_neg >> n == 0);
        NpnTransform {
            perm: perm.iter().map(|p| *p as u8).collect(),
            input_neg,
            output_neg,
        }
    }

    /// Number of inputs
    pub fn num_vars(&self) -> usize {
        self.perm.len()
    }

    /// Input of the original function driven by input `i`
    pub fn target(&self, i: usize) -> usize {
        self.perm[i] as usize
    }

    /// Input of the transformed function driving input `pin` of the original function
    pub fn input_source(&self, pin: usize) -> usize {
        self.perm
            .iter()
            .position(|p| *p as usize == pin)
            .unwrap_or_else(|| panic!("No input drives pin {}", pin))
    }

    /// Permutation, as the target of each input
    pub fn perm(&self) -> Vec<usize> {
        self.perm.iter().map(|p| *p as usize).collect()
    }

    /// Mask of complemented inputs
    pub fn input_neg(&self) -> u32 {
        self.input_neg
    }

    /// Returns whether input `i` is complemented
    pub fn is_input_negated(&self, i: usize) -> bool {
        (self.input_neg >> i) & 1 != 0
    }

    /// Returns whether the output is complemented
    pub fn is_output_negated(&self) -> bool {
        self.output_neg
    }

    /// Returns whether this is the identity
    pub fn is_identity(&self) -> bool {
        *self == NpnTransform::identity(self.num_vars())
    }

    /// Returns whether the transform only permutes the inputs, without complementation
    pub fn is_permutation(&self) -> bool {
        self.input_neg == 0 && !self.output_neg
    }

    /// Apply the transform to a function
    pub fn apply(&self, f: &TruthTable) -> TruthTable {
        assert_eq!(f.num_vars(), self.num_vars());
        let mut ret = TruthTable::zero(f.num_vars());
        for y in 0..f.num_bits() {
            let z = y ^ self.input_neg as usize;
            let mut x = 0;
            for (i, p) in self.perm.iter().enumerate() {
                x |= ((z >> i) & 1) << p;
            }
            if f.value(x) != self.output_neg {
                ret.set_value(y, true);
            }
        }
        ret
    }

    /// Transform undoing this one: `t.inverse().apply(&t.apply(f)) == f`
    pub fn inverse(&self) -> NpnTransform {
        let mut perm = vec![0u8; self.num_vars()];
        let mut input_neg = 0;
        for (i, p) in self.perm.iter().enumerate() {
            perm[*p as usize] = i as u8;
            if self.is_input_negated(i) {
                input_neg |= 1 << p;
            }
        }
        NpnTransform {
            perm: perm.into(),
            input_neg,
            output_neg: self.output_neg,
        }
    }

    /// Composition: `a.then(&b).apply(f) == b.apply(&a.apply(f))`
    pub fn then(&self, other: &NpnTransform) -> NpnTransform {
        assert_eq!(self.num_vars(), other.num_vars());
        let mut perm = vec![0u8; self.num_vars()];
        let mut input_neg = 0;
        for i in 0..self.num_vars() {
            let mid = other.target(i);
            perm[i] = self.perm[mid];
            if other.is_input_negated(i) != self.is_input_negated(mid) {
                input_neg |= 1 << i;
            }
        }
        NpnTransform {
            perm: perm.into(),
            input_neg,
            output_neg: self.output_neg != other.output_neg,
        }
    }
}

impl fmt::Display for NpnTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inputs = (0..self.num_vars())
            .map(|i| {
                let neg = if self.is_input_negated(i) { "!" } else { "" };
                format!("{}{}", neg, self.perm[i])
            })
            .collect::<Vec<_>>()
            .join(", ");
        let neg = if self.output_neg { "!" } else { "" };
        write!(f, "{}[{}]", neg, inputs)
    }
}
