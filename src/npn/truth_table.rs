use std::cmp::Ordering;
use std::fmt;
use std::ops::Not;

use volute::Lut;

/// Maximum number of inputs of a truth table
pub const MAX_VARS: usize = 16;

/// Complete truth table of a single-output Boolean function
///
/// Input `i` is bit `i` of the row index. Text forms are written MSB-first: the leftmost
/// character holds the highest row, so that a 2-input And is `1000` in binary and `8` in hexadecimal.
/// Tables are ordered the same way, which makes the order lexicographic on the MSB-first form.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct TruthTable {
    num_vars: usize,
    blocks: Box<[u64]>,
}

/// Number of 64b blocks required to store a table
fn nb_blocks(num_vars: usize) -> usize {
    if num_vars <= 6 {
        1
    } else {
        1 << (num_vars - 6)
    }
}

/// Mask of the valid bits in the single block of small tables
fn block_mask(num_vars: usize) -> u64 {
    if num_vars >= 6 {
        !0
    } else {
        (1u64 << (1 << num_vars)) - 1
    }
}

impl TruthTable {
    /// Create the constant zero function
    pub fn zero(num_vars: usize) -> TruthTable {
        assert!(num_vars <= MAX_VARS, "at most {MAX_VARS} inputs are supported");
        TruthTable {
            num_vars,
            blocks: vec![0; nb_blocks(num_vars)].into(),
        }
    }

    /// Create the constant one function
    pub fn one(num_vars: usize) -> TruthTable {
        !TruthTable::zero(num_vars)
    }

    /// Create the function returning the value of input `var`
    pub fn nth_var(num_vars: usize, var: usize) -> TruthTable {
        assert!(var < num_vars);
        let mut ret = TruthTable::zero(num_vars);
        for mask in 0..ret.num_bits() {
            if (mask >> var) & 1 != 0 {
                ret.set_value(mask, true);
            }
        }
        ret
    }

    /// Build a table from the value of each row
    pub fn from_fn<F: FnMut(usize) -> bool>(num_vars: usize, mut f: F) -> TruthTable {
        let mut ret = TruthTable::zero(num_vars);
        for mask in 0..ret.num_bits() {
            ret.set_value(mask, f(mask));
        }
        ret
    }

    /// Number of inputs of the function
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of rows in the table
    pub fn num_bits(&self) -> usize {
        1 << self.num_vars
    }

    /// Value of the function for the given input assignment
    pub fn value(&self, mask: usize) -> bool {
        debug_assert!(mask < self.num_bits());
        (self.blocks[mask >> 6] >> (mask & 63)) & 1 != 0
    }

    /// Set the value of the function for the given input assignment
    pub fn set_value(&mut self, mask: usize, value: bool) {
        debug_assert!(mask < self.num_bits());
        let bit = 1u64 << (mask & 63);
        if value {
            self.blocks[mask >> 6] |= bit;
        } else {
            self.blocks[mask >> 6] &= !bit;
        }
    }

    /// Number of rows where the function is true
    pub fn count_ones(&self) -> u64 {
        self.blocks.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// Number of rows where the function is true, for each value of the input: (ones at 1, ones at 0)
    pub fn cofactor_weights(&self, var: usize) -> (u64, u64) {
        assert!(var < self.num_vars);
        let mut pos = 0;
        let mut neg = 0;
        for mask in 0..self.num_bits() {
            if self.value(mask) {
                if (mask >> var) & 1 != 0 {
                    pos += 1;
                } else {
                    neg += 1;
                }
            }
        }
        (pos, neg)
    }

    /// Returns whether the function depends on the input
    pub fn depends_on(&self, var: usize) -> bool {
        assert!(var < self.num_vars);
        let bit = 1 << var;
        (0..self.num_bits())
            .filter(|m| m & bit == 0)
            .any(|m| self.value(m) != self.value(m | bit))
    }

    /// Inputs the function depends on, in increasing order
    pub fn support(&self) -> Vec<usize> {
        (0..self.num_vars).filter(|v| self.depends_on(*v)).collect()
    }

    /// Returns whether the function is constant
    pub fn is_constant(&self) -> bool {
        *self == TruthTable::zero(self.num_vars) || *self == TruthTable::one(self.num_vars)
    }

    /// Permute the inputs: input `i` of the result drives input `perm[i]` of this function
    pub fn permute(&self, perm: &[usize]) -> TruthTable {
        assert_eq!(perm.len(), self.num_vars);
        let mut ret = TruthTable::zero(self.num_vars);
        for y in 0..self.num_bits() {
            let mut x = 0;
            for (i, p) in perm.iter().enumerate() {
                x |= ((y >> i) & 1) << p;
            }
            if self.value(x) {
                ret.set_value(y, true);
            }
        }
        ret
    }

    /// Complement the inputs in the mask: row `y` of the result is row `y ^ mask` of this function
    pub fn flip_inputs(&self, mask: usize) -> TruthTable {
        debug_assert!(mask < self.num_bits());
        let mut ret = TruthTable::zero(self.num_vars);
        for y in 0..self.num_bits() {
            if self.value(y ^ mask) {
                ret.set_value(y, true);
            }
        }
        ret
    }

    /// Parse a table written in binary (`1000`) or hexadecimal (`8` or `0x8`), MSB-first
    ///
    /// Binary is recognized when the string has exactly one character per row.
    pub fn parse(num_vars: usize, s: &str) -> Option<TruthTable> {
        if num_vars > MAX_VARS {
            return None;
        }
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return TruthTable::from_hex_str(num_vars, hex);
        }
        if s.len() == 1 << num_vars && s.chars().all(|c| c == '0' || c == '1') {
            TruthTable::from_binary_str(num_vars, s)
        } else {
            TruthTable::from_hex_str(num_vars, s)
        }
    }

    /// Parse a table written in binary, MSB-first
    pub fn from_binary_str(num_vars: usize, s: &str) -> Option<TruthTable> {
        if num_vars > MAX_VARS || s.len() != 1 << num_vars {
            return None;
        }
        let mut ret = TruthTable::zero(num_vars);
        for (i, c) in s.chars().rev().enumerate() {
            match c {
                '0' => (),
                '1' => ret.set_value(i, true),
                _ => return None,
            }
        }
        Some(ret)
    }

    /// Parse a table written in hexadecimal, MSB-first
    pub fn from_hex_str(num_vars: usize, s: &str) -> Option<TruthTable> {
        if num_vars > MAX_VARS || s.len() != hex_len(num_vars) {
            return None;
        }
        let mut ret = TruthTable::zero(num_vars);
        for (i, c) in s.chars().rev().enumerate() {
            let digit = c.to_digit(16)? as usize;
            for b in 0..4 {
                if (digit >> b) & 1 != 0 {
                    let mask = 4 * i + b;
                    if mask >= ret.num_bits() {
                        return None;
                    }
                    ret.set_value(mask, true);
                }
            }
        }
        Some(ret)
    }

    /// Hexadecimal representation, MSB-first
    pub fn to_hex_string(&self) -> String {
        let mut ret = String::with_capacity(hex_len(self.num_vars));
        for i in (0..hex_len(self.num_vars)).rev() {
            let mut digit = 0;
            for b in 0..4 {
                let mask = 4 * i + b;
                if mask < self.num_bits() && self.value(mask) {
                    digit |= 1 << b;
                }
            }
            ret.push(std::char::from_digit(digit, 16).unwrap_or('0'));
        }
        ret
    }

    /// Binary representation, MSB-first
    pub fn to_binary_string(&self) -> String {
        (0..self.num_bits())
            .rev()
            .map(|m| if self.value(m) { '1' } else { '0' })
            .collect()
    }

    /// Convert from a Lut
    pub fn from_lut(lut: &Lut) -> TruthTable {
        TruthTable::from_fn(lut.num_vars(), |mask| lut.value(mask))
    }

    /// Convert to a Lut
    pub fn to_lut(&self) -> Lut {
        match Lut::from_hex_string(self.num_vars, &self.to_hex_string()) {
            Ok(lut) => lut,
            Err(_) => unreachable!("truth tables always have a valid hexadecimal form"),
        }
    }
}

/// Number of hexadecimal digits for a table
fn hex_len(num_vars: usize) -> usize {
    if num_vars < 2 {
        1
    } else {
        1 << (num_vars - 2)
    }
}

impl Not for TruthTable {
    type Output = TruthTable;

    fn not(mut self) -> TruthTable {
        let mask = block_mask(self.num_vars);
        for b in self.blocks.iter_mut() {
            *b = !*b & mask;
        }
        self
    }
}

impl Not for &TruthTable {
    type Output = TruthTable;

    fn not(self) -> TruthTable {
        !self.clone()
    }
}

impl Ord for TruthTable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.num_vars
            .cmp(&other.num_vars)
            .then_with(|| self.blocks.iter().rev().cmp(other.blocks.iter().rev()))
    }
}

impl PartialOrd for TruthTable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&Lut> for TruthTable {
    fn from(lut: &Lut) -> Self {
        TruthTable::from_lut(lut)
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}
