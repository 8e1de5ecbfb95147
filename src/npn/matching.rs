//! Boolean matching under NPN transforms

use crate::npn::transform::NpnTransform;
use crate::npn::truth_table::TruthTable;

/// Find a transform mapping `cell` to `query`, so that `t.apply(cell) == *query`
///
/// The search assigns query inputs to cell inputs one at a time. After each assignment, the
/// number of true rows of every cofactor over the assigned inputs must agree between both
/// functions, which prunes most of the `n! * 2^(n+1)` candidates. Functions whose cofactor
/// weights over pairs of inputs differ are rejected before searching.
/// Returns None if the functions are not NPN-equivalent.
pub fn find_transform(cell: &TruthTable, query: &TruthTable) -> Option<NpnTransform> {
    search(cell, query, true)
}

/// Find a pure input permutation mapping `cell` to `query`, without any complementation
pub fn find_permutation(cell: &TruthTable, query: &TruthTable) -> Option<NpnTransform> {
    search(cell, query, false)
}

fn search(cell: &TruthTable, query: &TruthTable, allow_negation: bool) -> Option<NpnTransform> {
    if cell.num_vars() != query.num_vars() {
        return None;
    }
    let n = cell.num_vars();
    let query_ones = ones(query);
    let query_pairs = pair_profile(query, &query_ones);
    let query_weights: Vec<(u64, u64)> = (0..n).map(|v| query.cofactor_weights(v)).collect();
    // Cofactor weights of the query over its first d inputs, for each depth d
    let query_cofactors: Vec<Vec<u64>> = (0..=n)
        .map(|d| {
            let mut counts = vec![0; 1 << d];
            for m in &query_ones {
                counts[m & ((1 << d) - 1)] += 1;
            }
            counts
        })
        .collect();
    let polarities: &[bool] = if allow_negation { &[false, true] } else { &[false] };
    for &output_neg in polarities {
        let g = if output_neg { !cell } else { cell.clone() };
        if g.count_ones() != query.count_ones() {
            continue;
        }
        let cell_ones = ones(&g);
        if pair_profile(&g, &cell_ones) != query_pairs {
            continue;
        }
        let cell_weights: Vec<(u64, u64)> = (0..n).map(|v| g.cofactor_weights(v)).collect();
        let mut search = Search {
            cell,
            query,
            cell_ones: &cell_ones,
            cell_weights: &cell_weights,
            query_weights: &query_weights,
            query_cofactors: &query_cofactors,
            output_neg,
            allow_negation,
            perm: Vec::with_capacity(n),
            input_neg: 0,
            used: vec![false; n],
            counts: Vec::new(),
        };
        if let Some(t) = search.run() {
            return Some(t);
        }
    }
    None
}

/// Rows where the function is true
fn ones(f: &TruthTable) -> Vec<usize> {
    (0..f.num_bits()).filter(|m| f.value(*m)).collect()
}

/// NPN-invariant profile of a function: for each pair of inputs, the sorted weights of its
/// four cofactors, sorted
fn pair_profile(f: &TruthTable, ones: &[usize]) -> Vec<[u64; 4]> {
    let n = f.num_vars();
    let mut profile = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for a in 0..n {
        for b in (a + 1)..n {
            let mut counts = [0; 4];
            for m in ones {
                counts[((m >> a) & 1) | (((m >> b) & 1) << 1)] += 1;
            }
            counts.sort_unstable();
            profile.push(counts);
        }
    }
    profile.sort_unstable();
    profile
}

/// State of the backtracking search
struct Search<'a> {
    cell: &'a TruthTable,
    query: &'a TruthTable,
    cell_ones: &'a [usize],
    cell_weights: &'a [(u64, u64)],
    query_weights: &'a [(u64, u64)],
    query_cofactors: &'a [Vec<u64>],
    output_neg: bool,
    allow_negation: bool,
    perm: Vec<usize>,
    input_neg: u32,
    used: Vec<bool>,
    counts: Vec<u64>,
}

impl<'a> Search<'a> {
    fn run(&mut self) -> Option<NpnTransform> {
        let i = self.perm.len();
        if i == self.cell_weights.len() {
            let t = NpnTransform::new(&self.perm, self.input_neg, self.output_neg);
            return if t.apply(self.cell) == *self.query {
                Some(t)
            } else {
                None
            };
        }
        let (qa, qb) = self.query_weights[i];
        for p in 0..self.cell_weights.len() {
            if self.used[p] {
                continue;
            }
            let (ca, cb) = self.cell_weights[p];
            let polarities: &[bool] = if self.allow_negation { &[false, true] } else { &[false] };
            for &neg in polarities {
                let compatible = if neg {
                    (qa, qb) == (cb, ca)
                } else {
                    (qa, qb) == (ca, cb)
                };
                if !compatible {
                    continue;
                }
                self.used[p] = true;
                self.perm.push(p);
                if neg {
                    self.input_neg |= 1 << i;
                }
                let found = if self.partial_match() {
                    self.run()
                } else {
                    None
                };
                self.used[p] = false;
                self.perm.pop();
                self.input_neg &= !(1 << i);
                if found.is_some() {
                    return found;
                }
            }
        }
        None
    }

    /// Check the cofactor weights over the inputs assigned so far
    fn partial_match(&mut self) -> bool {
        let d = self.perm.len();
        if d < 2 || d == self.cell_weights.len() {
            // Single inputs are checked by their weights, complete assignments by the functions
            return true;
        }
        self.counts.clear();
        self.counts.resize(1 << d, 0);
        for m in self.cell_ones {
            let mut k = 0;
            for (j, p) in self.perm.iter().enumerate() {
                let bit = ((m >> p) & 1) ^ ((self.input_neg >> j) & 1) as usize;
                k |= bit << j;
            }
            self.counts[k] += 1;
        }
        self.counts == self.query_cofactors[d]
    }
}
