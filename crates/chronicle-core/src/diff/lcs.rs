/// Longest-common-subsequence alignment of two line sequences.
use std::collections::HashMap;

/// Matched positions of a common subsequence.
///
/// `a[k]` and `b[k]` are indices of equal lines in the baseline and current
/// sequences. Both vectors are strictly ascending and of equal length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LcsAlignment {
    pub a: Vec<usize>,
    pub b: Vec<usize>,
}

impl LcsAlignment {
    /// Number of matched lines.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Returns true if no lines matched.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Iterates over matched `(a, b)` index pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.a.iter().copied().zip(self.b.iter().copied())
    }
}

/// Aligns `a` against `b`.
///
/// Uses the exact dynamic-programming table when `a.len() * b.len()` fits in
/// `cell_limit`, otherwise a greedy forward match that may under-report the
/// common subsequence on inputs with many repeated lines.
pub fn lcs(a: &[&str], b: &[&str], cell_limit: usize) -> LcsAlignment {
    let cells = a.len().saturating_mul(b.len());
    if cells <= cell_limit {
        tracing::debug!(a = a.len(), b = b.len(), "exact lcs");
        exact(a, b)
    } else {
        tracing::debug!(a = a.len(), b = b.len(), cell_limit, "greedy lcs fallback");
        greedy(a, b)
    }
}

/// Classic DP table with backtracking from the bottom-right corner.
///
/// When both neighbours hold the same length the walk moves along `a`, which
/// makes the baseline line the deleted one and keeps output reproducible.
fn exact(a: &[&str], b: &[&str]) -> LcsAlignment {
    let n = a.len();
    let m = b.len();
    if n == 0 || m == 0 {
        return LcsAlignment::default();
    }

    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if a[i - 1] == b[j - 1] {
                table[(i - 1) * width + j - 1] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + j - 1])
            };
        }
    }

    let mut matched_a = Vec::new();
    let mut matched_b = Vec::new();
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            matched_a.push(i - 1);
            matched_b.push(j - 1);
            i -= 1;
            j -= 1;
        } else if table[(i - 1) * width + j] >= table[i * width + j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    matched_a.reverse();
    matched_b.reverse();
    LcsAlignment {
        a: matched_a,
        b: matched_b,
    }
}

/// Greedy forward matching over an index of baseline line positions.
fn greedy(a: &[&str], b: &[&str]) -> LcsAlignment {
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, line) in a.iter().enumerate() {
        positions.entry(line).or_default().push(i);
    }

    let mut alignment = LcsAlignment::default();
    let mut next_a = 0;
    for (j, line) in b.iter().enumerate() {
        let Some(candidates) = positions.get(line) else {
            continue;
        };
        let idx = candidates.partition_point(|&p| p < next_a);
        if let Some(&i) = candidates.get(idx) {
            alignment.a.push(i);
            alignment.b.push(j);
            next_a = i + 1;
        }
    }
    alignment
}
