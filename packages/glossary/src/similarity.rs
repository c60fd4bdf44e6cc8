//! Normalized edit-distance similarity.
//!
//! The score is the normalized Indel similarity: the edit distance counts
//! only insertions and deletions, so `distance = |a| + |b| - 2·LCS(a, b)`
//! and the ratio is `100 · (1 - distance / (|a| + |b|))`. Scores range from
//! 0 to 100, are symmetric and are case-sensitive. Lengths are measured in
//! Unicode scalar values.

/// Similarity ratio between `a` and `b` on a 0–100 scale.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let lcs = lcs_len(&a, &b);
    200.0 * lcs as f64 / total as f64
}

/// Length of the longest common subsequence, using a single DP row.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0_usize; short.len() + 1];

    for &x in long {
        let mut diagonal = 0;
        for (j, &y) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x == y {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[short.len()]
}
