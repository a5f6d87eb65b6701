//! Midrank assignment for rank-based tests.
//!
//! Tied values share the average of the ranks they span (midranks), and the
//! tie term `T = Σ(tᵢ³ − tᵢ)` over tie blocks of size `tᵢ` feeds the
//! variance corrections of Kruskal-Wallis and Mann-Whitney.

/// Ranks of the pooled observations.
#[derive(Debug, Clone, PartialEq)]
pub struct PooledRanks {
    /// Sum of midranks per input sample, in input order.
    pub rank_sums: Vec<f64>,
    /// `Σ(t³ − t)` over all tie blocks of the pooled data.
    pub tie_term: f64,
    /// Total number of pooled observations.
    pub total: usize,
}

/// Assigns 1-based midranks to `data`, returned in input order.
///
/// # Complexity
/// Time: O(n log n), Space: O(n)
///
/// # Examples
/// ```
/// use u_inference::rank::midranks;
/// assert_eq!(midranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
/// ```
pub fn midranks(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));

    let mut ranks = vec![0.0; data.len()];
    for_each_tie_block(&order, data, |block, first_rank| {
        // Positions first_rank ..= first_rank + t − 1 share the average.
        let avg = first_rank as f64 + (block.len() as f64 - 1.0) / 2.0;
        for &idx in block {
            ranks[idx] = avg;
        }
    });
    ranks
}

/// Returns `Σ(tᵢ³ − tᵢ)` over the tie blocks of `data`.
///
/// # Examples
/// ```
/// use u_inference::rank::tie_term;
/// // One block of 2 and one of 3: (8 − 2) + (27 − 3) = 30
/// assert_eq!(tie_term(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]), 30.0);
/// ```
pub fn tie_term(data: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]));
    let mut term = 0.0;
    for_each_tie_block(&order, data, |block, _| {
        let t = block.len() as f64;
        term += t * t * t - t;
    });
    term
}

/// Pools several samples, ranks them jointly, and sums ranks per sample.
///
/// Callers must pass finite values; ordering uses `f64::total_cmp`.
pub fn rank_samples(samples: &[&[f64]]) -> PooledRanks {
    let pooled: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    let ranks = midranks(&pooled);

    let mut rank_sums = Vec::with_capacity(samples.len());
    let mut offset = 0;
    for s in samples {
        rank_sums.push(ranks[offset..offset + s.len()].iter().sum());
        offset += s.len();
    }

    PooledRanks {
        rank_sums,
        tie_term: tie_term(&pooled),
        total: pooled.len(),
    }
}

/// Walks `order` (indices sorted by value) in blocks of equal values,
/// passing each block and its 1-based starting rank.
fn for_each_tie_block(order: &[usize], data: &[f64], mut f: impl FnMut(&[usize], usize)) {
    let n = order.len();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && data[order[j]] == data[order[i]] {
            j += 1;
        }
        f(&order[i..j], i + 1);
        i = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midranks_no_ties() {
        assert_eq!(midranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_midranks_all_tied() {
        assert_eq!(midranks(&[5.0; 4]), vec![2.5; 4]);
        assert_eq!(tie_term(&[5.0; 4]), 60.0);
    }

    #[test]
    fn test_midranks_empty() {
        assert!(midranks(&[]).is_empty());
        assert_eq!(tie_term(&[]), 0.0);
    }

    #[test]
    fn test_tie_term_no_ties() {
        assert_eq!(tie_term(&[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_rank_samples_sums() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 4.0];
        let pooled = rank_samples(&[&a[..], &b[..]]);
        // Ranks: 1, 2, 3.5 | 3.5, 5
        assert_eq!(pooled.rank_sums, vec![6.5, 8.5]);
        assert_eq!(pooled.tie_term, 6.0);
        assert_eq!(pooled.total, 5);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn rank_sum_is_triangular(data in proptest::collection::vec(0_i32..20, 1..60)) {
            // Integer-valued data forces plenty of ties.
            let data: Vec<f64> = data.into_iter().map(f64::from).collect();
            let n = data.len() as f64;
            let total: f64 = midranks(&data).iter().sum();
            prop_assert!((total - n * (n + 1.0) / 2.0).abs() < 1e-9);
        }

        #[test]
        fn ranks_preserve_order(data in proptest::collection::vec(-1e3_f64..1e3, 2..40)) {
            let ranks = midranks(&data);
            for i in 0..data.len() {
                for j in 0..data.len() {
                    if data[i] < data[j] {
                        prop_assert!(ranks[i] < ranks[j]);
                    }
                }
            }
        }
    }
}
