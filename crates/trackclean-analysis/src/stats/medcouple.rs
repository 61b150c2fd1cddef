//! Medcouple, a robust skewness measure in [-1, 1].
//!
//! Exact O(n log n) evaluation by Johnson–Mizoguchi selection over the
//! implicit kernel matrix. Rows and columns of the matrix are both
//! non-increasing, which lets every pass count the entries above and below a
//! pivot in linear time without materializing the matrix.

use super::valid_values;

/// Medcouple of the non-missing values. `None` when no value is valid.
///
/// For an even number of kernel entries the result is the mean of the two
/// middle entries.
pub fn medcouple(values: &[f64]) -> Option<f64> {
    let mut sorted = valid_values(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| b.total_cmp(a));

    let n = sorted.len();
    if sorted[0] == sorted[n - 1] {
        return Some(0.0);
    }

    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    let scale = 2.0 * sorted.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return Some(0.0);
    }

    let kernel = Kernel::new(&sorted, median, scale);
    let total = kernel.upper.len() * kernel.lower.len();
    let upper_middle = kernel.kth_largest(total / 2)?;
    if total % 2 == 1 {
        return Some(upper_middle);
    }
    let lower_middle = kernel.kth_largest(total / 2 - 1)?;
    Some((upper_middle + lower_middle) / 2.0)
}

/// Centered, scaled halves of the sample, both in non-increasing order.
struct Kernel {
    upper: Vec<f64>,
    lower: Vec<f64>,
}

impl Kernel {
    fn new(descending: &[f64], median: f64, scale: f64) -> Self {
        let upper = descending
            .iter()
            .filter(|&&v| v >= median)
            .map(|v| (v - median) / scale)
            .collect();
        let lower = descending
            .iter()
            .filter(|&&v| v <= median)
            .map(|v| (v - median) / scale)
            .collect();
        Self { upper, lower }
    }

    fn h(&self, i: usize, j: usize) -> f64 {
        let a = self.upper[i];
        let b = self.lower[j];
        if a == b {
            // Both at the median: sign by position in the tie block.
            let p = self.upper.len() as isize;
            match (p - 1 - i as isize - j as isize).signum() {
                1 => 1.0,
                -1 => -1.0,
                _ => 0.0,
            }
        } else {
            (a + b) / (a - b)
        }
    }

    /// The `k`-th largest kernel entry (0-based).
    fn kth_largest(&self, k: usize) -> Option<f64> {
        let p = self.upper.len();
        let q = self.lower.len() as isize;

        let mut left = vec![0_isize; p];
        let mut right = vec![q - 1; p];
        let mut left_total = 0_usize;
        let mut right_total = p * q as usize;

        while right_total - left_total > p {
            let mut candidates: Vec<(f64, usize)> = (0..p)
                .filter(|&i| left[i] <= right[i])
                .map(|i| {
                    let mid = ((left[i] + right[i]) / 2) as usize;
                    (self.h(i, mid), (right[i] - left[i] + 1) as usize)
                })
                .collect();
            let pivot = weighted_median(&mut candidates)?;

            let greater = self.last_greater(pivot);
            let less = self.first_less(pivot);
            let greater_total: usize = greater.iter().map(|&j| (j + 1) as usize).sum();
            let less_total: usize = less.iter().map(|&j| j as usize).sum();

            if k < greater_total {
                right = greater;
                right_total = greater_total;
            } else if k >= less_total {
                left = less;
                left_total = less_total;
            } else {
                return Some(pivot);
            }
        }

        let mut remaining = Vec::with_capacity(right_total - left_total);
        for i in 0..p {
            for j in left[i]..=right[i] {
                remaining.push(self.h(i, j as usize));
            }
        }
        remaining.sort_by(|a, b| b.total_cmp(a));
        remaining.get(k.checked_sub(left_total)?).copied()
    }

    /// Per row, the last column whose entry is greater than `pivot` (-1 if none).
    fn last_greater(&self, pivot: f64) -> Vec<isize> {
        let p = self.upper.len();
        let q = self.lower.len();
        let mut result = vec![0_isize; p];
        let mut j = 0_usize;
        for i in (0..p).rev() {
            while j < q && self.h(i, j) > pivot {
                j += 1;
            }
            result[i] = j as isize - 1;
        }
        result
    }

    /// Per row, the number of entries not less than `pivot`.
    fn first_less(&self, pivot: f64) -> Vec<isize> {
        let p = self.upper.len();
        let mut result = vec![0_isize; p];
        let mut j = self.lower.len() as isize - 1;
        for (i, slot) in result.iter_mut().enumerate() {
            while j >= 0 && self.h(i, j as usize) < pivot {
                j -= 1;
            }
            *slot = j + 1;
        }
        result
    }
}

/// Smallest value whose cumulative weight reaches half the total.
fn weighted_median(candidates: &mut [(f64, usize)]) -> Option<f64> {
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
    let total: usize = candidates.iter().map(|(_, w)| w).sum();
    let mut cumulative = 0;
    for &(value, weight) in candidates.iter() {
        cumulative += weight;
        if 2 * cumulative >= total {
            return Some(value);
        }
    }
    candidates.last().map(|(v, _)| *v)
}
