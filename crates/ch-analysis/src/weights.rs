//! Sparse spatial weights over county centroids.

/// Row-oriented sparse weight matrix.
///
/// `neighbors[i]` and `weights[i]` are parallel: county `i` gives weight
/// `weights[i][k]` to county `neighbors[i][k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialWeights {
    neighbors: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
}

impl SpatialWeights {
    /// Binary k-nearest-neighbor weights by Euclidean distance.
    ///
    /// `k` is capped at `n - 1`. Equidistant candidates are ordered by row
    /// index, so the earlier row wins a tie. Brute force, O(n² log n).
    pub fn knn(points: &[(f64, f64)], k: usize) -> Self {
        let n = points.len();
        let k = k.min(n.saturating_sub(1));
        let mut neighbors = Vec::with_capacity(n);

        for (i, &(xi, yi)) in points.iter().enumerate() {
            let mut candidates: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, &(xj, yj))| ((xi - xj).powi(2) + (yi - yj).powi(2), j))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            neighbors.push(candidates.into_iter().take(k).map(|(_, j)| j).collect::<Vec<_>>());
        }

        let weights = neighbors.iter().map(|row| vec![1.0; row.len()]).collect();
        Self { neighbors, weights }
    }

    /// Scale every row to sum to 1. Rows without neighbors stay empty.
    pub fn row_standardize(&mut self) {
        for row in &mut self.weights {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|w| *w /= total);
            }
        }
    }

    /// Builder form of [`SpatialWeights::row_standardize`].
    pub fn standardized(mut self) -> Self {
        self.row_standardize();
        self
    }

    pub fn n(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Weight of the link `i -> j`, zero when absent.
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.neighbors[i]
            .iter()
            .position(|&n| n == j)
            .map_or(0.0, |k| self.weights[i][k])
    }

    fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.neighbors.iter().enumerate().flat_map(move |(i, row)| {
            row.iter()
                .zip(&self.weights[i])
                .map(move |(&j, &w)| (i, j, w))
        })
    }

    /// Sum of each row.
    pub fn row_sums(&self) -> Vec<f64> {
        self.weights.iter().map(|row| row.iter().sum()).collect()
    }

    /// S0: sum of all weights.
    pub fn s0(&self) -> f64 {
        self.entries().map(|(_, _, w)| w).sum()
    }

    /// S1: half the sum over ordered pairs of `(w_ij + w_ji)²`.
    pub fn s1(&self) -> f64 {
        let mut total = 0.0;
        for (i, j, w) in self.entries() {
            let back = self.weight(j, i);
            total += (w + back).powi(2);
            if back == 0.0 {
                // the (j, i) term has no stored entry of its own
                total += w * w;
            }
        }
        total / 2.0
    }

    /// S2: sum over rows of `(row_sum_i + col_sum_i)²`.
    pub fn s2(&self) -> f64 {
        let mut col_sums = vec![0.0; self.n()];
        for (_, j, w) in self.entries() {
            col_sums[j] += w;
        }
        self.row_sums()
            .iter()
            .zip(&col_sums)
            .map(|(r, c)| (r + c).powi(2))
            .sum()
    }

    /// `Σ_ij w_ij a_i b_j`.
    pub fn cross_product(&self, a: &[f64], b: &[f64]) -> f64 {
        self.entries().map(|(i, j, w)| w * a[i] * b[j]).sum()
    }
}
