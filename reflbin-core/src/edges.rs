//! Q bin edges.

use crate::error::{Error, Result};

/// Strictly increasing bin boundaries.
///
/// Bin `k` covers `(edges[k], edges[k + 1]]`. A leading `-inf` or trailing
/// `+inf` edge makes the outer bin a catch-all sentinel which collects
/// out-of-range points but never produces output.
#[derive(Clone, Debug, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Validates and wraps an edge array.
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::InvalidBinEdges(format!(
                "need at least two edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| e.is_nan()) {
            return Err(Error::InvalidBinEdges("edges contain NaN".to_string()));
        }
        if let Some(k) = edges.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(Error::InvalidBinEdges(format!(
                "edges not strictly increasing at index {}: {} >= {}",
                k + 1,
                edges[k],
                edges[k + 1]
            )));
        }
        Ok(Self { edges })
    }

    /// Edges at the midpoints between `centers`.
    ///
    /// The outer edges sit as far beyond the first and last center as the
    /// nearest midpoint is inside it. With `extended`, `-inf` and `+inf`
    /// are added so every finite Q lands in some bin.
    pub fn from_centers(centers: &[f64], extended: bool) -> Result<Self> {
        if centers.len() < 2 {
            return Err(Error::InsufficientBinCenters(centers.len()));
        }
        let midpoints: Vec<f64> = centers
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect();
        let first = midpoints[0];
        let last = midpoints[midpoints.len() - 1];
        let left = 2.0 * centers[0] - first;
        let right = 2.0 * centers[centers.len() - 1] - last;

        let mut edges = Vec::with_capacity(centers.len() + 3);
        if extended {
            edges.push(f64::NEG_INFINITY);
        }
        edges.push(left);
        edges.extend_from_slice(&midpoints);
        edges.push(right);
        if extended {
            edges.push(f64::INFINITY);
        }
        Self::new(edges)
    }

    /// Borrows the raw edge values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins, sentinels included.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin holding `q`, or `None` if `q` lies outside every bin or is NaN.
    #[must_use]
    pub fn bin_index(&self, q: f64) -> Option<usize> {
        if q.is_nan() {
            return None;
        }
        let below = self.edges.partition_point(|&edge| edge < q);
        if below == 0 || below > self.bin_count() {
            None
        } else {
            Some(below - 1)
        }
    }

    /// True for the catch-all bins bounded by an infinite edge.
    #[must_use]
    pub fn is_sentinel(&self, bin: usize) -> bool {
        self.edges[bin] == f64::NEG_INFINITY || self.edges[bin + 1] == f64::INFINITY
    }
}

/// Evenly spaced bin centers from `min` to `max` inclusive.
///
/// The last center is dropped if it would overshoot `max` by more than
/// half a step.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn linear_centers(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || max < min {
        return Vec::new();
    }
    let n = ((max - min) / step + 0.5).floor() as usize + 1;
    (0..n).map(|k| min + k as f64 * step).collect()
}
