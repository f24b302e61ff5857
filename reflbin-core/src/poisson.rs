//! Poisson-consistent averaging of normalized intensities.
//!
//! A normalized rate `y ± dy` is turned back into effective counts and an
//! effective exposure (monitor counts or seconds). Points are combined by
//! summing counts and exposures, then dividing, which keeps the propagated
//! uncertainty consistent with counting statistics.
//!
//! The merge and rebin engines both go through [`PoissonAccumulator`], so the
//! same points added in the same order give bit-identical results.

use crate::intent::NormBasis;

/// Running sums for one group of points.
#[derive(Clone, Copy, Debug)]
pub struct PoissonAccumulator {
    basis: NormBasis,
    points: usize,
    first: (f64, f64),
    counts: f64,
    monitors: f64,
    sum_y: f64,
    sum_dy_sq: f64,
}

impl PoissonAccumulator {
    /// Creates an empty accumulator for the given normalization.
    #[must_use]
    pub fn new(basis: NormBasis) -> Self {
        Self {
            basis,
            points: 0,
            first: (0.0, 0.0),
            counts: 0.0,
            monitors: 0.0,
            sum_y: 0.0,
            sum_dy_sq: 0.0,
        }
    }

    /// Number of points added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points
    }

    /// True if no points were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points == 0
    }

    /// Adds one point.
    ///
    /// Negative rates are clamped to zero and zero uncertainty is replaced
    /// by one before the effective exposure is computed.
    pub fn add(&mut self, y: f64, dy: f64) {
        if self.points == 0 {
            self.first = (y, dy);
        }
        self.points += 1;

        if self.basis == NormBasis::None {
            self.sum_y += y;
            self.sum_dy_sq += dy * dy;
            return;
        }

        let y = y.max(0.0);
        let dy = if dy == 0.0 { 1.0 } else { dy };
        let monitor = if y == 0.0 {
            1.0 / dy
        } else if self.basis == NormBasis::Monitor {
            y * (y + 1.0) / (dy * dy)
        } else {
            y / (dy * dy)
        };
        self.counts += y * monitor;
        self.monitors += monitor;
    }

    /// Combined `(v, dv)` for the points added.
    ///
    /// A single non-negative point is returned unchanged. Otherwise the rate
    /// is `Σcounts/Σmonitor`, with uncertainty `v·sqrt(1/Σcounts + 1/Σmonitor)`
    /// for monitor normalization (`sqrt(1/Σmonitor)` at zero rate) and
    /// `v·sqrt(1/Σmonitor)` for time normalization.
    ///
    /// An empty accumulator uses an exposure of one, giving `(0, 1)` for
    /// monitor normalization, `(0, 0)` for time and [`NormBasis::None`].
    #[must_use]
    pub fn finish(&self) -> (f64, f64) {
        if self.basis == NormBasis::None {
            return (self.sum_y, self.sum_dy_sq.sqrt());
        }

        let (y, dy) = self.first;
        if self.points == 1 && y >= 0.0 && dy > 0.0 {
            return (y, dy);
        }

        let monitors = if self.monitors == 0.0 { 1.0 } else { self.monitors };
        let bar_y = self.counts / monitors;
        let bar_dy = match self.basis {
            NormBasis::Time => bar_y * (1.0 / monitors).sqrt(),
            _ if bar_y == 0.0 => (1.0 / monitors).sqrt(),
            _ => bar_y * (1.0 / self.counts + 1.0 / monitors).sqrt(),
        };
        (bar_y, bar_dy)
    }
}

/// Combines intensities `y ± dy` into a single `(v, dv)`.
///
/// For [`NormBasis::None`] the values are summed and the uncertainties added
/// in quadrature. For monitor and time normalization the values are averaged
/// as counts over exposure.
///
/// # Panics
///
/// Panics if `y` and `dy` differ in length.
#[must_use]
pub fn poisson_average(y: &[f64], dy: &[f64], basis: NormBasis) -> (f64, f64) {
    assert_eq!(y.len(), dy.len(), "intensity and uncertainty lengths differ");
    let mut acc = PoissonAccumulator::new(basis);
    for (&value, &error) in y.iter().zip(dy) {
        acc.add(value, error);
    }
    acc.finish()
}
