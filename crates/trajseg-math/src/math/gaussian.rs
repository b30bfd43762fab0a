//! Gaussian fitting and log-likelihood primitives.
//!
//! Segments of a dissimilarity signal are modeled as independent draws from a
//! normal distribution whose mean and *population* standard deviation are
//! estimated from the segment itself. The negative log-likelihood of such a
//! fit has a closed form:
//!
//! ```text
//! -Σ ln N(x_i; μ, σ) = n·ln(σ·√(2π)) + Σ (x_i - μ)² / (2σ²)
//!                    = n·ln(σ·√(2π)) + n/2          (σ² = Σ (x_i - μ)² / n)
//! ```
//!
//! A zero standard deviation is a degenerate (constant) segment; its cost is
//! defined as 0 rather than -∞.

use serde::{Deserialize, Serialize};

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)

/// Mean and population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianFit {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl GaussianFit {
    /// Negative log-likelihood of `count` points under this fit, using the
    /// closed form that holds when the fit was estimated from those points.
    ///
    /// Returns 0 for a zero standard deviation.
    pub fn self_negative_log_likelihood(&self) -> f64 {
        gaussian_self_nll(self.count, self.std)
    }
}

/// Fit a Gaussian (mean, population std) to `values`.
///
/// Returns `None` for an empty slice.
pub fn fit_gaussian(values: &[f64]) -> Option<GaussianFit> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some(GaussianFit {
        mean,
        std: (ss / n).sqrt(),
        count: values.len(),
    })
}

/// Natural log of the normal density N(x; mean, std).
pub fn ln_normal_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let z = x - mean;
    -(std.ln() + LOG_SQRT_2PI) - (z * z) / (2.0 * std * std)
}

/// Closed-form negative log-likelihood of `count` points under the Gaussian
/// fitted to them.
///
/// Zero standard deviation yields 0.
pub fn gaussian_self_nll(count: usize, std: f64) -> f64 {
    if std == 0.0 {
        return 0.0;
    }
    let n = count as f64;
    n * (std.ln() + LOG_SQRT_2PI) + 0.5 * n
}

/// Online mean/variance accumulator (Welford).
///
/// Constant input keeps `m2` at exactly zero, so a constant span is always
/// recognised as degenerate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (divides by n). Zero when empty.
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).max(0.0)
    }

    pub fn population_std(&self) -> f64 {
        self.population_variance().sqrt()
    }

    pub fn fit(&self) -> Option<GaussianFit> {
        if self.count == 0 {
            return None;
        }
        Some(GaussianFit {
            mean: self.mean,
            std: self.population_std(),
            count: self.count,
        })
    }

    /// Negative log-likelihood of the observations seen so far.
    pub fn negative_log_likelihood(&self) -> f64 {
        gaussian_self_nll(self.count, self.population_std())
    }
}
