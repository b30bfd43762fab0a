//! Compensated summation.
//!
//! Probability rows in a regularized graph can hold thousands of small
//! contributions; Neumaier's variant of Kahan summation keeps the row total
//! accurate enough for the 1e-9 normalization tolerance.

/// Running Neumaier-compensated sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NeumaierSum {
    sum: f64,
    compensation: f64,
}

impl NeumaierSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    pub fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated sum of an iterator of values.
pub fn compensated_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut acc = NeumaierSum::new();
    for v in values {
        acc.add(v);
    }
    acc.total()
}

/// Arithmetic mean using compensated summation. `None` when empty.
pub fn compensated_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut acc = NeumaierSum::new();
    let mut count = 0usize;
    for v in values {
        acc.add(v);
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(acc.total() / count as f64)
    }
}
