//! Summary statistics over one latency run.

/// Average, minimum and maximum of a sample run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl LatencyStats {
    /// `None` for an empty run.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let (min, max, sum) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &s| (min.min(s), max.max(s), sum + s),
        );
        // Rounding in the division can push a constant run a hair outside
        // its own bounds.
        let avg = (sum / samples.len() as f64).clamp(min, max);

        Some(Self {
            avg,
            min,
            max,
            count: samples.len(),
        })
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}
