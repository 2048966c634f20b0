//! Summary Statistics

/// Population mean and standard deviation of a value series
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std_dev: f64,
}

impl Summary {
    /// Compute mean and population standard deviation.
    ///
    /// Empty input yields zeros rather than NaN.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let mut m2 = 0.0;
        for &v in values {
            let d = v - mean;
            m2 += d * d;
        }
        let std_dev = (m2 / n).sqrt();

        Self { mean, std_dev }
    }

    /// Compute over every element of a row-major matrix.
    pub fn compute_2d(rows: &[Vec<f64>]) -> Self {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::compute(&flat)
    }
}
