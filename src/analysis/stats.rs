use ordered_float::OrderedFloat;

/// Decimal places of every number in an [`crate::AnomalyResult`].
pub(crate) const RESULT_DECIMALS: i32 = 2;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Summary statistics of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SampleStats {
    pub count: usize,
    pub mean: f64,
    /// Bessel-corrected (n - 1); 0 when there is a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleStats {
    pub(crate) fn from_values(values: &[f64]) -> Option<Self> {
        let count = values.len();
        let min = values.iter().copied().map(OrderedFloat).min()?.0;
        let max = values.iter().copied().map(OrderedFloat).max()?.0;

        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squared / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            std,
            min,
            max,
        })
    }
}

/// Median of `values`; the mean of the two middle values for an even count.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2].0),
        _ => Some((sorted[n / 2 - 1].0 + sorted[n / 2].0) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-1.235_01, 2), -1.24);
        assert_eq!(round_to(40.0, 2), 40.0);
    }

    #[test]
    fn test_sample_stats() {
        let stats = SampleStats::from_values(&[14.0, 9.0, 9.0, 9.0, 9.0, 10.0]).unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.mean, 10.0);
        assert_eq!(stats.std, 2.0);
        assert_eq!(stats.min, 9.0);
        assert_eq!(stats.max, 14.0);
    }

    #[test]
    fn test_single_value_has_zero_std() {
        let stats = SampleStats::from_values(&[-3.5]).unwrap();
        assert_eq!(stats.mean, -3.5);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, -3.5);
        assert_eq!(stats.max, -3.5);
    }

    #[test]
    fn test_empty_sample() {
        assert_eq!(SampleStats::from_values(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
    }
}
