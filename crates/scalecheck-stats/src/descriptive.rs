//! Sample statistics shared by the reliability and correlation engines.

/// Below this a variance is treated as zero.
pub const VARIANCE_EPSILON: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (n - 1 denominator).
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squares = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    Some(squares / (values.len() - 1) as f64)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Pearson correlation coefficient, clamped to [-1, 1].
///
/// `None` when the slices differ in length, hold fewer than two values, or
/// either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let n = (x.len() - 1) as f64;
    if sxx / n < VARIANCE_EPSILON || syy / n < VARIANCE_EPSILON {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn variance_uses_n_minus_one() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(mean(&values), Some(3.0));
        assert!((sample_variance(&values).unwrap() - 2.5).abs() < TOLERANCE);
        assert!((sample_std_dev(&values).unwrap() - 2.5_f64.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn variance_needs_two_values() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_variance(&[4.0]), None);
    }

    #[test]
    fn pearson_of_perfectly_aligned_series() {
        let up = [1.0, 2.0, 3.0, 4.0, 5.0];
        let down = [5.0, 4.0, 3.0, 2.0, 1.0];

        assert!((pearson(&up, &up).unwrap() - 1.0).abs() < TOLERANCE);
        assert!((pearson(&up, &down).unwrap() + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn pearson_matches_hand_computation() {
        let x = [2.0, 4.0, 4.0, 5.0, 3.0];
        let y = [1.0, 3.0, 5.0, 4.0, 2.0];
        // sxy = 6.0, sxx = 5.2, syy = 10
        let expected = 6.0 / (5.2_f64 * 10.0).sqrt();

        assert!((pearson(&x, &y).unwrap() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn pearson_is_undefined_for_constant_series() {
        assert_eq!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }
}
