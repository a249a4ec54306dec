//! Contamination Threshold
//!
//! Ngưỡng quyết định anomaly: offset = percentile của training scores
//! tại 100 × contamination, nên khoảng `contamination` mẫu training bị coi là outlier.

use super::error::ModelError;

/// Upper bound accepted for contamination
pub const MAX_CONTAMINATION: f64 = 0.5;

/// Contamination must be in (0, 0.5]
pub fn validate_contamination(contamination: f64) -> Result<(), ModelError> {
    if contamination.is_finite() && contamination > 0.0 && contamination <= MAX_CONTAMINATION {
        Ok(())
    } else {
        Err(ModelError::InvalidContamination(contamination))
    }
}

/// Offset on `score_samples` for a given contamination
pub fn offset_for(training_scores: &[f64], contamination: f64) -> f64 {
    percentile(training_scores, 100.0 * contamination)
}

/// Linear-interpolated percentile (q in [0, 100]); 0.0 for empty input
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_contamination() {
        assert!(validate_contamination(0.05).is_ok());
        assert!(validate_contamination(0.5).is_ok());
        assert!(validate_contamination(0.0).is_err());
        assert!(validate_contamination(0.51).is_err());
        assert!(validate_contamination(f64::NAN).is_err());
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
        // rank 0.4 between 1.0 and 2.0
        assert!((percentile(&values, 10.0) - 1.4).abs() < 1e-12);
        assert_eq!(percentile(&[], 10.0), 0.0);
    }
}
