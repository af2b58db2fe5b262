use super::detection::Detection;
use crate::error::{OcrError, Result};

/// Default confidence a detection must exceed to be kept.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Keeps the text of detections whose confidence is strictly above `threshold`.
///
/// Order follows the input. An empty result is not an error.
pub fn filter_by_confidence(detections: &[Detection], threshold: f32) -> Vec<String> {
    detections
        .iter()
        .filter(|d| d.confidence > threshold)
        .map(|d| d.text.clone())
        .collect()
}

/// Rejects thresholds outside [0, 1] (NaN included).
pub fn validate_threshold(threshold: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(OcrError::InvalidThreshold(threshold))
    }
}
