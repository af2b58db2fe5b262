pub mod setup;
pub mod language;
pub mod preprocess;
pub mod detection;
pub mod engine;
pub mod filter;

pub use engine::OcrEngine;
pub use filter::{filter_by_confidence, validate_threshold};

use std::path::Path;

use crate::error::Result;
use crate::log;

/// High-level function: image file → text lines above `threshold`.
pub fn read_confident_lines(engine: &OcrEngine, path: &Path, threshold: f32) -> Result<Vec<String>> {
    let detections = engine.recognize(path)?;
    let lines = filter_by_confidence(&detections, threshold);

    for dropped in detections.iter().filter(|d| d.confidence <= threshold) {
        log(&format!("Dropped {}", dropped.describe()));
    }

    log(&format!(
        "Kept {} of {} lines above confidence {:.2}",
        lines.len(),
        detections.len(),
        threshold
    ));

    Ok(lines)
}
