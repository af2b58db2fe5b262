//! Configuration for the OCR run.
//!
//! Loaded from config.json next to the executable (or the file given with
//! `--config`). Every field has a default, so a partial file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::engine::{EngineOptions, DEFAULT_MIN_HEIGHT, DEFAULT_PSM};
use crate::ocr::filter::DEFAULT_THRESHOLD;
use crate::paths;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language codes for the engine, e.g. ["es"] or ["es", "en"]
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Lines must score strictly above this confidence (0.0-1.0) to be printed
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Image processed when none is given on the command line
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    /// Tesseract --psm value
    #[serde(default = "default_psm")]
    pub page_segmentation_mode: u8,
    /// Images shorter than this (pixels) are upscaled; 0 disables
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    #[serde(default)]
    pub tesseract_path: Option<PathBuf>,
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
}

fn default_languages() -> Vec<String> {
    vec!["es".to_string()]
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_psm() -> u8 {
    DEFAULT_PSM
}

fn default_min_height() -> u32 {
    DEFAULT_MIN_HEIGHT
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            threshold: default_threshold(),
            image_path: None,
            page_segmentation_mode: default_psm(),
            min_height: default_min_height(),
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

impl OcrConfig {
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            languages: self.languages.clone(),
            page_segmentation_mode: self.page_segmentation_mode,
            min_height: self.min_height,
            tesseract_path: self.tesseract_path.clone(),
            tessdata_dir: self.tessdata_dir.clone(),
        }
    }
}

/// Loads configuration.
///
/// An explicit path must exist and parse. The implicit config.json next
/// to the executable is optional and falls back to defaults when broken.
pub fn load_config(explicit: Option<&Path>) -> Result<OcrConfig> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        crate::log(&format!("Config loaded from {}", path.display()));
        return Ok(config);
    }

    let config_path = paths::get_default_config_path();
    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if !config_path.exists() {
        crate::log("config.json not found. Using default config.");
        return Ok(OcrConfig::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                crate::log("Config loaded from config.json");
                Ok(config)
            }
            Err(e) => {
                crate::log(&format!(
                    "Failed to parse config.json: {}. Using defaults.",
                    e
                ));
                Ok(OcrConfig::default())
            }
        },
        Err(e) => {
            crate::log(&format!(
                "Failed to read config.json: {}. Using defaults.",
                e
            ));
            Ok(OcrConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.languages, vec!["es"]);
        assert_eq!(config.threshold, 0.7);
        assert!(config.image_path.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threshold": 0.5, "image_path": "scan.jpg" }}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.image_path, Some(PathBuf::from("scan.jpg")));
        assert_eq!(config.languages, vec!["es"]);
        assert_eq!(config.page_segmentation_mode, DEFAULT_PSM);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_explicit_malformed_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_engine_options() {
        let config = OcrConfig {
            languages: vec!["es".to_string(), "en".to_string()],
            min_height: 0,
            ..OcrConfig::default()
        };
        let options = config.engine_options();
        assert_eq!(options.languages, vec!["es", "en"]);
        assert_eq!(options.min_height, 0);
    }
}
