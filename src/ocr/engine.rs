use image::DynamicImage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tempfile::tempdir;

use super::detection::{Detection, Region};
use super::language::resolve_languages;
use super::preprocess::{to_grayscale, upscale_small};
use super::setup::{ensure_tesseract, TesseractPaths};
use crate::error::{OcrError, Result};
use crate::log;

/// Page segmentation mode 3: fully automatic, no orientation detection.
pub const DEFAULT_PSM: u8 = 3;

/// Images shorter than this are upscaled before recognition.
pub const DEFAULT_MIN_HEIGHT: u32 = 32;

/// Settings for building an [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub languages: Vec<String>,
    pub page_segmentation_mode: u8,
    pub min_height: u32,
    pub tesseract_path: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            languages: vec!["es".to_string()],
            page_segmentation_mode: DEFAULT_PSM,
            min_height: DEFAULT_MIN_HEIGHT,
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

/// Tesseract-backed recognizer bound to a fixed set of languages.
#[derive(Debug)]
pub struct OcrEngine {
    paths: TesseractPaths,
    languages: Vec<&'static str>,
    page_segmentation_mode: u8,
    min_height: u32,
}

impl OcrEngine {
    /// Builds an engine for `languages` with default settings.
    pub fn new(languages: &[String]) -> Result<Self> {
        Self::with_options(EngineOptions {
            languages: languages.to_vec(),
            ..EngineOptions::default()
        })
    }

    /// Validates the languages, locates Tesseract and makes sure every
    /// model is available (downloading on first use).
    pub fn with_options(options: EngineOptions) -> Result<Self> {
        let languages = resolve_languages(&options.languages)?;
        log(&format!("Initializing OCR engine for: {}", languages.join("+")));

        let paths = ensure_tesseract(
            options.tesseract_path.as_deref(),
            options.tessdata_dir.as_deref(),
            &languages,
        )?;

        Ok(Self {
            paths,
            languages,
            page_segmentation_mode: options.page_segmentation_mode,
            min_height: options.min_height,
        })
    }

    pub fn languages(&self) -> &[&'static str] {
        &self.languages
    }

    /// Recognizes the text lines of the image at `path`, in reading order.
    ///
    /// A missing, unreadable or undecodable file is an error, never an
    /// empty result.
    pub fn recognize(&self, path: &Path) -> Result<Vec<Detection>> {
        let started = Instant::now();
        let img = load_image(path)?;

        let gray = to_grayscale(&img);
        let (gray, factor) = upscale_small(gray, self.min_height);
        if factor > 1.0 {
            log(&format!("Upscaled {} by {:.2}x", path.display(), factor));
        }

        // Input PNG and Tesseract's <base>.tsv share one scratch dir, removed on every path
        let work_dir = tempdir()?;
        let input_path = work_dir.path().join("input.png");
        gray.save(&input_path)
            .map_err(|e| OcrError::Io(std::io::Error::other(e)))?;
        let output_base = work_dir.path().join("output");

        let output = Command::new(&self.paths.executable)
            .arg(&input_path)
            .arg(&output_base)
            .arg("--tessdata-dir")
            .arg(&self.paths.tessdata)
            .arg("-l")
            .arg(self.languages.join("+"))
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .arg("tsv")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::TesseractFailed(stderr.trim().to_string()));
        }

        let tsv_content = fs::read_to_string(output_base.with_extension("tsv"))
            .map_err(|e| OcrError::TesseractOutput(e.to_string()))?;

        let detections = parse_tsv_output(&tsv_content, factor)?;

        log(&format!(
            "Recognized {} lines in {} ({} ms)",
            detections.len(),
            path.display(),
            started.elapsed().as_millis()
        ));

        Ok(detections)
    }
}

/// Sorts a failed file access into not-found and read errors.
fn image_io_error(path: &Path, source: std::io::Error) -> OcrError {
    match source.kind() {
        ErrorKind::NotFound => OcrError::ImageNotFound(path.to_path_buf()),
        _ => OcrError::ImageRead {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Checks that `path` can be looked up, without reading it.
pub fn ensure_image_accessible(path: &Path) -> Result<()> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|source| image_io_error(path, source))
}

/// Reads and decodes an image, sorting failures into not-found, read and decode errors.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let bytes = fs::read(path).map_err(|source| image_io_error(path, source))?;

    image::load_from_memory(&bytes).map_err(|source| OcrError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Words collected for the line currently being parsed.
struct LineAccumulator {
    key: (i32, i32, i32, i32),
    words: Vec<String>,
    conf_sum: f32,
    region: Region,
}

impl LineAccumulator {
    fn finish(self, factor: f32) -> Detection {
        let avg_conf = self.conf_sum / self.words.len() as f32;
        Detection::new(
            self.region.scaled_down(factor),
            self.words.join(" "),
            avg_conf / 100.0,
        )
    }
}

/// Parses Tesseract TSV output into one detection per text line.
///
/// Word rows are grouped by (page, block, paragraph, line). Confidences
/// are averaged per line and rescaled from 0-100 to [0, 1]. Regions are
/// divided by `factor` to undo any upscaling.
pub fn parse_tsv_output(tsv: &str, factor: f32) -> Result<Vec<Detection>> {
    let mut rows = tsv.lines();
    match rows.next() {
        Some(header) if header.starts_with("level") => {}
        _ => {
            return Err(OcrError::TesseractOutput(
                "missing TSV header".to_string(),
            ))
        }
    }

    let mut detections: Vec<Detection> = Vec::new();
    let mut current: Option<LineAccumulator> = None;

    for row in rows {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        // Level 5 = word
        if level != 5 {
            continue;
        }

        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();
        if conf < 0.0 || text.is_empty() {
            continue;
        }

        let num = |i: usize| fields[i].parse::<i32>().unwrap_or(-1);
        let key = (num(1), num(2), num(3), num(4));

        let coord = |i: usize| fields[i].parse::<u32>().unwrap_or(0);
        let region = Region::from_ltwh(coord(6), coord(7), coord(8), coord(9));

        if let Some(line) = current.as_mut().filter(|line| line.key == key) {
            line.words.push(text.to_string());
            line.conf_sum += conf;
            line.region = line.region.union(&region);
            continue;
        }

        if let Some(done) = current.take() {
            detections.push(done.finish(factor));
        }
        current = Some(LineAccumulator {
            key,
            words: vec![text.to_string()],
            conf_sum: conf,
            region,
        });
    }

    // Don't forget the last line
    if let Some(done) = current {
        detections.push(done.finish(factor));
    }

    Ok(detections)
}
