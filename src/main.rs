//! Lectura OCR
//!
//! Reads the text of scanned pages with Tesseract (Spanish by default),
//! keeps only the lines recognized with enough confidence and prints them.

mod config;
mod error;
mod ocr;
mod paths;
mod report;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use ocr::engine::ensure_image_accessible;
use ocr::language::split_language_list;
use ocr::{read_confident_lines, validate_threshold, OcrEngine};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Images to read. Defaults to image_path from config.json
    images: Vec<PathBuf>,

    /// Language code, repeatable or joined with '+' (es, en, spa+eng...). DEFAULT: es
    #[arg(short, long = "lang")]
    langs: Vec<String>,

    /// Minimum confidence (exclusive) for a line to be printed. DEFAULT: 0.7
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Path to a config file instead of config.json next to the executable
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Logs a message to stderr and the log file with timestamp.
///
/// Stdout carries only the results.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("lectura_ocr.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    let args = Args::parse();

    if let Err(e) = paths::ensure_directories() {
        eprintln!("Warning: could not create logs directory: {}", e);
    }

    let stdout = io::stdout();
    run(args, &mut stdout.lock())
}

/// Settings for one run after merging the command line over the config.
#[derive(Debug)]
struct RunPlan {
    config: config::OcrConfig,
    threshold: f32,
    images: Vec<PathBuf>,
}

/// Loads the config and applies command line overrides.
fn plan_run(args: Args) -> Result<RunPlan> {
    let mut config = config::load_config(args.config.as_deref())?;

    // Command line wins over config.json
    if !args.langs.is_empty() {
        config.languages = args
            .langs
            .iter()
            .flat_map(|list| split_language_list(list))
            .collect();
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    let threshold = validate_threshold(config.threshold)?;

    let images: Vec<PathBuf> = if args.images.is_empty() {
        config.image_path.clone().into_iter().collect()
    } else {
        args.images
    };
    if images.is_empty() {
        anyhow::bail!("No image given. Pass an image path or set image_path in config.json");
    }

    Ok(RunPlan {
        config,
        threshold,
        images,
    })
}

/// Reads every image and writes its report to `out`, in argument order.
fn run<W: Write>(args: Args, out: &mut W) -> Result<()> {
    let plan = plan_run(args)?;

    // Fail on a mistyped path before any model gets loaded or anything is printed
    for image_path in &plan.images {
        ensure_image_accessible(image_path)?;
    }

    let engine = OcrEngine::with_options(plan.config.engine_options())
        .context("Failed to initialize OCR engine")?;
    log(&format!("Engine ready ({})", engine.languages().join("+")));

    for image_path in &plan.images {
        let lines = read_confident_lines(&engine, image_path, plan.threshold)?;

        report::write_report(out, image_path, &lines)?;
        out.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["lectura-ocr", "pagina.jpg"]).unwrap();
        assert_eq!(args.images, vec![PathBuf::from("pagina.jpg")]);
        assert!(args.langs.is_empty());
        assert!(args.threshold.is_none());
    }

    #[test]
    fn test_args_languages_and_threshold() {
        let args = Args::try_parse_from([
            "lectura-ocr", "-l", "es+en", "--lang", "fr", "-t", "0.5", "a.jpg", "b.png",
        ])
        .unwrap();
        assert_eq!(args.langs, vec!["es+en", "fr"]);
        assert_eq!(args.threshold, Some(0.5));
        assert_eq!(args.images.len(), 2);
    }

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn args_from(items: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lectura-ocr").chain(items.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            r#"{ "threshold": 0.9, "languages": ["fr"], "image_path": "config.jpg" }"#,
        );
        let config_arg = config_path.to_string_lossy().to_string();

        let plan = plan_run(args_from(&["-c", &config_arg, "-t", "0.5", "-l", "es+en", "a.jpg"]))
            .unwrap();

        assert_eq!(plan.threshold, 0.5);
        assert_eq!(plan.config.languages, vec!["es", "en"]);
        assert_eq!(plan.images, vec![PathBuf::from("a.jpg")]);
    }

    #[test]
    fn test_config_values_used_without_flags() {
        let dir = tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            r#"{ "threshold": 0.9, "languages": ["fr"], "image_path": "config.jpg" }"#,
        );
        let config_arg = config_path.to_string_lossy().to_string();

        let plan = plan_run(args_from(&["-c", &config_arg])).unwrap();

        assert_eq!(plan.threshold, 0.9);
        assert_eq!(plan.config.languages, vec!["fr"]);
        assert_eq!(plan.images, vec![PathBuf::from("config.jpg")]);
    }

    #[test]
    fn test_no_image_given_fails() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path(), "{}");
        let config_arg = config_path.to_string_lossy().to_string();

        assert!(plan_run(args_from(&["-c", &config_arg])).is_err());
    }

    #[test]
    fn test_out_of_range_threshold_fails() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path(), "{}");
        let config_arg = config_path.to_string_lossy().to_string();

        let err = plan_run(args_from(&["-c", &config_arg, "-t", "1.5", "a.jpg"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OcrError>(),
            Some(OcrError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_missing_image_fails_before_output() {
        let dir = tempdir().unwrap();
        let config_path = write_config(dir.path(), "{}");
        let config_arg = config_path.to_string_lossy().to_string();

        let existing = dir.path().join("existing.png");
        image::GrayImage::new(8, 8).save(&existing).unwrap();
        let missing = dir.path().join("missing.jpg");
        let existing_arg = existing.to_string_lossy().to_string();
        let missing_arg = missing.to_string_lossy().to_string();

        let mut out: Vec<u8> = Vec::new();
        let err = run(
            args_from(&["-c", &config_arg, &existing_arg, &missing_arg]),
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OcrError>(),
            Some(OcrError::ImageNotFound(p)) if *p == missing
        ));
        assert!(out.is_empty());
    }
}
