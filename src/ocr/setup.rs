use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::{OcrError, Result};
use crate::log;
use crate::paths::get_local_tessdata_dir;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Common install locations of the Tesseract executable.
const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

/// Common tessdata directories shipped by system packages.
const SYSTEM_TESSDATA: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

#[derive(Debug, Clone)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

/// Ensures Tesseract and the models for `codes` are usable.
///
/// Models that cannot be found anywhere are downloaded into the
/// per-user data directory.
pub fn ensure_tesseract(
    tesseract_path: Option<&Path>,
    tessdata_dir: Option<&Path>,
    codes: &[&str],
) -> Result<TesseractPaths> {
    let executable = find_tesseract_executable(tesseract_path)?;
    log(&format!("Tesseract executable: {}", executable.display()));

    let tessdata = match tessdata_dir {
        Some(dir) => dir.to_path_buf(),
        None => find_tessdata_dir(codes).unwrap_or_else(get_local_tessdata_dir),
    };

    ensure_tessdata(&tessdata, codes)?;
    log(&format!("Tesseract ready, models at: {}", tessdata.display()));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Finds the Tesseract executable: configured path, then PATH, then common locations.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        log(&format!(
            "Configured tesseract_path {} does not exist, searching elsewhere",
            path.display()
        ));
    }

    // Check PATH
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or(OcrError::TesseractNotFound)
}

/// Returns the first known tessdata directory holding every model in `codes`.
pub fn find_tessdata_dir(codes: &[&str]) -> Option<PathBuf> {
    tessdata_candidates()
        .into_iter()
        .find(|dir| codes.iter().all(|code| traineddata_path(dir, code).exists()))
}

fn tessdata_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![get_local_tessdata_dir()];

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    candidates.extend(SYSTEM_TESSDATA.iter().map(PathBuf::from));
    candidates
}

fn traineddata_path(dir: &Path, code: &str) -> PathBuf {
    dir.join(format!("{}.traineddata", code))
}

/// Makes sure `<code>.traineddata` exists in `tessdata_dir` for every code.
///
/// Copies a model from a system tessdata directory when one is installed,
/// otherwise downloads it.
pub fn ensure_tessdata(tessdata_dir: &Path, codes: &[&str]) -> Result<()> {
    let missing: Vec<&str> = codes
        .iter()
        .copied()
        .filter(|code| !traineddata_path(tessdata_dir, code).exists())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(tessdata_dir)?;

    for code in missing {
        let target = traineddata_path(tessdata_dir, code);

        if let Some(installed) = tessdata_candidates()
            .into_iter()
            .map(|dir| traineddata_path(&dir, code))
            .find(|p| p.exists() && *p != target)
        {
            log(&format!(
                "Copying {}.traineddata from: {}",
                code,
                installed.display()
            ));
            fs::copy(&installed, &target)?;
            continue;
        }

        download_tessdata(tessdata_dir, code)?;
    }

    Ok(())
}

/// Downloads one trained model from the tessdata repository.
fn download_tessdata(tessdata_dir: &Path, code: &str) -> Result<()> {
    let url = format!("{}/{}.traineddata", TESSDATA_REPO, code);
    let download_error = |reason: String| OcrError::TessdataDownload {
        code: code.to_string(),
        reason,
    };

    log(&format!("Downloading {}.traineddata...", code));

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .build()
        .map_err(|e| download_error(e.to_string()))?;

    let response = client
        .get(&url)
        .header("User-Agent", "lectura-ocr")
        .send()
        .map_err(|e| download_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_error(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .map_err(|e| download_error(e.to_string()))?;

    // Write next to the target so an interrupted download never leaves a truncated model
    let mut partial = NamedTempFile::new_in(tessdata_dir)?;
    partial.write_all(&bytes)?;
    partial
        .persist(traineddata_path(tessdata_dir, code))
        .map_err(|e| e.error)?;

    log(&format!(
        "Downloaded {}.traineddata ({} bytes)",
        code,
        bytes.len()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_tessdata_present_is_noop() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("spa.traineddata"), b"model").unwrap();

        ensure_tessdata(dir.path(), &["spa"]).unwrap();

        let content = fs::read(dir.path().join("spa.traineddata")).unwrap();
        assert_eq!(content, b"model");
    }

    #[test]
    fn test_configured_executable_is_used() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("tesseract");
        fs::write(&exe, b"").unwrap();

        assert_eq!(find_tesseract_executable(Some(&exe)).unwrap(), exe);
    }

    #[test]
    fn test_traineddata_path() {
        let path = traineddata_path(Path::new("/data"), "chi_sim");
        assert_eq!(path, PathBuf::from("/data/chi_sim.traineddata"));
    }
}
