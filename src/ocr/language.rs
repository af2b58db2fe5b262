use regex::Regex;
use std::sync::OnceLock;

use crate::error::{OcrError, Result};

/// Short language codes mapped to the Tesseract model names.
///
/// Either side of a pair is accepted as input.
const LANGUAGES: &[(&str, &str)] = &[
    ("af", "afr"),
    ("ar", "ara"),
    ("bg", "bul"),
    ("ca", "cat"),
    ("ch_sim", "chi_sim"),
    ("ch_tra", "chi_tra"),
    ("cs", "ces"),
    ("cy", "cym"),
    ("da", "dan"),
    ("de", "deu"),
    ("el", "ell"),
    ("en", "eng"),
    ("es", "spa"),
    ("et", "est"),
    ("eu", "eus"),
    ("fi", "fin"),
    ("fr", "fra"),
    ("ga", "gle"),
    ("gl", "glg"),
    ("hi", "hin"),
    ("hr", "hrv"),
    ("hu", "hun"),
    ("id", "ind"),
    ("is", "isl"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("la", "lat"),
    ("lt", "lit"),
    ("lv", "lav"),
    ("nl", "nld"),
    ("no", "nor"),
    ("pl", "pol"),
    ("pt", "por"),
    ("ro", "ron"),
    ("ru", "rus"),
    ("sk", "slk"),
    ("sl", "slv"),
    ("sq", "sqi"),
    ("sv", "swe"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("vi", "vie"),
];

/// Separator between codes in a list, compiled once.
static LIST_SEPARATOR: OnceLock<Regex> = OnceLock::new();

/// Maps one language code to its Tesseract model name.
pub fn to_tesseract_code(code: &str) -> Result<&'static str> {
    let normalized = code.trim().to_ascii_lowercase();

    LANGUAGES
        .iter()
        .find(|(short, tess)| *short == normalized || *tess == normalized)
        .map(|(_, tess)| *tess)
        .ok_or_else(|| OcrError::UnsupportedLanguage(code.to_string()))
}

/// Resolves a list of codes into Tesseract model names.
///
/// Fails on an empty list or on the first unknown code. Duplicates are
/// dropped, first occurrence wins.
pub fn resolve_languages(codes: &[String]) -> Result<Vec<&'static str>> {
    if codes.is_empty() {
        return Err(OcrError::NoLanguages);
    }

    let mut resolved: Vec<&'static str> = Vec::with_capacity(codes.len());
    for code in codes {
        let tess = to_tesseract_code(code)?;
        if !resolved.contains(&tess) {
            resolved.push(tess);
        }
    }

    Ok(resolved)
}

/// Splits a user supplied list such as `"es+en"` or `"es, en"` into codes.
pub fn split_language_list(list: &str) -> Vec<String> {
    // Tesseract joins models with '+', people tend to use commas
    let separator = LIST_SEPARATOR
        .get_or_init(|| Regex::new(r"[\s,+]+").expect("separator pattern is valid"));
    separator
        .split(list)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_tesseract_codes() {
        assert_eq!(to_tesseract_code("es").unwrap(), "spa");
        assert_eq!(to_tesseract_code("spa").unwrap(), "spa");
        assert_eq!(to_tesseract_code(" EN ").unwrap(), "eng");
        assert_eq!(to_tesseract_code("ch_sim").unwrap(), "chi_sim");
    }

    #[test]
    fn test_unknown_code_is_config_error() {
        let err = to_tesseract_code("xx").unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedLanguage(ref c) if c == "xx"));
    }

    #[test]
    fn test_resolve_dedups_in_order() {
        let codes = vec!["es".to_string(), "en".to_string(), "spa".to_string()];
        assert_eq!(resolve_languages(&codes).unwrap(), vec!["spa", "eng"]);
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve_languages(&[]), Err(OcrError::NoLanguages)));
    }

    #[test]
    fn test_split_language_list() {
        assert_eq!(split_language_list("es+en"), vec!["es", "en"]);
        assert_eq!(split_language_list(" es, fr "), vec!["es", "fr"]);
        assert_eq!(split_language_list("es\teng+ca"), vec!["es", "eng", "ca"]);
        assert!(split_language_list("").is_empty());
        assert!(split_language_list(" + , ").is_empty());
    }
}
