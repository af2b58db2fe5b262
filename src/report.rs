//! Plain-text report printed for each processed image.

use std::io::{self, Write};
use std::path::Path;

const SEPARATOR_WIDTH: usize = 50;

/// Name shown in the header: the file name, or the whole path if it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Writes the header, one line per kept text and the dash separator.
///
/// The text block is always newline-terminated, so an empty result
/// still leaves a blank line before the separator.
pub fn write_report<W: Write>(out: &mut W, path: &Path, lines: &[String]) -> io::Result<()> {
    writeln!(out, "Results for {}:", display_name(path))?;
    writeln!(out, "{}", lines.join("\n"))?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    Ok(())
}
