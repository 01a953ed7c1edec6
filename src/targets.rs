//! Target string loading
//!
//! Turns the raw contents of the target-strings file into the ordered list of
//! strings rows are matched against.

use encoding_rs::Encoding;
use std::path::Path;

use crate::encoding::read_text;
use crate::error::Result;

/// Ordered, trimmed, non-empty match strings
///
/// Duplicates are kept; matching only asks whether *any* target applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    targets: Vec<String>,
}

impl TargetSet {
    /// Split `raw` into targets
    ///
    /// A non-empty `separator` is matched literally. An empty separator splits on
    /// `\n`, `\r\n` and `\r` alike.
    pub fn parse(raw: &str, separator: &str) -> Self {
        let targets = if separator.is_empty() {
            trimmed_pieces(raw.split(['\r', '\n']))
        } else {
            trimmed_pieces(raw.split(separator))
        };

        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.targets
    }
}

impl<S: Into<String>> FromIterator<S> for TargetSet {
    /// Builds a set from already-split strings, applying the same trimming rules
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let targets = iter
            .into_iter()
            .map(Into::into)
            .filter_map(|s: String| {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();

        Self { targets }
    }
}

fn trimmed_pieces<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<String> {
    pieces
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split raw text into target strings
pub fn load_targets(raw: &str, separator: &str) -> TargetSet {
    TargetSet::parse(raw, separator)
}

/// Read and split the target-strings file
///
/// Returns the raw text alongside the parsed set so callers can trace both.
pub fn load_targets_file(
    path: &Path,
    encoding: &'static Encoding,
    separator: &str,
) -> Result<(String, TargetSet)> {
    let raw = read_text(path, encoding)?;
    let targets = TargetSet::parse(&raw, separator);
    Ok((raw, targets))
}

/// Expand `\n`, `\r`, `\t` and `\\` escapes in a separator typed on the command line
pub fn unescape_separator(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_separator_drops_blank_lines() {
        let targets = load_targets("red\n\norange\n", "");
        assert_eq!(targets.as_slice(), ["red", "orange"]);
    }

    #[test]
    fn test_default_separator_mixed_line_endings() {
        let targets = load_targets("a\r\nb\rc\nd", "");
        assert_eq!(targets.as_slice(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_custom_separator_is_literal() {
        let targets = load_targets("red|.|orange|.| |.|lime", "|.|");
        assert_eq!(targets.as_slice(), ["red", "orange", "lime"]);

        // Regex metacharacters have no special meaning
        let targets = load_targets("a.b.c", ".");
        assert_eq!(targets.as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn test_custom_separator_keeps_newlines_inside_pieces() {
        let targets = load_targets("red fruit,\norange\n", ",");
        assert_eq!(targets.as_slice(), ["red fruit", "orange"]);
    }

    #[test]
    fn test_trims_and_keeps_duplicates_in_order() {
        let targets = load_targets("  orange \n\t red\t\norange\n", "");
        assert_eq!(targets.as_slice(), ["orange", "red", "orange"]);
    }

    #[test]
    fn test_never_yields_blank_targets() {
        let inputs = ["", " ", "\n\n\n", " \t \r\n \r", ",,, ,", "x, ,y,\t,"];
        for raw in inputs {
            for sep in ["", ",", "\n", " "] {
                let targets = load_targets(raw, sep);
                assert!(
                    targets.iter().all(|t| !t.is_empty() && t.trim() == t),
                    "raw={raw:?} sep={sep:?} -> {targets:?}"
                );
            }
        }
    }

    #[test]
    fn test_from_iter_applies_trimming() {
        let targets: TargetSet = vec!["  red", "", "orange  "].into_iter().collect();
        assert_eq!(targets.as_slice(), ["red", "orange"]);
    }

    #[test]
    fn test_load_targets_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "red\n\norange\n").unwrap();

        let (raw, targets) = load_targets_file(file.path(), encoding_rs::UTF_8, "").unwrap();
        assert_eq!(raw, "red\n\norange\n");
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_load_targets_file_shift_jis() {
        let mut file = NamedTempFile::new().unwrap();
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("赤\nみかん\n");
        file.write_all(&bytes).unwrap();

        let (_, targets) = load_targets_file(file.path(), encoding_rs::SHIFT_JIS, "").unwrap();
        assert_eq!(targets.as_slice(), ["赤", "みかん"]);
    }

    #[test]
    fn test_unescape_separator() {
        assert_eq!(unescape_separator("\\n"), "\n");
        assert_eq!(unescape_separator("\\r\\n"), "\r\n");
        assert_eq!(unescape_separator("a\\tb"), "a\tb");
        assert_eq!(unescape_separator("\\\\"), "\\");
        assert_eq!(unescape_separator("\\x"), "\\x");
        assert_eq!(unescape_separator(";"), ";");
    }
}
