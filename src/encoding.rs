//! Encoding resolution, detection and strict transcoding
//!
//! Every file the filter touches is read and written through the same
//! configured encoding. Decoding never substitutes replacement characters:
//! invalid input is reported as an error instead of silently producing mojibake.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{FilterError, Result};

/// Encoding as written in the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodingSpec {
    /// Sniff the input table and use the result for every file
    Auto,
    /// A concrete codec
    Fixed(&'static Encoding),
}

impl EncodingSpec {
    /// Parse a user-supplied encoding label
    ///
    /// Accepts WHATWG labels (`utf-8`, `shift_jis`, `windows-1252`, ...) plus a few
    /// common aliases such as `cp932` and `latin-1`. Underscores and case are ignored.
    pub fn parse(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");

        if normalized == "auto" {
            return Ok(Self::Auto);
        }

        let canonical = match normalized.as_str() {
            "cp932" => "shift_jis",
            "utf-8-sig" | "utf8-sig" => "utf-8",
            "latin-1" => "latin1",
            "cp1252" => "windows-1252",
            other => other,
        };

        let found = Encoding::for_label(label.trim().as_bytes())
            .or_else(|| Encoding::for_label(canonical.as_bytes()));

        match found {
            Some(encoding) if encoding != encoding_rs::REPLACEMENT => Ok(Self::Fixed(encoding)),
            _ => Err(FilterError::config(format!(
                "Unsupported encoding label: '{}'",
                label
            ))),
        }
    }

    /// Resolve to a concrete codec, sniffing `sample` when set to auto
    pub fn resolve(&self, sample: &Path) -> Result<&'static Encoding> {
        match self {
            Self::Fixed(encoding) => Ok(*encoding),
            Self::Auto => {
                let info = detect_encoding(sample)?;
                log::debug!(
                    "Detected encoding {} for {:?} (confidence {:.1})",
                    info.name,
                    sample,
                    info.confidence
                );
                Ok(info.encoding)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Fixed(encoding) => encoding.name(),
        }
    }
}

/// Result of encoding detection
#[derive(Debug, Clone)]
pub struct EncodingInfo {
    /// Detected encoding name
    pub name: &'static str,
    /// Confidence level (0.0 - 1.0)
    pub confidence: f32,
    /// The encoding_rs Encoding reference
    pub encoding: &'static Encoding,
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self {
            name: "UTF-8",
            confidence: 1.0,
            encoding: encoding_rs::UTF_8,
        }
    }
}

/// Detect the encoding of a file by sampling its content
pub fn detect_encoding(path: &Path) -> Result<EncodingInfo> {
    let file = File::open(path).map_err(|e| FilterError::io(path, e))?;

    // First 64KB is plenty for a table header and some rows
    let mut sample = Vec::with_capacity(64 * 1024);
    file.take(64 * 1024)
        .read_to_end(&mut sample)
        .map_err(|e| FilterError::io(path, e))?;

    if sample.is_empty() {
        return Ok(EncodingInfo::default());
    }

    if let Some(encoding) = detect_bom(&sample) {
        return Ok(EncodingInfo {
            name: encoding.name(),
            confidence: 1.0,
            encoding,
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&sample, true);
    let encoding = detector.guess(None, true);

    let confidence = if encoding == encoding_rs::UTF_8 {
        if std::str::from_utf8(&sample).is_ok() {
            1.0
        } else {
            0.5
        }
    } else {
        0.8
    };

    Ok(EncodingInfo {
        name: encoding.name(),
        confidence,
        encoding,
    })
}

/// Detect BOM (Byte Order Mark) at the start of content
fn detect_bom(content: &[u8]) -> Option<&'static Encoding> {
    if content.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Some(encoding_rs::UTF_8);
    }
    if content.starts_with(&[0xFE, 0xFF]) {
        return Some(encoding_rs::UTF_16BE);
    }
    if content.starts_with(&[0xFF, 0xFE]) {
        return Some(encoding_rs::UTF_16LE);
    }
    None
}

/// Drop a leading BOM when it belongs to `encoding`
fn strip_bom<'a>(content: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match detect_bom(content) {
        Some(bom) if bom == encoding => {
            let len = if bom == encoding_rs::UTF_8 { 3 } else { 2 };
            &content[len..]
        }
        _ => content,
    }
}

/// Strictly decode `bytes`; `path` is only used for error reporting
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> Result<String> {
    let body = strip_bom(bytes, encoding);

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| FilterError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
}

/// Read a whole file as text under `encoding`
pub fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| FilterError::io(path, e))?;
    decode_bytes(&bytes, encoding, path)
}

/// Strictly encode `text`; unmappable characters are an error
pub fn encode_text(text: &str, encoding: &'static Encoding, path: &Path) -> Result<Vec<u8>> {
    // encoding_rs only encodes to ASCII-compatible targets. UTF-16 output starts
    // with a BOM.
    if encoding == encoding_rs::UTF_16LE {
        let units = text.encode_utf16().flat_map(u16::to_le_bytes);
        return Ok([0xFF, 0xFE].into_iter().chain(units).collect());
    }
    if encoding == encoding_rs::UTF_16BE {
        let units = text.encode_utf16().flat_map(u16::to_be_bytes);
        return Ok([0xFE, 0xFF].into_iter().chain(units).collect());
    }

    let (encoded, used, had_errors) = encoding.encode(text);
    if had_errors || used != encoding {
        return Err(FilterError::Encode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }

    Ok(encoded.into_owned())
}
