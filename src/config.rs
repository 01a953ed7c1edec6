//! Configuration loading
//!
//! Options come from a [`ConfigSource`]: a TOML document on disk, literal values
//! built in code, or either of those with per-key overrides layered on top (the
//! command line). Every source yields a [`RawConfig`] which is validated once
//! into the immutable [`FilterConfig`] the pipeline runs on.

use serde::Deserialize;
use std::path::PathBuf;

use crate::encoding::EncodingSpec;
use crate::error::{FilterError, Result};
use crate::matcher::MatchPolicy;
use crate::output::output_path;
use crate::table::TableFormat;
use crate::targets::unescape_separator;

/// Unvalidated option set, every key optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    pub csv_file_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub output_file_path: Option<String>,
    pub encoding: Option<String>,
    pub target_strings_file_path: Option<PathBuf>,
    pub column_index: Option<i64>,
    pub header_flag: Option<bool>,
    pub newline_char: Option<String>,
    pub debug_flag: Option<bool>,
    pub match_mode: Option<String>,
    pub delimiter: Option<String>,
}

impl RawConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FilterError::config(format!("Failed to parse configuration: {}", e)))
    }

    /// Keys set in `overrides` replace the ones in `self`
    pub fn overlay(self, overrides: RawConfig) -> RawConfig {
        RawConfig {
            csv_file_path: overrides.csv_file_path.or(self.csv_file_path),
            output_dir: overrides.output_dir.or(self.output_dir),
            output_file_path: overrides.output_file_path.or(self.output_file_path),
            encoding: overrides.encoding.or(self.encoding),
            target_strings_file_path: overrides
                .target_strings_file_path
                .or(self.target_strings_file_path),
            column_index: overrides.column_index.or(self.column_index),
            header_flag: overrides.header_flag.or(self.header_flag),
            newline_char: overrides.newline_char.or(self.newline_char),
            debug_flag: overrides.debug_flag.or(self.debug_flag),
            match_mode: overrides.match_mode.or(self.match_mode),
            delimiter: overrides.delimiter.or(self.delimiter),
        }
    }

    /// Validate into a [`FilterConfig`]
    pub fn into_config(self) -> Result<FilterConfig> {
        let input_path = required(self.csv_file_path, "csv_file_path")?;
        let output_dir = required(self.output_dir, "output_dir")?;
        let output_file_name = required(self.output_file_path, "output_file_path")?;
        let encoding = EncodingSpec::parse(&required(self.encoding, "encoding")?)?;
        let targets_path = required(self.target_strings_file_path, "target_strings_file_path")?;
        let column_index = required(self.column_index, "column_index")?;
        let has_header = required(self.header_flag, "header_flag")?;
        let match_policy: MatchPolicy = required(self.match_mode, "match_mode")?.parse()?;

        if output_file_name.trim().is_empty() {
            return Err(FilterError::config("output_file_path must not be empty"));
        }

        let column_index = usize::try_from(column_index).map_err(|_| {
            FilterError::config(format!(
                "column_index must be a non-negative integer, got {}",
                column_index
            ))
        })?;

        let delimiter = match self.delimiter {
            Some(d) => parse_delimiter(&d)?,
            None => b',',
        };

        Ok(FilterConfig {
            input_path,
            output_dir,
            output_file_name,
            encoding,
            targets_path,
            column_index,
            has_header,
            separator: self.newline_char.unwrap_or_default(),
            debug: self.debug_flag.unwrap_or(false),
            match_policy,
            delimiter,
        })
    }
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| FilterError::config(format!("Missing required key '{}'", key)))
}

fn parse_delimiter(value: &str) -> Result<u8> {
    let unescaped = match value {
        "tab" => "\t".to_string(),
        other => unescape_separator(other),
    };

    match unescaped.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(FilterError::config(format!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        ))),
    }
}

/// Validated, immutable run configuration
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_file_name: String,
    pub encoding: EncodingSpec,
    pub targets_path: PathBuf,
    pub column_index: usize,
    pub has_header: bool,
    /// Split token for the target file; empty means line splitting
    pub separator: String,
    pub debug: bool,
    pub match_policy: MatchPolicy,
    pub delimiter: u8,
}

impl FilterConfig {
    /// Final output location
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.output_dir, &self.output_file_name)
    }

    /// Table layout for a resolved encoding
    pub fn table_format(&self, encoding: &'static encoding_rs::Encoding) -> TableFormat {
        TableFormat {
            delimiter: self.delimiter,
            has_header: self.has_header,
            encoding,
        }
    }
}

/// Anything that can produce the raw option set
pub trait ConfigSource {
    /// Human-readable origin, used in diagnostics
    fn describe(&self) -> String;

    fn raw(&self) -> Result<RawConfig>;

    fn load(&self) -> Result<FilterConfig> {
        self.raw()?.into_config()
    }
}

/// TOML configuration file
#[derive(Debug, Clone)]
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for TomlFileSource {
    fn describe(&self) -> String {
        format!("file {:?}", self.path)
    }

    fn raw(&self) -> Result<RawConfig> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| FilterError::io(&self.path, e))?;
        RawConfig::from_toml(&content).map_err(|e| match e {
            FilterError::Config(msg) => FilterError::config(format!("{:?}: {}", self.path, msg)),
            other => other,
        })
    }
}

/// Values fixed in code
#[derive(Debug, Clone, Default)]
pub struct LiteralSource(pub RawConfig);

impl ConfigSource for LiteralSource {
    fn describe(&self) -> String {
        "literal values".to_string()
    }

    fn raw(&self) -> Result<RawConfig> {
        Ok(self.0.clone())
    }
}

/// A base source with overrides applied on top
pub struct LayeredSource {
    base: Box<dyn ConfigSource>,
    overrides: RawConfig,
}

impl LayeredSource {
    pub fn new(base: Box<dyn ConfigSource>, overrides: RawConfig) -> Self {
        Self { base, overrides }
    }
}

impl ConfigSource for LayeredSource {
    fn describe(&self) -> String {
        format!("{} with command-line overrides", self.base.describe())
    }

    fn raw(&self) -> Result<RawConfig> {
        Ok(self.base.raw()?.overlay(self.overrides.clone()))
    }
}
