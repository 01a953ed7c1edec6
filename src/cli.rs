//! Command-line interface definition for csv-target-filter
//!
//! Every configuration key has a matching flag. Flags override the values read
//! from `--config`, so a run can be driven entirely from the command line.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigSource, LayeredSource, LiteralSource, RawConfig, TomlFileSource};
use crate::matcher::MatchPolicy;
use crate::targets::unescape_separator;

/// Select table rows whose column matches a list of target strings
#[derive(Parser, Debug, Clone)]
#[command(
    name = "csv-target-filter",
    author = "m0h1nd4",
    version,
    about = "Select table rows whose column matches a list of target strings",
    long_about = r#"
Reads a delimited table, keeps the rows whose value in one column matches any
string from a target file, and writes them to a new table with the same
header and encoding.

EXAMPLES:
    # Everything from a configuration file
    csv-target-filter -c config.toml

    # Rows whose description mentions any target
    csv-target-filter -i data.csv -t targets.txt -k 2 -m contains \
        -o ./output --output-name filtered_data.csv -e utf-8 --header

    # Exact name matches in a Shift_JIS file, targets separated by commas
    csv-target-filter -c config.toml -m exact -k 1 -e shift_jis -s ","

CONFIGURATION KEYS (TOML):
    csv_file_path, output_dir, output_file_path, encoding,
    target_strings_file_path, column_index, header_flag, match_mode,
    newline_char (optional), debug_flag (optional), delimiter (optional)
"#
)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input table
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output directory (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name inside the output directory
    #[arg(long, value_name = "NAME")]
    pub output_name: Option<String>,

    /// Encoding for every file read and written, or "auto"
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// File holding the target strings
    #[arg(short, long, value_name = "PATH")]
    pub targets: Option<PathBuf>,

    /// Zero-based column to match against
    #[arg(short = 'k', long, value_name = "INDEX")]
    pub column: Option<usize>,

    /// First row is a header
    #[arg(long, conflicts_with = "no_header")]
    pub header: bool,

    /// First row is data
    #[arg(long)]
    pub no_header: bool,

    /// Separator between target strings (escapes like \n allowed); empty splits on lines
    #[arg(short, long, value_name = "SEP", allow_hyphen_values = true)]
    pub separator: Option<String>,

    /// How cells are compared with targets
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub match_mode: Option<MatchPolicy>,

    /// Field delimiter of the table (single character or "tab")
    #[arg(short, long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Print a trace of every stage
    #[arg(long, default_value_t = false, conflicts_with = "no_debug")]
    pub debug: bool,

    /// Turn off the stage trace even if the configuration file enables it
    #[arg(long, default_value_t = false)]
    pub no_debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Configuration keys set on the command line
    pub fn overrides(&self) -> RawConfig {
        let header_flag = if self.header {
            Some(true)
        } else if self.no_header {
            Some(false)
        } else {
            None
        };

        let debug_flag = if self.debug {
            Some(true)
        } else if self.no_debug {
            Some(false)
        } else {
            None
        };

        RawConfig {
            csv_file_path: self.input.clone(),
            output_dir: self.output_dir.clone(),
            output_file_path: self.output_name.clone(),
            encoding: self.encoding.clone(),
            target_strings_file_path: self.targets.clone(),
            column_index: self.column.map(|c| c as i64),
            header_flag,
            newline_char: self.separator.as_deref().map(unescape_separator),
            debug_flag,
            match_mode: self.match_mode.map(|m| m.as_str().to_string()),
            delimiter: self.delimiter.clone(),
        }
    }

    /// The configuration file, if any, with command-line overrides on top
    pub fn config_source(&self) -> LayeredSource {
        let base: Box<dyn ConfigSource> = match &self.config {
            Some(path) => Box::new(TomlFileSource::new(path)),
            None => Box::new(LiteralSource::default()),
        };
        LayeredSource::new(base, self.overrides())
    }
}
