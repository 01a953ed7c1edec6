//! # CSV Target Filter
//!
//! Select the rows of a delimited table whose value in one column matches any
//! string from a target list, and write them to a new table.
//!
//! ## Features
//!
//! - **Two match modes**: substring containment or exact membership
//! - **Target lists**: split on line breaks or on any literal separator, trimmed, blanks dropped
//! - **Encodings**: one configured codec (or auto-detection) for every file read and written
//! - **Passthrough output**: header and matched rows are written exactly as read
//! - **Configuration**: TOML file, literal values, or command-line flags layered on top
//!
//! ## Usage
//!
//! ```bash
//! # Run from a configuration file
//! csv-target-filter -c config.toml
//!
//! # Override the column and match mode
//! csv-target-filter -c config.toml -k 1 -m exact
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use csv_target_filter::config::{LiteralSource, RawConfig};
//! use csv_target_filter::pipeline::Pipeline;
//! use std::path::PathBuf;
//!
//! let raw = RawConfig {
//!     csv_file_path: Some(PathBuf::from("data.csv")),
//!     output_dir: Some(PathBuf::from("./output")),
//!     output_file_path: Some("filtered_data.csv".to_string()),
//!     encoding: Some("utf-8".to_string()),
//!     target_strings_file_path: Some(PathBuf::from("target_strings.txt")),
//!     column_index: Some(2),
//!     header_flag: Some(true),
//!     match_mode: Some("contains".to_string()),
//!     ..RawConfig::default()
//! };
//!
//! let report = Pipeline::new().run(&LiteralSource(raw)).unwrap();
//! println!("{} rows written to {:?}", report.rows_matched, report.output_path);
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod table;
pub mod targets;

pub use config::{ConfigSource, FilterConfig, RawConfig};
pub use error::{FilterError, Result};
pub use matcher::{filter_rows, MatchPolicy, RowMatcher};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use targets::{load_targets, TargetSet};
