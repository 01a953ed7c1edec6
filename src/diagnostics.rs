//! Pipeline observers
//!
//! Stages report what they produced to a [`PipelineObserver`]. Observers only
//! watch: every callback returns `()` so nothing they do can change the outcome
//! of a run.

use bytesize::ByteSize;
use csv::StringRecord;
use encoding_rs::Encoding;
use std::path::Path;

use crate::config::FilterConfig;
use crate::pipeline::Stage;
use crate::progress::{print_bullet, print_header, print_info, print_success, print_warning};
use crate::table::Table;
use crate::targets::TargetSet;

/// Receives stage results as the pipeline advances
#[allow(unused_variables)]
pub trait PipelineObserver {
    fn stage_started(&mut self, stage: Stage) {}

    fn config_loaded(&mut self, source: &str, config: &FilterConfig) {}

    fn targets_loaded(&mut self, raw: &str, targets: &TargetSet) {}

    fn table_loaded(&mut self, table: &Table, encoding: &'static Encoding) {}

    fn rows_matched(&mut self, matched: &Table, scanned: usize) {}

    fn output_written(&mut self, path: &Path, rows: usize) {}
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// Human-readable trace on standard output
#[derive(Debug)]
pub struct ConsoleObserver {
    preview_rows: usize,
}

impl ConsoleObserver {
    pub fn new(preview_rows: usize) -> Self {
        Self { preview_rows }
    }

    fn preview(&self, table: &Table) {
        if let Some(header) = table.header() {
            print_bullet(&format!("header: {}", join_record(header)));
        }
        for row in table.rows().iter().take(self.preview_rows) {
            print_bullet(&join_record(row));
        }
        if table.len() > self.preview_rows {
            print_bullet(&format!("... {} more row(s)", table.len() - self.preview_rows));
        }
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new(5)
    }
}

fn join_record(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(" | ")
}

impl PipelineObserver for ConsoleObserver {
    fn stage_started(&mut self, stage: Stage) {
        print_header(&format!("{}...", stage));
    }

    fn config_loaded(&mut self, source: &str, config: &FilterConfig) {
        print_info(&format!("Source:       {}", source));
        print_info(&format!("Input:        {:?}", config.input_path));
        print_info(&format!("Targets file: {:?}", config.targets_path));
        print_info(&format!("Output:       {:?}", config.output_path()));
        print_info(&format!("Encoding:     {}", config.encoding.name()));
        print_info(&format!("Column:       {}", config.column_index));
        print_info(&format!("Header:       {}", config.has_header));
        print_info(&format!("Separator:    {:?}", config.separator));
        print_info(&format!("Match mode:   {}", config.match_policy));

        if let Ok(meta) = std::fs::metadata(&config.input_path) {
            print_info(&format!("Input size:   {}", ByteSize(meta.len())));
        }
    }

    fn targets_loaded(&mut self, raw: &str, targets: &TargetSet) {
        print_info(&format!("Raw content ({} chars):", raw.chars().count()));
        for line in raw.lines().take(self.preview_rows) {
            print_bullet(&format!("{:?}", line));
        }
        print_info(&format!("Target strings ({}): {:?}", targets.len(), targets.as_slice()));

        if targets.is_empty() {
            print_warning("No target strings loaded; nothing will match");
        }
    }

    fn table_loaded(&mut self, table: &Table, encoding: &'static Encoding) {
        print_info(&format!(
            "Total rows: {}, Total columns: {} ({})",
            table.len(),
            table.width(),
            encoding.name()
        ));
        self.preview(table);
    }

    fn rows_matched(&mut self, matched: &Table, scanned: usize) {
        print_info(&format!("Total matched rows: {} of {}", matched.len(), scanned));
        self.preview(matched);
    }

    fn output_written(&mut self, path: &Path, rows: usize) {
        print_success(&format!("Filtered data saved to {:?} ({} rows)", path, rows));
    }
}
