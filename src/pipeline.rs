//! Core processing engine
//!
//! Runs one filter job from configuration to output file. The stages always
//! execute in the same order and the first failure ends the run; the output
//! directory and file are only touched once matching has finished.

use indicatif::ProgressBar;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{ConfigSource, FilterConfig};
use crate::diagnostics::{ConsoleObserver, PipelineObserver, SilentObserver};
use crate::error::Result;
use crate::matcher::RowMatcher;
use crate::output::ensure_output_dir;
use crate::progress::create_progress_bar;
use crate::table::{read_table, write_table};
use crate::targets::load_targets_file;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadConfig,
    LoadTargets,
    LoadTable,
    Match,
    WriteOutput,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadConfig => "Loading configuration",
            Self::LoadTargets => "Loading target strings",
            Self::LoadTable => "Loading table",
            Self::Match => "Matching rows",
            Self::WriteOutput => "Writing output",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub target_count: usize,
    pub rows_scanned: usize,
    pub rows_matched: usize,
    pub encoding: &'static str,
    pub elapsed: Duration,
}

/// Filter pipeline
///
/// Without an explicit observer, the configuration's debug flag picks between a
/// console trace and silence.
#[derive(Default)]
pub struct Pipeline {
    observer: Option<Box<dyn PipelineObserver>>,
    show_progress: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report to `observer` regardless of the debug flag
    pub fn with_observer(observer: Box<dyn PipelineObserver>) -> Self {
        Self {
            observer: Some(observer),
            show_progress: false,
        }
    }

    /// Draw a progress bar during the row scan
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Load configuration from `source`, then run
    pub fn run(&mut self, source: &dyn ConfigSource) -> Result<RunReport> {
        let start = Instant::now();
        let description = source.describe();
        log::debug!("Loading configuration from {}", description);

        let config = source.load()?;
        self.execute(&config, &description, start)
    }

    /// Run with an already validated configuration
    pub fn run_with_config(&mut self, config: &FilterConfig) -> Result<RunReport> {
        self.execute(config, "in-memory configuration", Instant::now())
    }

    fn execute(
        &mut self,
        config: &FilterConfig,
        source: &str,
        start: Instant,
    ) -> Result<RunReport> {
        let mut fallback: Box<dyn PipelineObserver> = if config.debug {
            Box::new(ConsoleObserver::default())
        } else {
            Box::new(SilentObserver)
        };
        let observer: &mut dyn PipelineObserver = match self.observer.as_deref_mut() {
            Some(observer) => observer,
            None => fallback.as_mut(),
        };

        observer.stage_started(Stage::LoadConfig);
        observer.config_loaded(source, config);

        observer.stage_started(Stage::LoadTargets);
        let encoding = config.encoding.resolve(&config.input_path)?;
        let (raw, targets) = load_targets_file(&config.targets_path, encoding, &config.separator)?;
        log::debug!("Loaded {} target string(s) from {:?}", targets.len(), config.targets_path);
        if targets.is_empty() {
            log::warn!("No target strings in {:?}; no rows will match", config.targets_path);
        }
        observer.targets_loaded(&raw, &targets);

        observer.stage_started(Stage::LoadTable);
        let format = config.table_format(encoding);
        let table = read_table(&config.input_path, &format)?;
        log::debug!(
            "Loaded {} row(s) x {} column(s) from {:?}",
            table.len(),
            table.width(),
            config.input_path
        );
        observer.table_loaded(&table, encoding);

        observer.stage_started(Stage::Match);
        let matcher = RowMatcher::new(&targets, config.match_policy);
        let pb = if self.show_progress {
            create_progress_bar(table.len() as u64, "Matching rows")
        } else {
            ProgressBar::hidden()
        };
        let selected = matcher.select(&table, config.column_index, || pb.inc(1));
        pb.finish_and_clear();
        let matched = selected?;
        log::debug!(
            "{} of {} row(s) matched ({} policy)",
            matched.len(),
            table.len(),
            matcher.policy()
        );
        observer.rows_matched(&matched, table.len());

        observer.stage_started(Stage::WriteOutput);
        let output_path = config.output_path();
        ensure_output_dir(&config.output_dir)?;
        write_table(&matched, &output_path, &format)?;
        log::info!("Wrote {} row(s) to {:?}", matched.len(), output_path);
        observer.output_written(&output_path, matched.len());

        observer.stage_started(Stage::Done);

        Ok(RunReport {
            output_path,
            target_count: targets.len(),
            rows_scanned: table.len(),
            rows_matched: matched.len(),
            encoding: encoding.name(),
            elapsed: start.elapsed(),
        })
    }
}
