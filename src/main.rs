//! csv-target-filter - select table rows matching a list of target strings
//!
//! Main entry point for the command-line application.

use clap::Parser;
use env_logger::Env;
use std::process;

use csv_target_filter::cli::Args;
use csv_target_filter::config::ConfigSource;
use csv_target_filter::pipeline::Pipeline;
use csv_target_filter::progress::{print_banner, print_error, print_success, print_summary};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if !args.quiet {
        print_banner();
    }

    let source = args.config_source();
    log::debug!("Configuration source: {}", source.describe());

    let mut pipeline = Pipeline::new().show_progress(!args.quiet);
    let report = pipeline.run(&source)?;

    if args.quiet {
        println!("{}", report.output_path.display());
    } else {
        print_summary(&report);
        print_success(&format!(
            "Filtered data has been written to {}",
            report.output_path.display()
        ));
    }

    Ok(())
}
