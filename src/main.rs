//! CLI entry point: parses arguments, runs the mapping pipeline, and prints
//! the run report.

use anyhow::{Context, Result};
use clap::Parser;
use spumap::cli::{Cli, OutputFormat};
use spumap::{run, RunOptions};

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let options = RunOptions {
        input: cli.input,
        template: cli.template,
        output_dir: cli.output_dir,
        config: cli.config,
        spu_version: cli.spu_version,
    };
    let report = run(&options).context("Mapping run failed")?;

    match cli.format {
        OutputFormat::Text => {
            println!("Wrote {}", report.output_path.display());
            println!("  {} sheet(s), {} row(s)", report.sheets, report.rows);
            for field in &report.unresolved {
                println!("  unresolved: '{}'.'{}'", field.sheet, field.column);
            }
            for warning in &report.warnings {
                let spumap::resolve::ResolveWarning::DuplicateKey { sheet, key, matches, .. } = warning;
                println!(
                    "  duplicate key: '{}' in sheet '{}' ({} matches, first used)",
                    key, sheet, matches
                );
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to render report")?
            );
        }
    }
    Ok(())
}
