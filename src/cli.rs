//! Command line definitions.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Fills an SPU provisioning workbook from a CDD site data workbook.
#[derive(Parser, Debug)]
#[command(
    name = "spumap",
    about = "Fills SPU provisioning workbooks from CDD site data",
    version
)]
pub struct Cli {
    /// CDD input workbook (.xlsx)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// SPU template workbook with a 'Mapping' sheet (.xlsx)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Directory to write the output workbook into
    #[arg(short, long, default_value = "Output")]
    pub output_dir: PathBuf,

    /// Path to a JSON config file for 'config:' default values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SPU version used to filter template mapping rows
    #[arg(long, default_value = "V1.70.26")]
    pub spu_version: String,

    /// Report format printed after the run
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format for the run report.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
