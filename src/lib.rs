//! SPU mapper: fills SPU provisioning workbooks from CDD site data.
//!
//! A CDD (Customer Data Document) workbook carries the per-site radio and
//! transport parameters collected during site survey. An SPU template
//! workbook declares, on its `Mapping` sheet, which output sheets and columns
//! to produce and where each value comes from. This crate reads both, applies
//! the mapping, and writes the filled SPU workbook.
//!
//! The pipeline is [`Template::load`] → [`input::load_input`] →
//! [`resolve::Resolver`] → [`output::write_output`], wrapped by [`run`].

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod resolve;
pub mod template;
pub mod workbook;

pub(crate) mod helpers;

use crate::config::Config;
use crate::error::SpuMapperError;
use crate::resolve::Resolver;
use crate::template::Template;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Everything one mapping run needs.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// CDD input workbook
    pub input: PathBuf,
    /// SPU template workbook with the `Mapping` sheet
    pub template: PathBuf,
    /// Directory the output workbook is written into
    pub output_dir: PathBuf,
    /// Optional JSON configuration for `config:` defaults
    pub config: Option<PathBuf>,
    /// SPU version the template rows are filtered by
    pub spu_version: String,
}

/// Summary of a completed run, suitable for rendering as text or JSON.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub sheets: usize,
    pub rows: usize,
    pub unresolved: Vec<resolve::UnresolvedField>,
    pub warnings: Vec<resolve::ResolveWarning>,
}

/// Runs the full mapping pipeline and writes the output workbook.
pub fn run(options: &RunOptions) -> Result<RunReport, SpuMapperError> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!(
        "Applying template {} (version {}) to {}",
        options.template.display(),
        options.spu_version,
        options.input.display()
    );
    let template = Template::load(&options.template, &options.spu_version)?;
    let input = input::load_input(&options.input, &template)?;
    let result = Resolver::new(&template, &input, &config, &options.spu_version).resolve()?;

    fs::create_dir_all(&options.output_dir)?;
    let group = output::group_label(&input);
    let output_path = options
        .output_dir
        .join(output::output_file_name(&options.template, &group));
    output::write_output(&output_path, &result)?;

    Ok(RunReport {
        output_path,
        sheets: result.sheets.len(),
        rows: result.sheets.iter().map(|sheet| sheet.rows.len()).sum(),
        unresolved: result.unresolved,
        warnings: result.warnings,
    })
}
