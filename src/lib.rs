//! rosfm compiles networks of ROS-SCXML statecharts into plain SCXML.
//!
//! ROS timers, topics and services are replaced by plain events,
//! and each service gets an arbiter automaton
//! serializing the requests of its clients to its server.
//! The resulting plain statecharts are written one per file,
//! together with a manifest of the timers driving them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;

pub use cli::{Cli, Command};
pub use rosfm_core;
pub use rosfm_fmt_scxml;

use anyhow::Context;
use log::info;
use rosfm_core::{CompilationOutput, EcmaScriptInterpreter, Orchestrator, RosTimer};
use serde::Serialize;
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// File name of the timers manifest.
pub const MANIFEST_FILE: &str = "timers.json";

/// Timing information of a compiled network, consumed alongside the plain statecharts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    /// Maximum execution time, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u64>,
    /// Timers declared across the network, in declaration order.
    pub timers: Vec<RosTimer>,
}

/// Loads the ROS-SCXML models at the given paths and compiles them.
pub fn compile(models: &[PathBuf]) -> anyhow::Result<CompilationOutput> {
    let statecharts = rosfm_fmt_scxml::load(models)?;
    let interpreter = EcmaScriptInterpreter::new();
    let output = Orchestrator::new(&interpreter)
        .compile(&statecharts)
        .context("failed to compile models")?;
    Ok(output)
}

/// Compiles the models and writes the plain statecharts and the manifest into `output`.
pub fn convert(
    models: &[PathBuf],
    output: &Path,
    max_time: Option<u64>,
) -> anyhow::Result<CompilationOutput> {
    let compiled = compile(models)?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create directory '{}'", output.display()))?;
    for statechart in &compiled.statecharts {
        let path = output.join(format!("{}.scxml", statechart.name()));
        let file = File::create(&path)
            .with_context(|| format!("failed to create file '{}'", path.display()))?;
        rosfm_fmt_scxml::write(statechart, BufWriter::new(file))
            .with_context(|| format!("failed to write file '{}'", path.display()))?;
        info!("written '{}'", path.display());
    }
    let manifest = Manifest {
        max_time,
        timers: compiled.timers.clone(),
    };
    let path = output.join(MANIFEST_FILE);
    let file = File::create(&path)
        .with_context(|| format!("failed to create file '{}'", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &manifest)
        .with_context(|| format!("failed to write file '{}'", path.display()))?;
    info!("written '{}'", path.display());
    Ok(compiled)
}
