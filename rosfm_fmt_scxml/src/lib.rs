//! Reader and writer for the ROS-SCXML format.
//!
//! A ROS-SCXML document is an SCXML statechart extended with tags
//! declaring ROS timers, topics and services,
//! and with ROS callbacks and actions in place of plain transitions and sends.
//! Plain SCXML is the subset of documents without any ROS tag.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod parser;
mod vocabulary;
mod writer;

pub use parser::{ParserError, parse_file, parse_str};
pub use rosfm_core;
pub use writer::{to_string, write};

use anyhow::Context;
use log::info;
use rosfm_core::Statechart;
use std::path::{Path, PathBuf};

/// File extension of ROS-SCXML documents.
pub const SCXML_EXTENSION: &str = "scxml";

/// Loads the statecharts from the given files and directories.
///
/// Directories are scanned recursively for `.scxml` files,
/// in lexicographic order of their paths.
/// Statecharts are returned in the order the paths are given.
pub fn load(paths: &[PathBuf]) -> anyhow::Result<Vec<Statechart>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            collect(path, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    info!(target: "parser", "loading {} files", files.len());
    files.iter().map(|file| parse_file(file)).collect()
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory '{}'", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == SCXML_EXTENSION)
        {
            files.push(path);
        }
    }
    Ok(())
}
