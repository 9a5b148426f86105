use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A compiler of ROS-SCXML models into plain SCXML
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Operations on a network of ROS-SCXML models.
#[derive(Subcommand)]
pub enum Command {
    /// Compile the models into plain SCXML files and a timers manifest
    Convert {
        /// Paths of the models' files, or of directories containing them
        #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
        models: Vec<PathBuf>,
        /// Directory where to write the plain SCXML files
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: PathBuf,
        /// Maximum execution time in seconds, recorded in the manifest
        #[arg(long)]
        max_time: Option<u64>,
    },
    /// Check that the models compile, without writing anything
    Validate {
        /// Paths of the models' files, or of directories containing them
        #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
        models: Vec<PathBuf>,
    },
}

impl Cli {
    /// Runs the selected command.
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Convert {
                models,
                output,
                max_time,
            } => {
                let compiled = crate::convert(models, output, *max_time)?;
                println!(
                    "Written {} plain statecharts and {} timers to '{}'",
                    compiled.statecharts.len(),
                    compiled.timers.len(),
                    output.display()
                );
            }
            Command::Validate { models } => {
                let compiled = crate::compile(models)?;
                println!(
                    "Models are valid: {} plain statecharts, {} timers",
                    compiled.statecharts.len(),
                    compiled.timers.len()
                );
            }
        }
        Ok(())
    }
}
