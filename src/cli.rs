use crate::commands;
use crate::device::device;
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute mean-pooled embeddings for every sequence in a CSV table.
    Run {
        /// Input CSV; sequences are read from the third column.
        #[arg(short, long)]
        input: String,

        /// Directory the artifacts are written into.
        #[arg(short, long, default_value = ".")]
        out_dir: String,

        /// Run a single named model instead of every configured one.
        #[arg(long)]
        model: Option<String>,

        /// Run on CPU rather than on GPU.
        #[arg(long)]
        cpu: bool,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Run {
                input,
                out_dir,
                model,
                cpu,
            } => {
                let device = device(cpu)?;
                commands::run::execute(
                    Path::new(&input),
                    Path::new(&out_dir),
                    model.as_deref(),
                    device,
                )?;
                Ok(())
            }
        }
    }
}
