//! Command-line surface of the `mediarecon` binary.

use clap::{Parser, Subcommand};
use mediarecon_core::Stage;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mediarecon",
    about = "Reconcile media records with the assets in object storage"
)]
pub struct Cli {
    /// Connect directly instead of opening the SSH tunnel first
    #[arg(long, global = true)]
    pub no_tunnel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report image records missing height or width (read-only)
    Audit {
        #[arg(long, default_value = "staging")]
        stage: Stage,
    },
    /// Probe image records missing height or width and write the dimensions back
    Fix {
        #[arg(long, default_value = "production")]
        stage: Stage,
    },
    /// Upload every file under a directory and record its metadata
    Upload {
        /// Root directory to upload
        #[arg(default_value = "files")]
        dir: PathBuf,
        #[arg(long, default_value = "staging")]
        stage: Stage,
    },
}

impl Commands {
    pub fn stage(&self) -> Stage {
        match self {
            Commands::Audit { stage } | Commands::Fix { stage } | Commands::Upload { stage, .. } => {
                *stage
            }
        }
    }
}
