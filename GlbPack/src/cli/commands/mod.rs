use clap::Subcommand;
use std::path::PathBuf;

pub mod convert;
pub mod inspect;

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every .gltf file in a folder to .glb
    Convert {
        /// Folder containing .gltf files and their resources
        input: PathBuf,

        /// Output folder (default: <input>/glb_output)
        output: Option<PathBuf>,

        /// Fail a file when a referenced buffer or image is missing
        #[arg(long)]
        strict: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the header and chunk table of a .glb file
    Inspect {
        /// GLB file
        path: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Convert {
                input,
                output,
                strict,
                quiet,
            } => convert::execute(input, output.as_deref(), *strict, *quiet),
            Commands::Inspect { path } => inspect::execute(path),
        }
    }
}
