use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "casmclips")]
#[command(author, version, about = "Find, rank and render short clips from long videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Acquire a video (path or URL), analyze it and save a new project
    Analyze {
        /// Local file, video-host URL or direct media URL
        #[arg(required = true)]
        source: String,

        /// Override the output root from the config
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output the saved project as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the clips of a saved project
    Render {
        /// The project's project.json
        #[arg(required = true)]
        project: PathBuf,

        /// Disable GPU acceleration for this run
        #[arg(long)]
        no_gpu: bool,

        /// Output the updated project as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved projects, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a saved project
    Show {
        /// The project's project.json
        #[arg(required = true)]
        project: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools {
        /// Output the capability map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
