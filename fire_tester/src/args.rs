use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Runs the fire detector against a frame source
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["frames_dir", "camera", "video"])
))]
pub struct Args {
    /// Pipeline configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory of still images, analyzed in file-name order
    #[arg(long)]
    pub frames_dir: Option<PathBuf>,

    /// Camera index (needs the `camera` feature)
    #[arg(long)]
    pub camera: Option<i32>,

    /// Video file (needs the `camera` feature)
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Pace an image directory at this many frames per second (0 = as fast as possible)
    #[arg(long, default_value_t = 0.0)]
    pub fps: f64,

    /// Mirror frames before analysis, overriding the configuration
    #[arg(long, default_value_t = false)]
    pub mirror: bool,
}
