use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "midi_picasso",
    about = "Paint a picture from a MIDI file!"
)]
pub struct Args {
    /// Path to the input MIDI file.
    #[arg(long)]
    pub input: PathBuf,

    /// Path of the PNG image to write.
    #[arg(long)]
    pub output: PathBuf,

    /// Name of a built-in art style config.
    #[arg(long, default_value = "freestyle")]
    pub config: String,

    /// Path to a JSON config file. Takes precedence over `--config`.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity: DEBUG|INFO|WARN|ERROR|FATAL.
    #[arg(long, default_value = "INFO")]
    pub verbosity: String,

    /// Seed for the shape placement RNG, for reproducible pictures.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Let rectangle rotations accumulate from note to note.
    #[arg(long = "accumulate-rotation", default_value_t = false)]
    pub accumulate_rotation: bool,
}
