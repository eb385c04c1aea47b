use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};
use midi_picasso::{Args, Config, ConfigRegistry, EncoderStyle, FreeStyle, parse_verbosity};

fn main() -> Result<()> {
    let args = Args::parse();
    let level = parse_verbosity(&args.verbosity);

    env_logger::Builder::new()
        .filter_level(level.unwrap_or(LevelFilter::Info))
        .format_timestamp_secs()
        .parse_default_env()
        .init();

    if level.is_none() {
        warn!(
            "Unknown verbosity '{}', defaulting to INFO..!",
            args.verbosity
        );
    }

    let config = match &args.config_file {
        Some(path) => Config::from_json_file(path)?,
        None => ConfigRegistry::builtin().get(&args.config)?,
    };
    debug!("Resolved config: {:?}", config);

    let accumulate = config.general.accumulate_rotation || args.accumulate_rotation;
    let general = config.general.clone().with_accumulate_rotation(accumulate);

    let mut encoder = match args.seed {
        Some(seed) => FreeStyle::seeded(general, seed)?,
        None => FreeStyle::from_entropy(general)?,
    };

    info!("Painting '{}'...", args.input.display());
    encoder
        .encode_midi(&args.input, &args.output, &config.style)
        .with_context(|| format!("Failed to paint '{}'", args.input.display()))?;
    info!("Done, exiting..!");

    Ok(())
}
