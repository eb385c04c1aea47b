use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PicassoError>;

#[derive(Debug, Error)]
pub enum PicassoError {
    /// The MIDI input was missing, unreadable or malformed.
    #[error("Failed to decode MIDI file {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// General or style parameters were rejected before any painting happened.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A style asked for a shape the encoder cannot draw.
    #[error("Cannot recognize shape '{0}'")]
    InvalidShape(String),

    #[error("Failed to write image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PicassoError {
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PicassoError::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PicassoError::Config(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PicassoError::Io {
            path: path.into(),
            source,
        }
    }
}
