mod engine;
mod error;
mod midi_importer;
mod model;
mod util;

#[cfg(test)]
mod test_support;

pub use engine::canvas::*;
pub use engine::freestyle::*;
pub use engine::*;
pub use error::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::params::*;
pub use model::registry::*;
pub use model::song::*;
pub use util::*;
