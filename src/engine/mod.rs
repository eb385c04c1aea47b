use crate::error::Result;
use crate::midi_importer::{NormalizeOptions, normalize_midi_file};
use crate::model::params::{GeneralParams, StyleParams};
use crate::model::song::NoteSequence;
use std::path::Path;

pub mod canvas;
pub mod freestyle;

/// A way of turning a note sequence into a picture.
pub trait EncoderStyle {
    /// Parameters this encoder was built with.
    fn general(&self) -> &GeneralParams;

    /// Paints `sequence` in order and writes the picture to `output`.
    fn encode_sequence(
        &mut self,
        sequence: &NoteSequence,
        output: &Path,
        style: &StyleParams,
    ) -> Result<()>;

    fn encode_midi(&mut self, input: &Path, output: &Path, style: &StyleParams) -> Result<()> {
        let sequence = normalize_midi_file(input, &NormalizeOptions::from(self.general()))?;
        self.encode_sequence(&sequence, output, style)
    }
}
