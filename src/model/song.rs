use serde::{Deserialize, Serialize};

/// MIDI channel index (0-based) reserved for percussion.
pub const DRUM_CHANNEL: u8 = 9;

/// Controller number of the sustain (damper) pedal.
pub const SUSTAIN_CONTROL: u8 = 64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: u8,
    pub velocity: u8,
    pub start_time: f64,
    pub end_time: f64,
    pub is_drum: bool,
    pub channel: u8,
    pub instrument: u32,
    pub program: u8,
}

impl Note {
    /// Note length in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ControlChange {
    pub time: f64,
    pub channel: u8,
    pub instrument: u32,
    pub control: u8,
    pub value: u8,
}

/// A flattened, time-ordered view of every note in a MIDI file, in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NoteSequence {
    pub notes: Vec<Note>,
    pub control_changes: Vec<ControlChange>,
    pub total_time: f64,
    pub source: Option<String>,
}

impl NoteSequence {
    /// Latest note end, or zero for an empty sequence.
    pub fn max_end_time(&self) -> f64 {
        self.notes
            .iter()
            .map(|note| note.end_time)
            .fold(0.0, f64::max)
    }

    pub fn has_drums(&self) -> bool {
        self.notes.iter().any(|note| note.is_drum)
    }

    pub fn sort_notes(&mut self) {
        self.notes.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.pitch.cmp(&b.pitch))
        });
    }
}
