//! MIDI fixtures written on the fly for tests.

use midly::num::{u4, u7, u15, u24, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::fs;
use std::path::{Path, PathBuf};

pub const TICKS_PER_QUARTER: u16 = 480;

#[derive(Debug, Clone, Copy)]
pub enum Ev {
    /// channel, key, velocity
    On(u8, u8, u8),
    /// channel, key
    Off(u8, u8),
    /// channel, controller, value
    Cc(u8, u8, u8),
    /// channel, program
    Program(u8, u8),
    /// microseconds per quarter note
    Tempo(u32),
}

impl Ev {
    fn kind(self) -> TrackEventKind<'static> {
        let midi = |channel: u8, message: MidiMessage| TrackEventKind::Midi {
            channel: u4::new(channel),
            message,
        };

        match self {
            Ev::On(ch, key, vel) => midi(
                ch,
                MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            ),
            Ev::Off(ch, key) => midi(
                ch,
                MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            ),
            Ev::Cc(ch, controller, value) => midi(
                ch,
                MidiMessage::Controller {
                    controller: u7::new(controller),
                    value: u7::new(value),
                },
            ),
            Ev::Program(ch, program) => midi(
                ch,
                MidiMessage::ProgramChange {
                    program: u7::new(program),
                },
            ),
            Ev::Tempo(mpqn) => TrackEventKind::Meta(MetaMessage::Tempo(u24::new(mpqn))),
        }
    }
}

/// A fresh, empty directory unique to this test process and `name`.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("midi_picasso_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Writes one track per entry; events are given as `(absolute tick, event)`.
pub fn write_midi(path: &Path, tracks: &[Vec<(u32, Ev)>]) {
    write_midi_with_timing(path, Timing::Metrical(u15::new(TICKS_PER_QUARTER)), tracks);
}

pub fn write_midi_with_timing(path: &Path, timing: Timing, tracks: &[Vec<(u32, Ev)>]) {
    let mut smf = Smf::new(Header::new(Format::Parallel, timing));

    for events in tracks {
        let mut events = events.clone();
        events.sort_by_key(|(tick, _)| *tick);

        let mut track: Vec<TrackEvent<'static>> = Vec::new();
        let mut last_tick = 0;
        for (tick, ev) in events {
            track.push(TrackEvent {
                delta: u28::new(tick - last_tick),
                kind: ev.kind(),
            });
            last_tick = tick;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf.save(path).unwrap();
}
