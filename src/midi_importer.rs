use crate::error::{PicassoError, Result};
use crate::model::params::GeneralParams;
use crate::model::song::*;
use log::{debug, info, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_MPQN: u32 = 500_000;
const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// Instrument and program every normalized note is forced onto.
pub const NORMALIZED_INSTRUMENT: u32 = 1;
pub const NORMALIZED_PROGRAM: u8 = 0;

/// Cleanup switches applied after a MIDI file has been read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub use_drum: bool,
    pub sustain: bool,
    pub max_length: f64,
}

impl From<&GeneralParams> for NormalizeOptions {
    fn from(params: &GeneralParams) -> Self {
        Self {
            use_drum: params.use_drum,
            sustain: params.sustain,
            max_length: params.max_length,
        }
    }
}

struct NoteInterval {
    pitch: u8,
    velocity: u8,
    start_tick: u64,
    end_tick: u64,
    channel: u8,
    instrument: u32,
    program: u8,
}

struct OpenNote {
    start_tick: u64,
    velocity: u8,
    program: u8,
}

struct RawControl {
    tick: u64,
    channel: u8,
    instrument: u32,
    control: u8,
    value: u8,
}

#[derive(Debug, Clone)]
struct TempoSegment {
    mpqn: u32,
    start_tick: u64,
    seconds_at_start: f64,
}

/// Converts absolute ticks to seconds for either header timing mode.
enum TickClock {
    Metrical {
        ticks_per_quarter: u64,
        segments: Vec<TempoSegment>,
    },
    Timecode {
        seconds_per_tick: f64,
    },
}

impl TickClock {
    fn metrical(ticks_per_quarter: u64, mut tempo_changes: Vec<(u64, u32)>) -> Self {
        // stable sort keeps the default tempo ahead of any tempo event at tick 0
        tempo_changes.sort_by_key(|(tick, _)| *tick);

        let mut last_tick: u64 = 0;
        let mut last_mpqn: u32 = DEFAULT_MPQN;
        let mut seconds: f64 = 0.0;
        let mut segments = Vec::with_capacity(tempo_changes.len());

        for (tick, mpqn) in tempo_changes.into_iter() {
            if tick > last_tick {
                seconds += Self::ticks_to_seconds(tick - last_tick, last_mpqn, ticks_per_quarter);
            }

            segments.push(TempoSegment {
                mpqn,
                start_tick: tick,
                seconds_at_start: seconds,
            });

            last_tick = tick;
            last_mpqn = mpqn;
        }

        TickClock::Metrical {
            ticks_per_quarter,
            segments,
        }
    }

    fn ticks_to_seconds(ticks: u64, mpqn: u32, ticks_per_quarter: u64) -> f64 {
        ticks as f64 * mpqn as f64 / ticks_per_quarter as f64 / MICROSECONDS_PER_SECOND
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            TickClock::Metrical {
                ticks_per_quarter,
                segments,
            } => {
                let Some(segment) = segments.iter().rfind(|seg| seg.start_tick <= tick) else {
                    return Self::ticks_to_seconds(tick, DEFAULT_MPQN, *ticks_per_quarter);
                };

                segment.seconds_at_start
                    + Self::ticks_to_seconds(
                        tick - segment.start_tick,
                        segment.mpqn,
                        *ticks_per_quarter,
                    )
            }
            TickClock::Timecode { seconds_per_tick } => tick as f64 * seconds_per_tick,
        }
    }

    /// How long an unterminated note at the very end of the file is held, in ticks.
    fn fallback_ticks(&self) -> u64 {
        match self {
            TickClock::Metrical {
                ticks_per_quarter, ..
            } => *ticks_per_quarter,
            TickClock::Timecode { seconds_per_tick } => (1.0 / seconds_per_tick).round() as u64,
        }
    }
}

/// Reads a MIDI file and applies every normalization step in order.
pub fn normalize_midi_file<P: AsRef<Path>>(
    path: P,
    options: &NormalizeOptions,
) -> Result<NoteSequence> {
    let sequence = load_note_sequence(path)?;
    Ok(normalize_sequence(sequence, options))
}

pub fn load_note_sequence<P: AsRef<Path>>(path: P) -> Result<NoteSequence> {
    let bytes = fs::read(path.as_ref())
        .map_err(|e| PicassoError::decode(path.as_ref(), format!("failed to read: {}", e)))?;

    midi_bytes_to_sequence(&bytes, path.as_ref())
}

fn midi_bytes_to_sequence(bytes: &[u8], source_path: &Path) -> Result<NoteSequence> {
    let smf = Smf::parse(bytes).map_err(|e| PicassoError::decode(source_path, e.to_string()))?;

    debug!(
        "MIDI format: {:?}, tracks: {}",
        smf.header.format,
        smf.tracks.len()
    );

    let mut tempo_changes: Vec<(u64, u32)> = Vec::new();
    tempo_changes.push((0u64, DEFAULT_MPQN)); // default tempo to 120bpm until a tempo meta appears

    let mut intervals: Vec<NoteInterval> = Vec::new();
    let mut unclosed: Vec<NoteInterval> = Vec::new();
    let mut controls: Vec<RawControl> = Vec::new();
    let mut last_tick_seen: u64 = 0;

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let instrument = track_idx as u32;
        let mut abs_tick: u64 = 0;
        let mut programs: [u8; 16] = [0; 16];
        let mut open_notes: HashMap<(u8, u8), Vec<OpenNote>> = HashMap::new();

        for event in track.iter() {
            abs_tick = abs_tick.saturating_add(event.delta.as_int() as u64);

            match &event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micro)) => {
                    let mpqn: u32 = micro.as_int();
                    tempo_changes.push((abs_tick, mpqn));
                    debug!(
                        "Tempo change at tick {} -> {} us/qn (track {})",
                        abs_tick, mpqn, track_idx
                    );
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch: u8 = channel.as_int();

                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open_notes
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push(OpenNote {
                                    start_tick: abs_tick,
                                    velocity: vel.as_int(),
                                    program: programs[ch as usize],
                                });
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            close_note(
                                &mut open_notes,
                                &mut intervals,
                                instrument,
                                ch,
                                key.as_int(),
                                abs_tick,
                            );
                        }
                        MidiMessage::ProgramChange { program } => {
                            programs[ch as usize] = program.as_int();
                        }
                        MidiMessage::Controller { controller, value } => {
                            controls.push(RawControl {
                                tick: abs_tick,
                                channel: ch,
                                instrument,
                                control: controller.as_int(),
                                value: value.as_int(),
                            });
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        last_tick_seen = last_tick_seen.max(abs_tick);

        for ((ch, key), stack) in open_notes.into_iter() {
            for open in stack {
                unclosed.push(NoteInterval {
                    pitch: key,
                    velocity: open.velocity,
                    start_tick: open.start_tick,
                    end_tick: open.start_tick,
                    channel: ch,
                    instrument,
                    program: open.program,
                });
            }
        }
    }

    let clock = match smf.header.timing {
        Timing::Metrical(t) => {
            let ticks_per_quarter = t.as_int() as u64;
            if ticks_per_quarter == 0 {
                return Err(PicassoError::decode(
                    source_path,
                    "header declares zero ticks per quarter note",
                ));
            }
            debug!("Ticks per quarter note: {}", ticks_per_quarter);
            TickClock::metrical(ticks_per_quarter, tempo_changes)
        }
        Timing::Timecode(fps, subframe) => {
            let ticks_per_second = fps.as_f32() as f64 * subframe as f64;
            if ticks_per_second <= 0.0 {
                return Err(PicassoError::decode(
                    source_path,
                    "header declares zero SMPTE subframes",
                ));
            }
            debug!("SMPTE timing: {} ticks per second", ticks_per_second);
            TickClock::Timecode {
                seconds_per_tick: 1.0 / ticks_per_second,
            }
        }
    };

    for mut interval in unclosed.into_iter() {
        interval.end_tick = if last_tick_seen > interval.start_tick {
            last_tick_seen
        } else {
            interval.start_tick + clock.fallback_ticks()
        };

        warn!(
            "Unclosed NoteOn for {}, channel: {} at tick: {} auto-closing at: {}..!",
            interval.pitch, interval.channel, interval.start_tick, interval.end_tick
        );
        intervals.push(interval);
    }

    let mut sequence = NoteSequence {
        notes: intervals
            .into_iter()
            .map(|interval| Note {
                pitch: interval.pitch,
                velocity: interval.velocity,
                start_time: clock.seconds_at(interval.start_tick),
                end_time: clock.seconds_at(interval.end_tick),
                is_drum: interval.channel == DRUM_CHANNEL,
                channel: interval.channel,
                instrument: interval.instrument,
                program: interval.program,
            })
            .collect(),
        control_changes: controls
            .into_iter()
            .map(|control| ControlChange {
                time: clock.seconds_at(control.tick),
                channel: control.channel,
                instrument: control.instrument,
                control: control.control,
                value: control.value,
            })
            .collect(),
        total_time: 0.0,
        source: source_path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string()),
    };

    sequence.sort_notes();
    sequence
        .control_changes
        .sort_by(|a, b| a.time.total_cmp(&b.time));
    sequence.total_time = sequence.max_end_time();

    debug!(
        "Read {} notes and {} control changes spanning {:.3}s",
        sequence.notes.len(),
        sequence.control_changes.len(),
        sequence.total_time
    );

    Ok(sequence)
}

fn close_note(
    open_notes: &mut HashMap<(u8, u8), Vec<OpenNote>>,
    intervals: &mut Vec<NoteInterval>,
    instrument: u32,
    ch: u8,
    pitch: u8,
    abs_tick: u64,
) {
    let Some(open) = open_notes.get_mut(&(ch, pitch)).and_then(|stack| stack.pop()) else {
        debug!(
            "Orphaned NoteOff for {} ch{} at tick {}..!",
            pitch, ch, abs_tick
        );
        return;
    };

    intervals.push(NoteInterval {
        pitch,
        velocity: open.velocity,
        start_tick: open.start_tick,
        end_tick: abs_tick,
        channel: ch,
        instrument,
        program: open.program,
    });
}

/// Sustain, truncation, drum removal and instrument flattening, in that order.
///
/// Running it twice with the same options gives the same sequence as running it once.
pub fn normalize_sequence(mut sequence: NoteSequence, options: &NormalizeOptions) -> NoteSequence {
    if options.sustain {
        apply_sustain(&mut sequence);
    }

    if sequence.total_time > options.max_length {
        warn!(
            "Note sequence {:.3}s is longer than max seconds {:.3}, truncating.",
            sequence.total_time, options.max_length
        );
        truncate(&mut sequence, options.max_length);
    }

    if sequence.has_drums() && !options.use_drum {
        warn!("Midi file contains drum sounds, removing.");
        sequence.notes.retain(|note| !note.is_drum);
    }

    for note in sequence.notes.iter_mut() {
        note.instrument = NORMALIZED_INSTRUMENT;
        note.program = NORMALIZED_PROGRAM;
    }

    info!(
        "Normalized sequence has {} notes over {:.3}s",
        sequence.notes.len(),
        sequence.total_time
    );

    sequence
}

/// Pressed-pedal windows per channel, as `[down, up)` pairs. A pedal that is never released
/// stays down until `horizon`.
fn sustain_windows(control_changes: &[ControlChange], horizon: f64) -> HashMap<u8, Vec<(f64, f64)>> {
    let mut windows: HashMap<u8, Vec<(f64, f64)>> = HashMap::new();
    let mut pressed: HashMap<u8, f64> = HashMap::new();

    for cc in control_changes
        .iter()
        .filter(|cc| cc.control == SUSTAIN_CONTROL)
    {
        if cc.value >= 64 {
            pressed.entry(cc.channel).or_insert(cc.time);
        } else if let Some(down) = pressed.remove(&cc.channel) {
            push_window(windows.entry(cc.channel).or_default(), down, cc.time);
        }
    }

    for (channel, down) in pressed.into_iter() {
        push_window(windows.entry(channel).or_default(), down, horizon);
    }

    windows
}

fn push_window(windows: &mut Vec<(f64, f64)>, down: f64, up: f64) {
    if up <= down {
        return;
    }

    match windows.last_mut() {
        // a release and re-press at the same instant is one continuous hold
        Some(last) if down <= last.1 => last.1 = last.1.max(up),
        _ => windows.push((down, up)),
    }
}

fn apply_sustain(sequence: &mut NoteSequence) {
    let horizon = sequence
        .control_changes
        .iter()
        .map(|cc| cc.time)
        .fold(sequence.total_time, f64::max);
    let windows = sustain_windows(&sequence.control_changes, horizon);

    if windows.is_empty() {
        return;
    }

    let original_ends: Vec<f64> = sequence.notes.iter().map(|note| note.end_time).collect();
    let mut extended = 0;

    for note in sequence.notes.iter_mut() {
        let Some(held) = windows.get(&note.channel) else {
            continue;
        };

        if let Some(&(_, up)) = held
            .iter()
            .find(|(down, up)| *down <= note.end_time && note.end_time < *up)
        {
            note.end_time = up;
            extended += 1;
        }
    }

    // a sustained note stops ringing once the same key is struck again
    for i in 0..sequence.notes.len() {
        if sequence.notes[i].end_time == original_ends[i] {
            continue;
        }

        let current = sequence.notes[i];
        let restrike = sequence.notes[i + 1..]
            .iter()
            .filter(|next| {
                next.channel == current.channel
                    && next.pitch == current.pitch
                    && next.start_time > current.start_time
                    && next.start_time < current.end_time
            })
            .map(|next| next.start_time)
            .reduce(f64::min);

        if let Some(cut) = restrike {
            sequence.notes[i].end_time = cut.max(original_ends[i]);
        }
    }

    sequence.total_time = sequence.total_time.max(sequence.max_end_time());
    debug!("Sustain pedal extended {} notes", extended);
}

fn truncate(sequence: &mut NoteSequence, max_length: f64) {
    sequence.notes.retain(|note| note.start_time < max_length);
    for note in sequence.notes.iter_mut() {
        note.end_time = note.end_time.min(max_length);
    }

    sequence
        .control_changes
        .retain(|cc| cc.time < max_length);
    sequence.total_time = max_length;
}
