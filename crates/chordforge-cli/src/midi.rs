//! MIDI output for finished compositions.
//!
//! Converts a [`Composition`] into a Standard MIDI File: one track for the
//! chord blocks (with a text marker naming each chord), plus one track per
//! generated part. Output is SMF Format 1 (multi-track), 480 ticks per
//! quarter note, everything on channel 0.

use anyhow::{Context, Result};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::fs;
use std::path::Path;

use chordforge_engine::{Composition, NoteEvent};

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

const CHORD_VELOCITY: u8 = 85;
const BASS_VELOCITY: u8 = 110;
const MELODY_VELOCITY: u8 = 100;

const CHANNEL: u4 = u4::new(0);

/// Convert beats to ticks on the shared grid.
fn ticks(beats: f64) -> u32 {
    (beats * f64::from(TICKS_PER_QUARTER)).round() as u32
}

/// Write a composition to a MIDI file.
pub fn write_midi(
    composition: &Composition,
    bpm: u16,
    embed_tempo: bool,
    path: &Path,
) -> Result<()> {
    let bytes = midi_bytes(composition, bpm, embed_tempo)?;
    fs::write(path, &bytes)
        .with_context(|| format!("failed to write MIDI file: {}", path.display()))?;
    Ok(())
}

/// Encode a composition as in-memory SMF bytes.
pub fn midi_bytes(composition: &Composition, bpm: u16, embed_tempo: bool) -> Result<Vec<u8>> {
    let key = &composition.key_name;
    let chord_name = format!("Chords ({})", key);
    let bass_name = format!("Bass ({})", key);
    let arp_name = format!("Arp ({})", key);
    let melody_name = format!("Melody ({})", key);

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    smf.tracks
        .push(chord_track(composition, &chord_name, bpm, embed_tempo));
    if let Some(events) = &composition.bass {
        smf.tracks.push(note_track(&bass_name, events, BASS_VELOCITY));
    }
    if let Some(events) = &composition.arp {
        // Arp events carry their own velocities; the default never applies.
        smf.tracks.push(note_track(&arp_name, events, MELODY_VELOCITY));
    }
    if let Some(events) = &composition.melody {
        smf.tracks
            .push(note_track(&melody_name, events, MELODY_VELOCITY));
    }

    let mut buf = Vec::new();
    smf.write_std(&mut buf).context("failed to encode MIDI data")?;
    Ok(buf)
}

/// An absolutely-timed event with a same-tick ordering rank.
///
/// Rank 0 is meta (names, tempo, markers), rank 1 note-offs, rank 2 note-ons,
/// so releases always precede re-attacks of the same pitch on one tick.
type Timed<'a> = (u32, u8, TrackEventKind<'a>);

fn note_on(pitch: u8, velocity: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: CHANNEL,
        message: MidiMessage::NoteOn {
            key: u7::new(pitch),
            vel: u7::new(velocity),
        },
    }
}

fn note_off(pitch: u8) -> TrackEventKind<'static> {
    TrackEventKind::Midi {
        channel: CHANNEL,
        message: MidiMessage::NoteOff {
            key: u7::new(pitch),
            vel: u7::new(0),
        },
    }
}

/// Sort timed events and convert absolute ticks to deltas.
fn finish(mut timed: Vec<Timed<'_>>) -> Track<'_> {
    timed.sort_by_key(|(tick, rank, _)| (*tick, *rank));
    let mut track = Vec::with_capacity(timed.len() + 1);
    let mut last_tick = 0;
    for (tick, _, kind) in timed {
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// The chord track: name, optional tempo, and each chord block's marker plus
/// full-duration notes.
fn chord_track<'a>(
    composition: &'a Composition,
    name: &'a str,
    bpm: u16,
    embed_tempo: bool,
) -> Track<'a> {
    let mut timed: Vec<Timed<'a>> = vec![(
        0,
        0,
        TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    )];
    if embed_tempo {
        let microseconds = 60_000_000 / u32::from(bpm.max(1));
        timed.push((
            0,
            0,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(microseconds))),
        ));
    }

    for block in &composition.chords {
        let start = ticks(block.start_beats);
        let end = ticks(block.start_beats + block.duration_beats).max(start + 1);
        timed.push((
            start,
            0,
            TrackEventKind::Meta(MetaMessage::Text(block.name.as_bytes())),
        ));
        for &pitch in &block.pitches {
            timed.push((start, 2, note_on(pitch, CHORD_VELOCITY)));
            timed.push((end, 1, note_off(pitch)));
        }
    }
    finish(timed)
}

/// A part track built from timed note events.
fn note_track<'a>(name: &'a str, events: &[NoteEvent], default_velocity: u8) -> Track<'a> {
    let mut timed: Vec<Timed<'a>> = vec![(
        0,
        0,
        TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    )];
    for event in events {
        let start = ticks(event.start_beats);
        let end = ticks(event.start_beats + event.duration_beats).max(start + 1);
        let velocity = event.velocity.unwrap_or(default_velocity);
        timed.push((start, 2, note_on(event.pitch, velocity)));
        timed.push((end, 1, note_off(event.pitch)));
    }
    finish(timed)
}
