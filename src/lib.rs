//! GroovePan - a handpan step sequencer library
//!
//! This library provides the core components of the handpan pattern editor:
//! - Label grid in 8ths or 16ths with any number of measures
//! - Groove generation with adjacency-aware accent placement
//! - Playback engine for timing and triggers
//! - Audio and MIDI output keyed by label
//! - Pattern persistence and user preferences

pub mod audio;
pub mod config;
pub mod groove;
pub mod midi;
pub mod scale;
pub mod sequencer;
pub mod storage;

// Re-export commonly used types
pub use audio::{AudioOutput, SoundTrigger};
pub use config::Preferences;
pub use groove::{
    generate, AccentCounts, AdjacencyMode, GrooveError, GrooveGenerator, GrooveReport,
    GrooveRequest, PoolStrategy, SlotRing, Tier,
};
pub use midi::{MidiError, MidiOutputDevice};
pub use scale::{midi_note_name, Scale, Sound, SCALES};
pub use sequencer::playback::{PlaybackEngine, PlaybackEvent};
pub use sequencer::{ClickKind, Grid, GridMode, Label, Sequencer};
pub use storage::{FileStore, MemoryStore, PatternData, PatternStore, StoreError};
