/// MIDI output using midir - pitched sounds on channel 1, Tak/Slap/clicks as GM percussion
use log::warn;
use midir::{MidiOutput, MidiOutputConnection};

use crate::audio::SoundTrigger;
use crate::scale::Sound;
use crate::sequencer::ClickKind;

const CLIENT_NAME: &str = "GroovePan MIDI Output";

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
const MELODIC_CHANNEL: u8 = 0;
const PERCUSSION_CHANNEL: u8 = 9;

// General MIDI percussion keys
const SIDE_STICK: u8 = 37;
const HAND_CLAP: u8 = 39;
const HIGH_WOOD_BLOCK: u8 = 76;
const LOW_WOOD_BLOCK: u8 = 77;
const CLAVES: u8 = 75;

#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("failed to create MIDI output: {0}")]
    Init(#[from] midir::InitError),

    #[error("invalid port index {0}")]
    InvalidPort(usize),

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("failed to send: {0}")]
    Send(#[from] midir::SendError),
}

/// Channel and key a sound is sent on.
pub fn midi_message_for(sound: Sound) -> (u8, u8) {
    match sound {
        Sound::Ding(note) | Sound::Tone(note) => (MELODIC_CHANNEL, note),
        Sound::Tak => (PERCUSSION_CHANNEL, SIDE_STICK),
        Sound::Slap => (PERCUSSION_CHANNEL, HAND_CLAP),
    }
}

pub fn click_key(kind: ClickKind) -> u8 {
    match kind {
        ClickKind::Downbeat => CLAVES,
        ClickKind::Beat => HIGH_WOOD_BLOCK,
        ClickKind::Sub => LOW_WOOD_BLOCK,
    }
}

pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
    /// Notes still held, released before the next trigger
    held: Vec<(u8, u8)>,
}

impl MidiOutputDevice {
    pub fn new() -> Self {
        Self {
            connection: None,
            held: Vec::new(),
        }
    }

    pub fn available_ports() -> Vec<String> {
        match MidiOutput::new(CLIENT_NAME) {
            Ok(midi_out) => midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect(),
            Err(e) => {
                warn!("MIDI unavailable: {}", e);
                vec![]
            }
        }
    }

    pub fn connect(&mut self, port_index: usize) -> Result<(), MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or(MidiError::InvalidPort(port_index))?;

        let connection = midi_out
            .connect(port, "groovepan")
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        self.connection = Some(connection);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&[NOTE_ON | (channel & 0x0f), note, velocity])?;
        }
        Ok(())
    }

    pub fn send_note_off(&mut self, channel: u8, note: u8) -> Result<(), MidiError> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&[NOTE_OFF | (channel & 0x0f), note, 0])?;
        }
        Ok(())
    }

    /// Release every note still held.
    pub fn release_all(&mut self) -> Result<(), MidiError> {
        for (channel, note) in std::mem::take(&mut self.held) {
            self.send_note_off(channel, note)?;
        }
        Ok(())
    }

    fn strike(&mut self, channel: u8, note: u8, velocity: u8) {
        let result = self
            .release_all()
            .and_then(|_| self.send_note_on(channel, note, velocity));
        match result {
            Ok(()) => self.held.push((channel, note)),
            Err(e) => warn!("MIDI send failed: {}", e),
        }
    }

    pub fn disconnect(&mut self) {
        if let Err(e) = self.release_all() {
            warn!("MIDI release failed: {}", e);
        }
        self.connection = None;
    }
}

impl SoundTrigger for MidiOutputDevice {
    fn trigger(&mut self, sound: Sound) {
        let (channel, note) = midi_message_for(sound);
        self.strike(channel, note, 100);
    }

    fn click(&mut self, kind: ClickKind) {
        let velocity = if kind == ClickKind::Downbeat { 110 } else { 80 };
        self.strike(PERCUSSION_CHANNEL, click_key(kind), velocity);
    }
}

impl Default for MidiOutputDevice {
    fn default() -> Self {
        Self::new()
    }
}
