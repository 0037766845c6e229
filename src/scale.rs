//! Handpan scales and label-to-sound mapping.
//!
//! A scale names the ding pitch and the eight numbered tone fields. Note
//! names use sample-file spelling: `Cs4` for C#4, `Bb3` for B flat.

use crate::sequencer::Label;

/// What a label sounds like on a given scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Centre note, MIDI pitch
    Ding(u8),
    /// Numbered tone field, MIDI pitch
    Tone(u8),
    Tak,
    Slap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub name: &'static str,
    pub ding: &'static str,
    pub tones: [&'static str; 8],
}

pub static SCALES: [Scale; 4] = [
    Scale {
        name: "D Kurd",
        ding: "D3",
        tones: ["A3", "Bb3", "C4", "D4", "E4", "F4", "G4", "A4"],
    },
    Scale {
        name: "D Major",
        ding: "D3",
        tones: ["G3", "A3", "B3", "Cs4", "D4", "E4", "Fs4", "A4"],
    },
    Scale {
        name: "D Amara",
        ding: "D3",
        tones: ["A3", "C4", "D4", "E4", "F4", "G4", "A4", "C5"],
    },
    Scale {
        name: "B Celtic",
        ding: "B3",
        tones: ["Fs3", "A3", "B3", "Cs4", "D4", "E4", "Fs4", "B4"],
    },
];

impl Scale {
    /// Look up a scale by name, falling back to the first one.
    pub fn by_name(name: &str) -> &'static Scale {
        SCALES.iter().find(|s| s.name == name).unwrap_or(&SCALES[0])
    }

    pub fn ding_pitch(&self) -> Option<u8> {
        parse_note(self.ding)
    }

    /// Pitch of tone field `n` (1 to 8).
    pub fn tone_pitch(&self, n: u8) -> Option<u8> {
        let index = usize::from(n).checked_sub(1)?;
        self.tones.get(index).and_then(|note| parse_note(note))
    }

    /// Ghosts, `0` and `9` are silent.
    pub fn sound_for(&self, label: Label) -> Option<Sound> {
        match label {
            Label::Ding => self.ding_pitch().map(Sound::Ding),
            Label::Tak => Some(Sound::Tak),
            Label::Slap => Some(Sound::Slap),
            Label::Tone(n) => self.tone_pitch(n).map(Sound::Tone),
            Label::Empty => None,
        }
    }
}

/// Parse a note name such as `D3`, `Bb3`, `Cs4` or `F#4` into a MIDI pitch.
pub fn parse_note(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let base: i32 = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest = chars.as_str();
    let (shift, octave) = match rest.chars().next()? {
        's' | '#' => (1, &rest[1..]),
        'b' => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave.parse().ok()?;
    let pitch = (octave + 1) * 12 + base + shift;
    u8::try_from(pitch).ok().filter(|p| *p <= 127)
}

pub fn midi_note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note() {
        assert_eq!(parse_note("A4"), Some(69));
        assert_eq!(parse_note("D3"), Some(50));
        assert_eq!(parse_note("Cs4"), Some(61));
        assert_eq!(parse_note("F#4"), Some(66));
        assert_eq!(parse_note("Bb3"), Some(58));
        assert_eq!(parse_note("H2"), None);
        assert_eq!(parse_note("C"), None);
        assert_eq!(parse_note("G12"), None);
    }

    #[test]
    fn test_sounds_for_labels() {
        let kurd = Scale::by_name("D Kurd");
        assert_eq!(kurd.sound_for(Label::Ding), Some(Sound::Ding(50)));
        assert_eq!(kurd.sound_for(Label::Tone(1)), Some(Sound::Tone(57)));
        assert_eq!(kurd.sound_for(Label::Tone(8)), Some(Sound::Tone(69)));
        assert_eq!(kurd.sound_for(Label::Tone(0)), None);
        assert_eq!(kurd.sound_for(Label::Tone(9)), None);
        assert_eq!(kurd.sound_for(Label::Slap), Some(Sound::Slap));
        assert_eq!(kurd.sound_for(Label::Empty), None);
    }

    #[test]
    fn test_every_scale_parses() {
        for scale in &SCALES {
            assert!(scale.ding_pitch().is_some(), "{}", scale.name);
            for n in 1..=8 {
                assert!(scale.tone_pitch(n).is_some(), "{} tone {n}", scale.name);
            }
        }
    }

    #[test]
    fn test_unknown_scale_falls_back() {
        assert_eq!(Scale::by_name("Hijaz").name, "D Kurd");
        assert_eq!(Scale::by_name("B Celtic").ding, "B3");
    }

    #[test]
    fn test_note_helpers() {
        assert_eq!(midi_note_name(61), "C#4");
        assert!((midi_note_to_frequency(69) - 440.0).abs() < 1e-3);
    }
}
