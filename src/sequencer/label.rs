/// Accent labels written into grid slots
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Label {
    /// Unlabeled slot, drawn as a ghost note
    #[default]
    Empty,
    Ding,
    Tak,
    Slap,
    /// Numbered tone field, `0..=9`. Build with [`Label::tone`] to check the range.
    Tone(u8),
}

impl Label {
    pub const ACCENTS: [Label; 3] = [Label::Ding, Label::Tak, Label::Slap];

    pub fn tone(n: u8) -> Option<Self> {
        (n <= 9).then_some(Label::Tone(n))
    }

    pub fn is_empty(self) -> bool {
        self == Label::Empty
    }

    pub fn is_valid(self) -> bool {
        !matches!(self, Label::Tone(n) if n > 9)
    }

    pub fn as_str(self) -> &'static str {
        debug_assert!(self.is_valid(), "tone out of range: {:?}", self);
        const TONES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
        match self {
            Label::Empty => "",
            Label::Ding => "D",
            Label::Tak => "T",
            Label::Slap => "S",
            Label::Tone(n) => TONES.get(n as usize).copied().unwrap_or(""),
        }
    }

    /// Map a typed key to a label. `d`, `t`, `s` (any case) and digits are
    /// labels; `g` and space clear the slot.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'd' => Some(Label::Ding),
            't' => Some(Label::Tak),
            's' => Some(Label::Slap),
            'g' | ' ' => Some(Label::Empty),
            c => c.to_digit(10).map(|n| Label::Tone(n as u8)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(Label::Empty),
            "D" | "d" => Ok(Label::Ding),
            "T" | "t" => Ok(Label::Tak),
            "S" | "s" => Ok(Label::Slap),
            other => {
                let mut chars = other.chars();
                match (chars.next().and_then(|c| c.to_digit(10)), chars.next()) {
                    (Some(n), None) => Ok(Label::Tone(n as u8)),
                    _ => Err(ParseLabelError(s.to_string())),
                }
            }
        }
    }
}

impl TryFrom<String> for Label {
    type Error = ParseLabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Label::Tone(n) if n > 9 => Err(serde::ser::Error::custom(format!(
                "tone {n} is outside 0-9"
            ))),
            label => serializer.serialize_str(label.as_str()),
        }
    }
}
