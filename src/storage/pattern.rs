//! Saved pattern record and its JSON form

use serde::{Deserialize, Serialize};

use crate::sequencer::{GridMode, Label, DEFAULT_BPM, MAX_MEASURES};

pub const PATTERN_VERSION: u32 = 1;

/// Everything needed to restore a grid: resolution, length, tempo and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternData {
    #[serde(default = "default_version")]
    pub version: u32,
    pub mode: GridMode,
    #[serde(default = "default_bpm")]
    pub bpm: f32,
    #[serde(default)]
    pub hand_split: bool,
    /// Steps per measure; `0` in imported JSON means "take it from `mode`".
    #[serde(default)]
    pub steps: usize,
    #[serde(default = "default_measures")]
    pub measures: usize,
    pub labels: Vec<Label>,
}

fn default_version() -> u32 {
    PATTERN_VERSION
}

fn default_bpm() -> f32 {
    DEFAULT_BPM
}

fn default_measures() -> usize {
    1
}

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("that pattern JSON does not look valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pattern version {0} is newer than this editor understands")]
    UnsupportedVersion(u32),

    #[error("a pattern needs 1 to {max} measures, not {0}", max = MAX_MEASURES)]
    MeasuresOutOfRange(usize),

    #[error("{steps} steps per measure does not match {mode}")]
    StepsMismatch { steps: usize, mode: &'static str },
}

impl PatternData {
    /// Parse pattern JSON as exported by `to_json`.
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let mut pattern: PatternData = serde_json::from_str(json)?;
        if pattern.version > PATTERN_VERSION {
            return Err(PatternError::UnsupportedVersion(pattern.version));
        }
        if !(1..=MAX_MEASURES).contains(&pattern.measures) {
            return Err(PatternError::MeasuresOutOfRange(pattern.measures));
        }

        let expected = pattern.mode.steps_per_measure();
        match pattern.steps {
            0 => pattern.steps = expected,
            steps if steps != expected => {
                return Err(PatternError::StepsMismatch {
                    steps,
                    mode: pattern.mode.name(),
                })
            }
            _ => {}
        }
        Ok(pattern)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of labeled (non-ghost) slots.
    pub fn accent_count(&self) -> usize {
        self.labels.iter().filter(|l| !l.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_editor_json() {
        let json = r#"{
            "version": 1,
            "mode": "16",
            "bpm": 96,
            "handSplit": true,
            "steps": 16,
            "measures": 1,
            "labels": ["D","","T","","S","","3","", "","","","","","","",""]
        }"#;
        let pattern = PatternData::from_json(json).unwrap();
        assert_eq!(pattern.mode, GridMode::Sixteenths);
        assert_eq!(pattern.bpm, 96.0);
        assert!(pattern.hand_split);
        assert_eq!(pattern.labels[6], Label::Tone(3));
        assert_eq!(pattern.accent_count(), 4);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let pattern = PatternData::from_json(r#"{"mode":"8","labels":["D"]}"#).unwrap();
        assert_eq!(pattern.version, PATTERN_VERSION);
        assert_eq!(pattern.measures, 1);
        assert_eq!(pattern.steps, 8);
        assert_eq!(pattern.bpm, DEFAULT_BPM);
        assert!(!pattern.hand_split);
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(matches!(PatternData::from_json("not json"), Err(PatternError::Json(_))));
        assert!(PatternData::from_json(r#"{"labels":[]}"#).is_err());
        assert!(PatternData::from_json(r#"{"mode":"8","labels":["X"]}"#).is_err());
        assert!(matches!(
            PatternData::from_json(r#"{"version":9,"mode":"8","labels":[]}"#),
            Err(PatternError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_rejects_oversized_grids() {
        let huge = r#"{"mode":"16","measures":1152921504606846977,"labels":["D"]}"#;
        assert!(matches!(
            PatternData::from_json(huge),
            Err(PatternError::MeasuresOutOfRange(1152921504606846977))
        ));
        assert!(matches!(
            PatternData::from_json(r#"{"mode":"8","measures":0,"labels":[]}"#),
            Err(PatternError::MeasuresOutOfRange(0))
        ));
        let at_limit = format!(r#"{{"mode":"8","measures":{MAX_MEASURES},"labels":[]}}"#);
        assert!(PatternData::from_json(&at_limit).is_ok());
    }

    #[test]
    fn test_steps_must_match_mode() {
        assert!(matches!(
            PatternData::from_json(r#"{"mode":"16","steps":8,"labels":[]}"#),
            Err(PatternError::StepsMismatch { steps: 8, .. })
        ));
        let pattern = PatternData::from_json(r#"{"mode":"16","labels":[]}"#).unwrap();
        assert_eq!(pattern.steps, 16);
    }

    #[test]
    fn test_export_uses_editor_keys() {
        let pattern = PatternData {
            version: PATTERN_VERSION,
            mode: GridMode::Eighths,
            bpm: 90.0,
            hand_split: false,
            steps: 8,
            measures: 1,
            labels: vec![Label::Ding; 8],
        };
        let json = pattern.to_json().unwrap();
        assert!(json.contains("\"handSplit\": false"));
        assert!(json.contains("\"mode\": \"8\""));
        assert_eq!(PatternData::from_json(&json).unwrap(), pattern);
    }
}
