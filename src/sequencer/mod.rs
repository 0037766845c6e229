/// Core sequencer logic - label grid, selection and step management
/// The grid is a flat list of labeled slots, `measures * steps_per_measure` long
use std::sync::Arc;
use std::time::Duration;

use log::info;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::groove::{GrooveGenerator, GrooveReport, GrooveRequest, PoolStrategy, SlotRing};
use crate::storage::{PatternData, PATTERN_VERSION};

pub mod label;
pub mod playback;

pub use label::{Label, ParseLabelError};

pub const MIN_BPM: f32 = 40.0;
pub const MAX_BPM: f32 = 200.0;
pub const DEFAULT_BPM: f32 = 90.0;
/// Longest grid the editor will build.
pub const MAX_MEASURES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GridMode {
    #[default]
    #[serde(rename = "8")]
    Eighths,
    #[serde(rename = "16")]
    Sixteenths,
}

impl GridMode {
    pub fn steps_per_measure(self) -> usize {
        match self {
            GridMode::Eighths => 8,
            GridMode::Sixteenths => 16,
        }
    }

    pub fn steps_per_beat(self) -> usize {
        match self {
            GridMode::Eighths => 2,
            GridMode::Sixteenths => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridMode::Eighths => "8ths",
            GridMode::Sixteenths => "16ths",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GridMode::Eighths => GridMode::Sixteenths,
            GridMode::Sixteenths => GridMode::Eighths,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// First step of the pattern
    Downbeat,
    /// Start of any other beat
    Beat,
    Sub,
}

impl ClickKind {
    pub fn for_step(step: usize, beat_stride: usize) -> Self {
        if step == 0 {
            ClickKind::Downbeat
        } else if step % beat_stride.max(1) == 0 {
            ClickKind::Beat
        } else {
            ClickKind::Sub
        }
    }
}

/// What one playback step should sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub step: usize,
    pub label: Label,
    pub click: Option<ClickKind>,
}

impl Tick {
    pub fn at(labels: &[Label], step: usize, beat_stride: usize, metronome: bool) -> Self {
        Self {
            step,
            label: labels.get(step).copied().unwrap_or_default(),
            click: metronome.then(|| ClickKind::for_step(step, beat_stride)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    labels: Vec<Label>,
    mode: GridMode,
    measures: usize,
}

impl Grid {
    /// Build an empty grid. `measures` is clamped to `1..=MAX_MEASURES`.
    pub fn new(mode: GridMode, measures: usize) -> Self {
        let measures = measures.clamp(1, MAX_MEASURES);
        Self {
            labels: vec![Label::Empty; measures * mode.steps_per_measure()],
            mode,
            measures,
        }
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn measures(&self) -> usize {
        self.measures
    }

    pub fn steps_per_measure(&self) -> usize {
        self.mode.steps_per_measure()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Label {
        self.labels.get(index).copied().unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, label: Label) {
        if let Some(slot) = self.labels.get_mut(index) {
            *slot = label;
        }
    }

    pub fn clear(&mut self) {
        self.labels.fill(Label::Empty);
    }

    /// Switch mode and drop back to one measure, keeping labels that still fit.
    pub fn set_mode(&mut self, mode: GridMode) {
        self.mode = mode;
        self.measures = 1;
        self.rebuild();
    }

    pub fn set_measures(&mut self, measures: usize) {
        self.measures = measures.clamp(1, MAX_MEASURES);
        self.rebuild();
    }

    /// Append an empty measure. Does nothing at `MAX_MEASURES`.
    pub fn add_measure(&mut self) {
        self.set_measures(self.measures.saturating_add(1));
    }

    fn rebuild(&mut self) {
        self.labels
            .resize(self.measures * self.mode.steps_per_measure(), Label::Empty);
    }

    /// Counting caption for a step: `1 + 2 +` in 8ths, `1 e & a` in 16ths.
    pub fn step_caption(&self, index: usize) -> String {
        let per_beat = self.mode.steps_per_beat();
        let local = index % self.steps_per_measure();
        let beat = local / per_beat + 1;
        match (self.mode, local % per_beat) {
            (_, 0) => beat.to_string(),
            (GridMode::Eighths, _) => "+".to_string(),
            (GridMode::Sixteenths, 1) => "e".to_string(),
            (GridMode::Sixteenths, 2) => "&".to_string(),
            (GridMode::Sixteenths, _) => "a".to_string(),
        }
    }

    pub fn is_downbeat(&self, index: usize) -> bool {
        index % self.mode.steps_per_beat() == 0
    }

    pub fn hand(&self, index: usize) -> Hand {
        let right = match self.mode {
            GridMode::Eighths => index % 2 == 0,
            GridMode::Sixteenths => matches!(index % 4, 0 | 2),
        };
        if right {
            Hand::Right
        } else {
            Hand::Left
        }
    }
}

impl SlotRing for Grid {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn label(&self, index: usize) -> Label {
        self.get(index)
    }

    fn set_label(&mut self, index: usize, label: Label) {
        self.set(index, label);
    }
}

pub struct Sequencer {
    grid: Grid,
    grid_state: Arc<Mutex<Vec<Label>>>,
    current_position: usize,
    bpm: f32,
    selected: Option<usize>,
    compose: bool,
    metronome: bool,
    hand_split: bool,
}

impl Sequencer {
    pub fn new(mode: GridMode) -> Self {
        let grid = Grid::new(mode, 1);
        let initial_state = grid.labels.clone();

        Self {
            grid,
            grid_state: Arc::new(Mutex::new(initial_state)),
            current_position: 0,
            bpm: DEFAULT_BPM,
            selected: None,
            compose: false,
            metronome: false,
            hand_split: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access; call `update_grid_state` afterwards so playback sees the edit.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn grid_state(&self) -> &Arc<Mutex<Vec<Label>>> {
        &self.grid_state
    }

    pub fn update_grid_state(&mut self) {
        let mut shared = self.grid_state.lock();
        shared.clone_from(&self.grid.labels);
    }

    pub fn current_position(&self) -> usize {
        self.current_position
    }

    pub fn set_current_position(&mut self, pos: usize) {
        self.current_position = pos;
    }

    pub fn advance_position(&mut self) -> usize {
        self.current_position = (self.current_position + 1) % self.grid.len().max(1);
        self.current_position
    }

    /// Sound the current step and move on, wrapping over every measure.
    pub fn tick(&mut self) -> Tick {
        let step = self.current_position % self.grid.len().max(1);
        let tick = Tick::at(
            &self.grid.labels,
            step,
            self.grid.mode.steps_per_beat(),
            self.metronome,
        );
        self.current_position = step;
        self.advance_position();
        tick
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = if bpm.is_finite() {
            bpm.round().clamp(MIN_BPM, MAX_BPM)
        } else {
            DEFAULT_BPM
        };
    }

    /// Time between steps at the current tempo and grid resolution.
    pub fn step_duration(&self) -> Duration {
        let per_beat = self.grid.mode.steps_per_beat() as f32;
        Duration::from_secs_f32(60.0 / self.bpm / per_beat)
    }

    pub fn metronome(&self) -> bool {
        self.metronome
    }

    pub fn set_metronome(&mut self, on: bool) {
        self.metronome = on;
    }

    pub fn compose(&self) -> bool {
        self.compose
    }

    pub fn set_compose(&mut self, on: bool) {
        self.compose = on;
    }

    pub fn hand_split(&self) -> bool {
        self.hand_split
    }

    pub fn set_hand_split(&mut self, on: bool) {
        self.hand_split = on;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        if index < self.grid.len() {
            self.selected = Some(index);
        }
    }

    /// Clicking the selected slot again deselects it.
    pub fn toggle_selection(&mut self, index: usize) {
        if self.selected == Some(index) {
            self.clear_selection();
        } else {
            self.select(index);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move the selection by `delta` slots, wrapping around the grid.
    pub fn advance_selection(&mut self, delta: isize) {
        let total = self.grid.len() as isize;
        if let (Some(current), true) = (self.selected, total > 0) {
            let next = (current as isize + delta).rem_euclid(total);
            self.selected = Some(next as usize);
        }
    }

    /// Write `label` into the selected slot. In compose mode the selection
    /// then moves forward unless `advance` is false.
    pub fn write_to_selected(&mut self, label: Label, advance: bool) -> bool {
        let Some(index) = self.selected else {
            return false;
        };
        self.grid.set(index, label);
        self.update_grid_state();
        if self.compose && advance {
            self.advance_selection(1);
        }
        true
    }

    pub fn set_mode(&mut self, mode: GridMode) {
        if mode == self.grid.mode {
            return;
        }
        self.grid.set_mode(mode);
        self.selected = None;
        self.current_position = 0;
        self.update_grid_state();
    }

    pub fn add_measure(&mut self) {
        self.grid.add_measure();
        self.update_grid_state();
    }

    /// Erase every label and rewind playback.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.selected = None;
        self.current_position = 0;
        self.update_grid_state();
    }

    /// Pools for the metrical groove variant at the current resolution.
    pub fn metrical_pools(&self) -> PoolStrategy {
        PoolStrategy::Metrical {
            beat_stride: self.grid.mode.steps_per_beat(),
        }
    }

    pub fn generate_groove<R: Rng + ?Sized>(
        &mut self,
        generator: &GrooveGenerator,
        request: &GrooveRequest,
        rng: &mut R,
    ) -> GrooveReport {
        let report = generator.generate(&mut self.grid, request, rng);
        self.clear_selection();
        self.update_grid_state();
        report
    }

    pub fn to_pattern(&self) -> PatternData {
        PatternData {
            version: PATTERN_VERSION,
            mode: self.grid.mode,
            bpm: self.bpm,
            hand_split: self.hand_split,
            steps: self.grid.steps_per_measure(),
            measures: self.grid.measures,
            labels: self.grid.labels.clone(),
        }
    }

    pub fn apply_pattern(&mut self, pattern: &PatternData) {
        self.grid = Grid::new(pattern.mode, pattern.measures);
        for (i, &label) in pattern.labels.iter().take(self.grid.len()).enumerate() {
            self.grid.set(i, label);
        }
        self.set_bpm(pattern.bpm);
        self.hand_split = pattern.hand_split;
        self.selected = None;
        self.current_position = 0;
        self.update_grid_state();
        info!(
            "applied pattern: {} x {} steps at {} bpm",
            self.grid.measures,
            self.grid.mode.name(),
            self.bpm
        );
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(GridMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groove::AdjacencyMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(GridMode::Eighths, 1);
        assert_eq!(grid.len(), 8);
        let grid = Grid::new(GridMode::Sixteenths, 2);
        assert_eq!(grid.len(), 32);
        assert_eq!(Grid::new(GridMode::Eighths, 0).measures(), 1);
    }

    #[test]
    fn test_mode_switch_keeps_labels() {
        let mut grid = Grid::new(GridMode::Eighths, 2);
        grid.set(3, Label::Tak);
        grid.set(12, Label::Slap);
        grid.set_mode(GridMode::Sixteenths);
        assert_eq!(grid.measures(), 1);
        assert_eq!(grid.len(), 16);
        assert_eq!(grid.get(3), Label::Tak);
        assert_eq!(grid.get(12), Label::Slap);
        grid.set_mode(GridMode::Eighths);
        assert_eq!(grid.len(), 8);
        assert_eq!(grid.get(12), Label::Empty);
    }

    #[test]
    fn test_add_measure_keeps_labels() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        seq.select(5);
        seq.write_to_selected(Label::Ding, true);
        seq.add_measure();
        assert_eq!(seq.grid().len(), 16);
        assert_eq!(seq.grid().get(5), Label::Ding);
        assert_eq!(seq.grid_state().lock().len(), 16);
    }

    #[test]
    fn test_step_captions() {
        let grid = Grid::new(GridMode::Eighths, 2);
        let captions: Vec<String> = (0..8).map(|i| grid.step_caption(i)).collect();
        assert_eq!(captions, ["1", "+", "2", "+", "3", "+", "4", "+"]);
        assert_eq!(grid.step_caption(10), "2");

        let grid = Grid::new(GridMode::Sixteenths, 1);
        let captions: Vec<String> = (0..6).map(|i| grid.step_caption(i)).collect();
        assert_eq!(captions, ["1", "e", "&", "a", "2", "e"]);
    }

    #[test]
    fn test_hands_and_downbeats() {
        let grid = Grid::new(GridMode::Sixteenths, 1);
        assert_eq!(grid.hand(0), Hand::Right);
        assert_eq!(grid.hand(1), Hand::Left);
        assert_eq!(grid.hand(2), Hand::Right);
        assert!(grid.is_downbeat(4));
        assert!(!grid.is_downbeat(2));
        let grid = Grid::new(GridMode::Eighths, 1);
        assert_eq!(grid.hand(3), Hand::Left);
        assert!(grid.is_downbeat(2));
    }

    #[test]
    fn test_sequencer_advance() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        assert_eq!(seq.current_position(), 0);
        seq.advance_position();
        assert_eq!(seq.current_position(), 1);
        seq.set_current_position(7);
        assert_eq!(seq.advance_position(), 0);
    }

    #[test]
    fn test_tick_and_metronome() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        seq.grid_mut().set(0, Label::Ding);
        seq.set_metronome(true);
        let ticks: Vec<Tick> = (0..9).map(|_| seq.tick()).collect();
        assert_eq!(ticks[0].label, Label::Ding);
        assert_eq!(ticks[0].click, Some(ClickKind::Downbeat));
        assert_eq!(ticks[1].click, Some(ClickKind::Sub));
        assert_eq!(ticks[2].click, Some(ClickKind::Beat));
        assert_eq!(ticks[8].step, 0);

        seq.set_metronome(false);
        assert_eq!(seq.tick().click, None);
    }

    #[test]
    fn test_bpm_and_step_duration() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        seq.set_bpm(300.0);
        assert_eq!(seq.bpm(), MAX_BPM);
        seq.set_bpm(10.0);
        assert_eq!(seq.bpm(), MIN_BPM);
        seq.set_bpm(120.0);
        assert_eq!(seq.step_duration().as_millis(), 250);
        seq.set_mode(GridMode::Sixteenths);
        assert_eq!(seq.step_duration().as_millis(), 125);
    }

    #[test]
    fn test_compose_advance_wraps() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        assert!(!seq.write_to_selected(Label::Ding, true));

        seq.set_compose(true);
        seq.select(7);
        assert!(seq.write_to_selected(Label::Tak, true));
        assert_eq!(seq.grid().get(7), Label::Tak);
        assert_eq!(seq.selected(), Some(0));

        // Holding back the advance leaves the selection in place.
        seq.write_to_selected(Label::Ding, false);
        assert_eq!(seq.selected(), Some(0));

        seq.advance_selection(-1);
        assert_eq!(seq.selected(), Some(7));
    }

    #[test]
    fn test_selection_toggle_and_bounds() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        seq.select(20);
        assert_eq!(seq.selected(), None);
        seq.toggle_selection(2);
        assert_eq!(seq.selected(), Some(2));
        seq.toggle_selection(2);
        assert_eq!(seq.selected(), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        seq.select(1);
        seq.write_to_selected(Label::Slap, false);
        seq.tick();
        seq.clear();
        assert!(seq.grid().labels().iter().all(|l| l.is_empty()));
        assert_eq!(seq.selected(), None);
        assert_eq!(seq.current_position(), 0);
        assert!(seq.grid_state().lock().iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_generate_groove_clears_selection() {
        let mut seq = Sequencer::new(GridMode::Sixteenths);
        seq.select(3);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let request = GrooveRequest::new(3, 2, 2).with_adjacency(AdjacencyMode::Soft);
        seq.generate_groove(&GrooveGenerator::new(), &request, &mut rng);
        assert_eq!(seq.selected(), None);
        assert_eq!(seq.grid().get(0), Label::Ding);
        assert_eq!(*seq.grid_state().lock(), seq.grid().labels());
    }

    #[test]
    fn test_pattern_roundtrip_through_sequencer() {
        let mut seq = Sequencer::new(GridMode::Sixteenths);
        seq.add_measure();
        seq.set_bpm(104.0);
        seq.set_hand_split(true);
        seq.grid_mut().set(17, Label::Tone(4));
        let pattern = seq.to_pattern();
        assert_eq!(pattern.steps, 16);
        assert_eq!(pattern.measures, 2);

        let mut other = Sequencer::new(GridMode::Eighths);
        other.apply_pattern(&pattern);
        assert_eq!(other.grid(), seq.grid());
        assert_eq!(other.bpm(), 104.0);
        assert!(other.hand_split());
    }

    #[test]
    fn test_apply_pattern_pads_short_labels() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        let pattern = PatternData {
            version: PATTERN_VERSION,
            mode: GridMode::Eighths,
            bpm: 500.0,
            hand_split: false,
            steps: 8,
            measures: 0,
            labels: vec![Label::Ding, Label::Tak],
        };
        seq.apply_pattern(&pattern);
        assert_eq!(seq.grid().len(), 8);
        assert_eq!(seq.grid().get(1), Label::Tak);
        assert_eq!(seq.grid().get(2), Label::Empty);
        assert_eq!(seq.bpm(), MAX_BPM);
    }

    #[test]
    fn test_grid_length_is_bounded() {
        let grid = Grid::new(GridMode::Sixteenths, usize::MAX);
        assert_eq!(grid.measures(), MAX_MEASURES);
        assert_eq!(grid.len(), MAX_MEASURES * 16);

        let mut grid = Grid::new(GridMode::Eighths, MAX_MEASURES);
        grid.add_measure();
        assert_eq!(grid.measures(), MAX_MEASURES);
    }

    #[test]
    fn test_apply_pattern_with_huge_measure_count() {
        let mut seq = Sequencer::new(GridMode::Eighths);
        let pattern = PatternData {
            version: PATTERN_VERSION,
            mode: GridMode::Sixteenths,
            bpm: 90.0,
            hand_split: false,
            steps: 16,
            measures: 1_152_921_504_606_846_977,
            labels: vec![Label::Ding],
        };
        seq.apply_pattern(&pattern);
        assert_eq!(seq.grid().measures(), MAX_MEASURES);
        assert_eq!(seq.grid().get(0), Label::Ding);
    }
}
