/// Groove generator - fills a slot ring with Ding/Tak/Slap accents
///
/// Slot 0 is always a Ding. The remaining accents are placed either by the
/// placement policy (Dings, then Taks, then Slaps, all sharing one used set)
/// or, in fully random mode, by shuffling labels onto shuffled slots.
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sequencer::Label;

pub mod placement;

pub use placement::{AdjacencyMode, Placement, PlacementPolicy, UsedSet, DEFAULT_SOFT_REJECT};

/// Empty slots kept by tier-generated grooves.
pub const MIN_EMPTY_SLOTS: usize = 3;

/// Fixed-size sequence of labeled slots the generator writes into.
pub trait SlotRing {
    fn len(&self) -> usize;
    fn label(&self, index: usize) -> Label;
    fn set_label(&mut self, index: usize, label: Label);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear every slot to `Label::Empty`.
    fn reset(&mut self) {
        for i in 0..self.len() {
            self.set_label(i, Label::Empty);
        }
    }
}

impl SlotRing for [Label] {
    fn len(&self) -> usize {
        <[Label]>::len(self)
    }

    fn label(&self, index: usize) -> Label {
        self.get(index).copied().unwrap_or_default()
    }

    fn set_label(&mut self, index: usize, label: Label) {
        if let Some(slot) = self.get_mut(index) {
            *slot = label;
        }
    }
}

impl SlotRing for Vec<Label> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn label(&self, index: usize) -> Label {
        self.as_slice().label(index)
    }

    fn set_label(&mut self, index: usize, label: Label) {
        self.as_mut_slice().set_label(index, label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrooveError {
    #[error("D + T + S cannot exceed {slots} (got {requested})")]
    TooManyAccents { requested: usize, slots: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccentCounts {
    pub ding: usize,
    pub tak: usize,
    pub slap: usize,
}

impl AccentCounts {
    pub fn new(ding: usize, tak: usize, slap: usize) -> Self {
        Self { ding, tak, slap }
    }

    pub fn total(&self) -> usize {
        self.ding + self.tak + self.slap
    }

    pub fn get(&self, label: Label) -> usize {
        match label {
            Label::Ding => self.ding,
            Label::Tak => self.tak,
            Label::Slap => self.slap,
            _ => 0,
        }
    }

    /// Clamp each count to `slots`, force at least one Ding, and when
    /// `min_empty` is given shed Slaps, then Taks, then Dings (keeping one)
    /// until that many slots stay empty.
    pub fn normalized(self, slots: usize, min_empty: Option<usize>) -> Self {
        let mut ding = self.ding.min(slots).max(1);
        let mut tak = self.tak.min(slots);
        let mut slap = self.slap.min(slots);

        if let Some(min_empty) = min_empty {
            let cap = slots.saturating_sub(min_empty).max(1);
            let mut overflow = (ding + tak + slap).saturating_sub(cap);
            while overflow > 0 && slap > 0 {
                slap -= 1;
                overflow -= 1;
            }
            while overflow > 0 && tak > 0 {
                tak -= 1;
                overflow -= 1;
            }
            while overflow > 0 && ding > 1 {
                ding -= 1;
                overflow -= 1;
            }
        }

        Self { ding, tak, slap }
    }

    /// Largest value each field may take given the other two.
    pub fn picker_limits(&self, slots: usize) -> AccentCounts {
        AccentCounts {
            ding: slots.saturating_sub(self.tak + self.slap),
            tak: slots.saturating_sub(self.ding + self.slap),
            slap: slots.saturating_sub(self.ding + self.tak),
        }
    }
}

/// Where each accent kind may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolStrategy {
    /// Every slot except 0, for every accent
    #[default]
    Anywhere,
    /// Dings on downbeats, Taks and Slaps on upbeats
    Metrical { beat_stride: usize },
}

impl PoolStrategy {
    pub fn pool_for(&self, label: Label, slots: usize) -> Vec<usize> {
        match *self {
            PoolStrategy::Anywhere => (1..slots).collect(),
            PoolStrategy::Metrical { beat_stride } => {
                let stride = beat_stride.max(1);
                let want_down = label == Label::Ding;
                (1..slots).filter(|i| (i % stride == 0) == want_down).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrooveRequest {
    pub counts: AccentCounts,
    pub adjacency: AdjacencyMode,
    pub pools: PoolStrategy,
    /// Shuffle labels onto slots, bypassing the placement policy
    pub fully_random: bool,
    pub min_empty: Option<usize>,
}

impl GrooveRequest {
    pub fn new(ding: usize, tak: usize, slap: usize) -> Self {
        Self {
            counts: AccentCounts::new(ding, tak, slap),
            adjacency: AdjacencyMode::Off,
            pools: PoolStrategy::Anywhere,
            fully_random: false,
            min_empty: None,
        }
    }

    /// Validate counts typed by the user. A Ding count of zero becomes one,
    /// since slot 0 always holds a Ding.
    pub fn manual(ding: usize, tak: usize, slap: usize, slots: usize) -> Result<Self, GrooveError> {
        let ding = ding.max(1);
        let requested = ding + tak + slap;
        if requested > slots {
            return Err(GrooveError::TooManyAccents { requested, slots });
        }
        Ok(Self::new(ding, tak, slap))
    }

    pub fn with_adjacency(mut self, adjacency: AdjacencyMode) -> Self {
        self.adjacency = adjacency;
        self
    }

    pub fn with_pools(mut self, pools: PoolStrategy) -> Self {
        self.pools = pools;
        self
    }

    pub fn with_min_empty(mut self, min_empty: usize) -> Self {
        self.min_empty = Some(min_empty);
        self
    }

    pub fn fully_random(mut self) -> Self {
        self.fully_random = true;
        self
    }
}

/// Complexity presets offered by the groove dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    #[default]
    Simple,
    Moderate,
    Busy,
    Random,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Simple, Tier::Moderate, Tier::Busy, Tier::Random];

    pub fn name(self) -> &'static str {
        match self {
            Tier::Simple => "1 - Simple",
            Tier::Moderate => "2 - Moderate",
            Tier::Busy => "3 - Busy",
            Tier::Random => "R - Completely random",
        }
    }

    /// Most accents (slot 0 included) a tier rolls for a ring of `slots`.
    pub fn cap(self, slots: usize) -> usize {
        let cap = match self {
            Tier::Simple => 2,
            Tier::Moderate => 4,
            Tier::Busy => 8,
            Tier::Random => slots,
        };
        cap.min(slots)
    }

    pub fn adjacency(self) -> AdjacencyMode {
        match self {
            Tier::Simple => AdjacencyMode::Strict,
            Tier::Moderate => AdjacencyMode::Soft,
            Tier::Busy | Tier::Random => AdjacencyMode::Off,
        }
    }

    /// Roll a random accent total in `[1, cap]` and split it across D/T/S.
    pub fn roll<R: Rng + ?Sized>(self, slots: usize, rng: &mut R) -> GrooveRequest {
        let cap = self.cap(slots).max(1);
        let total = rng.random_range(1..=cap);
        let rest = total - 1;

        let a = rng.random_range(0..=rest);
        let b = rng.random_range(0..=rest - a);
        let c = rest - a - b;
        let mut parts = [a, b, c];
        parts.shuffle(rng);

        let request =
            GrooveRequest::new(1 + parts[0], parts[1], parts[2]).with_min_empty(MIN_EMPTY_SLOTS);
        match self {
            Tier::Random => request.fully_random(),
            tier => request.with_adjacency(tier.adjacency()),
        }
    }
}

/// Text shown under the groove dialog's count fields.
pub fn groove_hint(ding: Option<usize>, tak: Option<usize>, slap: Option<usize>, slots: usize) -> String {
    if ding.is_none() && tak.is_none() && slap.is_none() {
        return format!(
            "Auto mode: will generate a groove with at least {MIN_EMPTY_SLOTS} non-accented beats."
        );
    }
    let total = ding.unwrap_or(0) + tak.unwrap_or(0) + slap.unwrap_or(0);
    format!("Total accents: {total} / {slots}")
}

/// Outcome of one generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrooveReport {
    /// Counts after clamping and minimum-empty reduction
    pub counts: AccentCounts,
    pub placements: Vec<(Label, Placement)>,
}

impl GrooveReport {
    pub fn placed(&self, label: Label) -> &[usize] {
        self.placements
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, p)| p.indices.as_slice())
            .unwrap_or(&[])
    }

    pub fn fallback_picks(&self) -> usize {
        self.placements.iter().map(|(_, p)| p.fallback).sum()
    }

    /// Accents requested but not placed for lack of free slots.
    pub fn shortfall(&self) -> usize {
        let placed: usize = self.placements.iter().map(|(_, p)| p.len()).sum();
        // Slot 0 is not part of the placements.
        self.counts.total().saturating_sub(1 + placed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrooveGenerator {
    soft_reject: f64,
}

impl Default for GrooveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GrooveGenerator {
    pub fn new() -> Self {
        Self {
            soft_reject: DEFAULT_SOFT_REJECT,
        }
    }

    pub fn with_soft_reject(mut self, probability: f64) -> Self {
        self.soft_reject = probability.clamp(0.0, 1.0);
        self
    }

    /// Reset `ring` and fill it according to `request`.
    ///
    /// Never fails: counts are clamped and a pool too small for the request
    /// leaves the remainder unplaced.
    pub fn generate<S, R>(&self, ring: &mut S, request: &GrooveRequest, rng: &mut R) -> GrooveReport
    where
        S: SlotRing + ?Sized,
        R: Rng + ?Sized,
    {
        let slots = ring.len();
        let counts = request.counts.normalized(slots, request.min_empty);
        let mut report = GrooveReport {
            counts,
            placements: Vec::with_capacity(Label::ACCENTS.len()),
        };
        if slots == 0 {
            return report;
        }

        ring.reset();
        ring.set_label(0, Label::Ding);

        let remaining = [
            (Label::Ding, counts.ding - 1),
            (Label::Tak, counts.tak),
            (Label::Slap, counts.slap),
        ];

        if request.fully_random {
            fill_random(ring, &remaining, &mut report, rng);
        } else {
            let policy = PlacementPolicy::new(slots).with_soft_reject(self.soft_reject);
            let mut used = UsedSet::from([0]);
            for (label, count) in remaining {
                let pool = request.pools.pool_for(label, slots);
                let placement = policy.select(&pool, count, &mut used, request.adjacency, rng);
                for &i in &placement.indices {
                    ring.set_label(i, label);
                }
                report.placements.push((label, placement));
            }
        }

        debug!(
            "groove: {slots} slots, D={} T={} S={} ({}), {} fallback pick(s)",
            counts.ding,
            counts.tak,
            counts.slap,
            if request.fully_random { "random" } else { request.adjacency.name() },
            report.fallback_picks()
        );
        let shortfall = report.shortfall();
        if shortfall > 0 {
            debug!("groove: {shortfall} accent(s) did not fit");
        }

        report
    }
}

fn fill_random<S, R>(ring: &mut S, remaining: &[(Label, usize)], report: &mut GrooveReport, rng: &mut R)
where
    S: SlotRing + ?Sized,
    R: Rng + ?Sized,
{
    let mut pool: Vec<usize> = (1..ring.len()).collect();
    pool.shuffle(rng);

    let mut labels: Vec<Label> = remaining
        .iter()
        .flat_map(|&(label, n)| std::iter::repeat(label).take(n))
        .collect();
    labels.shuffle(rng);

    report.placements = remaining
        .iter()
        .map(|&(label, _)| (label, Placement::default()))
        .collect();

    for (&index, &label) in pool.iter().zip(&labels) {
        ring.set_label(index, label);
        if let Some((_, placement)) = report.placements.iter_mut().find(|(l, _)| *l == label) {
            placement.indices.push(index);
        }
    }
}

/// Generate with the default soft-rejection probability.
pub fn generate<S, R>(ring: &mut S, request: &GrooveRequest, rng: &mut R) -> GrooveReport
where
    S: SlotRing + ?Sized,
    R: Rng + ?Sized,
{
    GrooveGenerator::new().generate(ring, request, rng)
}
