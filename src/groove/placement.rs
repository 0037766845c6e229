/// Placement policy - picks slot indices for one accent kind
///
/// Selection runs in two passes over an explicit candidate list: a
/// constrained pass that honours the adjacency mode, then a fallback pass
/// that ignores adjacency so a request always completes when the pool has
/// room.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Probability that soft mode rejects a candidate sitting next to a claimed slot.
pub const DEFAULT_SOFT_REJECT: f64 = 0.7;

/// Slot indices claimed during one generation pass.
pub type UsedSet = BTreeSet<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacencyMode {
    /// Never place next to a claimed slot (until the fallback pass)
    Strict,
    /// Usually avoid claimed neighbours
    Soft,
    /// No adjacency rule
    #[default]
    #[serde(rename = "none")]
    Off,
}

impl AdjacencyMode {
    pub const ALL: [AdjacencyMode; 3] = [AdjacencyMode::Strict, AdjacencyMode::Soft, AdjacencyMode::Off];

    pub fn name(self) -> &'static str {
        match self {
            AdjacencyMode::Strict => "strict",
            AdjacencyMode::Soft => "soft",
            AdjacencyMode::Off => "none",
        }
    }
}

/// Indices picked by one `select` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    /// Constrained picks first, fallback picks after them
    pub indices: Vec<usize>,
    /// How many trailing entries of `indices` came from the fallback pass
    pub fallback: usize,
}

impl Placement {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Picks that satisfied the adjacency rule.
    pub fn constrained(&self) -> &[usize] {
        &self.indices[..self.indices.len() - self.fallback]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementPolicy {
    slots: usize,
    soft_reject: f64,
}

impl PlacementPolicy {
    /// Policy for a ring of `slots` positions. Neighbours never wrap around.
    pub fn new(slots: usize) -> Self {
        Self {
            slots,
            soft_reject: DEFAULT_SOFT_REJECT,
        }
    }

    pub fn with_soft_reject(mut self, probability: f64) -> Self {
        self.soft_reject = probability.clamp(0.0, 1.0);
        self
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn soft_reject(&self) -> f64 {
        self.soft_reject
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let left = index.checked_sub(1);
        let right = (index + 1 < self.slots).then_some(index + 1);
        left.into_iter().chain(right)
    }

    pub fn has_adjacency(&self, index: usize, used: &UsedSet) -> bool {
        self.neighbors(index).any(|n| used.contains(&n))
    }

    /// Pick up to `count` indices from `pool`, adding each pick to `used`.
    ///
    /// Returns fewer than `count` only when the pool runs out of free indices.
    pub fn select<R: Rng + ?Sized>(
        &self,
        pool: &[usize],
        count: usize,
        used: &mut UsedSet,
        mode: AdjacencyMode,
        rng: &mut R,
    ) -> Placement {
        if count == 0 {
            return Placement::default();
        }

        let mut candidates = self.available(pool, used);
        candidates.shuffle(rng);

        let mut indices = self.constrained_pass(&candidates, count, used, mode, rng);
        let constrained = indices.len();

        if constrained < count {
            indices.extend(self.fallback_pass(pool, count - constrained, used, rng));
        }

        Placement {
            fallback: indices.len() - constrained,
            indices,
        }
    }

    /// Walk `candidates` in order, accepting those the adjacency mode allows.
    pub fn constrained_pass<R: Rng + ?Sized>(
        &self,
        candidates: &[usize],
        count: usize,
        used: &mut UsedSet,
        mode: AdjacencyMode,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut picks = Vec::with_capacity(count);

        for &index in candidates {
            if picks.len() >= count {
                break;
            }
            if used.contains(&index) {
                continue;
            }

            // Picks are claimed as they are accepted, so `used` covers them too.
            let adjacent = self.has_adjacency(index, used);
            let skip = match mode {
                AdjacencyMode::Strict => adjacent,
                AdjacencyMode::Soft => adjacent && rng.random_bool(self.soft_reject),
                AdjacencyMode::Off => false,
            };
            if skip {
                continue;
            }

            picks.push(index);
            used.insert(index);
        }

        picks
    }

    /// Take up to `needed` unclaimed indices from `pool` at random, ignoring adjacency.
    pub fn fallback_pass<R: Rng + ?Sized>(
        &self,
        pool: &[usize],
        needed: usize,
        used: &mut UsedSet,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut remaining = self.available(pool, used);
        remaining.shuffle(rng);
        remaining.truncate(needed);
        used.extend(remaining.iter().copied());
        remaining
    }

    fn available(&self, pool: &[usize], used: &UsedSet) -> Vec<usize> {
        let mut seen = UsedSet::new();
        pool.iter()
            .copied()
            .filter(|&i| i < self.slots && !used.contains(&i) && seen.insert(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool(slots: usize) -> Vec<usize> {
        (1..slots).collect()
    }

    #[test]
    fn test_zero_count_is_empty() {
        let policy = PlacementPolicy::new(8);
        let mut used = UsedSet::from([0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let placement = policy.select(&pool(8), 0, &mut used, AdjacencyMode::Strict, &mut rng);
        assert!(placement.is_empty());
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn test_neighbors_do_not_wrap() {
        let policy = PlacementPolicy::new(8);
        assert_eq!(policy.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(policy.neighbors(7).collect::<Vec<_>>(), vec![6]);
        assert_eq!(policy.neighbors(3).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(PlacementPolicy::new(1).neighbors(0).count(), 0);
    }

    #[test]
    fn test_strict_avoids_neighbours_when_room() {
        let policy = PlacementPolicy::new(16);
        for seed in 0..100 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut used = UsedSet::from([0]);
            // Any two picks block at most six slots, leaving room for a third.
            let placement = policy.select(&pool(16), 3, &mut used, AdjacencyMode::Strict, &mut rng);
            assert_eq!(placement.len(), 3);
            assert_eq!(placement.fallback, 0);
            let mut claimed = UsedSet::from([0]);
            for &i in &placement.indices {
                assert!(!policy.has_adjacency(i, &claimed), "seed {seed}: {i} adjacent");
                claimed.insert(i);
            }
        }
    }

    #[test]
    fn test_fallback_fills_exact_count() {
        let policy = PlacementPolicy::new(8);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut used = UsedSet::from([0]);
        let placement = policy.select(&pool(8), 7, &mut used, AdjacencyMode::Strict, &mut rng);
        assert_eq!(placement.len(), 7);
        assert!(placement.fallback > 0);
        assert_eq!(used.len(), 8);
    }

    #[test]
    fn test_partial_when_pool_too_small() {
        let policy = PlacementPolicy::new(8);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut used = UsedSet::from([0, 1, 2, 3]);
        let placement = policy.select(&pool(8), 10, &mut used, AdjacencyMode::Off, &mut rng);
        let mut got = placement.indices.clone();
        got.sort_unstable();
        assert_eq!(got, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_select_skips_used_and_out_of_range() {
        let policy = PlacementPolicy::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut used = UsedSet::from([0, 2]);
        let placement = policy.select(&[1, 2, 3, 3, 9], 5, &mut used, AdjacencyMode::Off, &mut rng);
        let mut got = placement.indices.clone();
        got.sort_unstable();
        assert_eq!(got, vec![1, 3]);
    }

    #[test]
    fn test_soft_reject_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        // Rejecting every adjacent candidate behaves like strict.
        let always = PlacementPolicy::new(8).with_soft_reject(1.0);
        let mut used = UsedSet::from([0]);
        let candidates = vec![1, 2, 3];
        let picks = always.constrained_pass(&candidates, 3, &mut used, AdjacencyMode::Soft, &mut rng);
        assert_eq!(picks, vec![2]);

        // Never rejecting behaves like off.
        let never = PlacementPolicy::new(8).with_soft_reject(0.0);
        let mut used = UsedSet::from([0]);
        let picks = never.constrained_pass(&candidates, 3, &mut used, AdjacencyMode::Soft, &mut rng);
        assert_eq!(picks, vec![1, 2, 3]);
    }

    #[test]
    fn test_soft_reject_is_clamped() {
        assert_eq!(PlacementPolicy::new(8).with_soft_reject(3.0).soft_reject(), 1.0);
        assert_eq!(PlacementPolicy::new(8).with_soft_reject(-1.0).soft_reject(), 0.0);
    }

    #[test]
    fn test_same_seed_same_picks() {
        let policy = PlacementPolicy::new(16);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut used = UsedSet::from([0]);
            policy.select(&pool(16), 6, &mut used, AdjacencyMode::Soft, &mut rng)
        };
        assert_eq!(run(42), run(42));
    }
}
