#![deny(warnings)]

//! Core domain models and invariants for Terra Restore.
//!
//! This crate defines the serializable types shared by the ledger, the
//! competitor simulator and the session runtime, together with validation
//! helpers, the injectable random source and the territory registry.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

mod registry;

pub use registry::{EffectOutcome, TerritoryRegistry};

/// Upper bound for pollution and greenery levels.
pub const LEVEL_MAX: u8 = 100;

/// Stable identifier of a territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier of an AI competitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompetitorId(pub u32);

/// Biome kinds a territory can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerritoryKind {
    /// Clean lake
    Lake,
    /// Lake with heavy contamination
    PollutedLake,
    /// City park
    Park,
    /// Border between field and forest
    ForestEdge,
    /// Forest
    Forest,
    /// Industrial zone
    Industrial,
    /// Farm field
    Field,
    /// Eroded ravine
    Ravine,
}

/// Party that owns a captured territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// The human player.
    Player,
    /// A simulated competitor.
    Competitor(CompetitorId),
}

/// A discrete map cell with pollution/greenery levels and optional ownership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territory {
    /// Unique, stable identifier.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Pollution level in [0, 100].
    pub pollution: u8,
    /// Greenery level in [0, 100].
    pub greenery: u8,
    /// Owner once captured; never revoked.
    #[serde(default)]
    pub owner: Option<Owner>,
    /// Biome kind.
    pub kind: TerritoryKind,
}

impl Territory {
    /// Build an unowned territory.
    pub fn new(id: u32, name: &str, kind: TerritoryKind, pollution: u8, greenery: u8) -> Self {
        Self {
            id: TerritoryId(id),
            name: name.to_string(),
            pollution,
            greenery,
            owner: None,
            kind,
        }
    }

    /// True when nobody has captured this territory yet.
    pub fn is_unowned(&self) -> bool {
        self.owner.is_none()
    }
}

/// Fungible resource dimensions held as cards or pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Building materials
    Materials,
    /// Food
    Food,
    /// Water
    Water,
    /// Energy
    Energy,
}

impl ResourceKind {
    /// All kinds in display order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Materials,
        ResourceKind::Food,
        ResourceKind::Water,
        ResourceKind::Energy,
    ];
}

/// An AI competitor on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    /// Identifier used as territory owner.
    pub id: CompetitorId,
    /// Display name.
    pub name: String,
    /// Presentation color tag.
    pub color: String,
    /// Accumulated score.
    #[serde(default)]
    pub score: u32,
    /// Owned-territory counter shown on the leaderboard.
    #[serde(default)]
    pub territories_owned: u32,
    /// Presentation avatar tag.
    pub avatar: String,
}

/// Threshold predicate gating player capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureRule {
    /// Pollution must be at or below this level.
    pub max_pollution: u8,
    /// Greenery must be at or above this level.
    pub min_greenery: u8,
}

impl Default for CaptureRule {
    fn default() -> Self {
        Self {
            max_pollution: 20,
            min_greenery: 70,
        }
    }
}

impl CaptureRule {
    /// Both conditions must hold.
    pub fn is_met(&self, pollution: u8, greenery: u8) -> bool {
        pollution <= self.max_pollution && greenery >= self.min_greenery
    }
}

/// Apply a signed delta to a level and clamp into [0, 100].
pub fn clamp_level(level: u8, delta: i32) -> u8 {
    let v = i64::from(level) + i64::from(delta);
    // Clamped into [0, 100], so the narrowing is lossless.
    v.clamp(0, i64::from(LEVEL_MAX)) as u8
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Level outside [0, 100].
    #[error("{field} level {value} exceeds 100")]
    LevelOutOfRange {
        /// Which level is invalid.
        field: &'static str,
        /// Offending value.
        value: u8,
    },
    /// Names must not be blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Duplicate territory id.
    #[error("duplicate territory id {0}")]
    DuplicateTerritory(TerritoryId),
    /// Duplicate competitor id.
    #[error("duplicate competitor id {0}")]
    DuplicateCompetitor(u32),
    /// A capture threshold is outside [0, 100].
    #[error("capture threshold out of range")]
    InvalidThreshold,
}

/// Errors raised by registry operations on bad references.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Referenced territory does not exist.
    #[error("unknown territory {0}")]
    UnknownTerritory(TerritoryId),
}

/// Validate a single territory.
pub fn validate_territory(t: &Territory) -> Result<(), ValidationError> {
    if t.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if t.pollution > LEVEL_MAX {
        return Err(ValidationError::LevelOutOfRange {
            field: "pollution",
            value: t.pollution,
        });
    }
    if t.greenery > LEVEL_MAX {
        return Err(ValidationError::LevelOutOfRange {
            field: "greenery",
            value: t.greenery,
        });
    }
    Ok(())
}

/// Validate a territory seed list, including id uniqueness.
pub fn validate_territories(list: &[Territory]) -> Result<(), ValidationError> {
    let mut ids = BTreeSet::new();
    for t in list {
        validate_territory(t)?;
        if !ids.insert(t.id) {
            return Err(ValidationError::DuplicateTerritory(t.id));
        }
    }
    Ok(())
}

/// Validate a competitor roster.
pub fn validate_competitors(list: &[Competitor]) -> Result<(), ValidationError> {
    let mut ids = BTreeSet::new();
    for c in list {
        if c.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !ids.insert(c.id) {
            return Err(ValidationError::DuplicateCompetitor(c.id.0));
        }
    }
    Ok(())
}

/// Validate capture thresholds.
pub fn validate_capture_rule(rule: &CaptureRule) -> Result<(), ValidationError> {
    if rule.max_pollution > LEVEL_MAX || rule.min_greenery > LEVEL_MAX {
        return Err(ValidationError::InvalidThreshold);
    }
    Ok(())
}

/// The nine territories every session starts with.
pub fn seed_territories() -> Vec<Territory> {
    use TerritoryKind::*;
    vec![
        Territory::new(1, "Silver Lake", Lake, 35, 40),
        Territory::new(2, "Tar Pond", PollutedLake, 85, 10),
        Territory::new(3, "Central Park", Park, 40, 55),
        Territory::new(4, "Birch Edge", ForestEdge, 30, 50),
        Territory::new(5, "Old Pinewood", Forest, 25, 60),
        Territory::new(6, "Foundry Row", Industrial, 90, 5),
        Territory::new(7, "Wheat Flats", Field, 45, 35),
        Territory::new(8, "Red Gully", Ravine, 60, 20),
        Territory::new(9, "Mill Quarter", Industrial, 75, 15),
    ]
}

/// Uniform random source used for every draw in the engine.
///
/// Injected into the ledger, the competitor simulator and the session so
/// tests can replace it with a scripted sequence.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Seeded ChaCha8 source for reproducible sessions.
#[derive(Clone, Debug)]
pub struct SeededRandom(ChaCha8Rng);

impl SeededRandom {
    /// Create a source from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty script always yields `0.0`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Create a source replaying `values` in order.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_list_is_valid() {
        let seeds = seed_territories();
        assert_eq!(seeds.len(), 9);
        validate_territories(&seeds).unwrap();
        assert!(seeds.iter().all(Territory::is_unowned));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut seeds = seed_territories();
        seeds[1].id = seeds[0].id;
        assert_eq!(
            validate_territories(&seeds),
            Err(ValidationError::DuplicateTerritory(TerritoryId(1)))
        );
    }

    #[test]
    fn out_of_range_level_rejected() {
        let t = Territory::new(1, "Bad", TerritoryKind::Field, 101, 0);
        assert!(matches!(
            validate_territory(&t),
            Err(ValidationError::LevelOutOfRange { field: "pollution", .. })
        ));
    }

    #[test]
    fn capture_rule_is_a_conjunction() {
        let rule = CaptureRule::default();
        assert!(!rule.is_met(20, 69));
        assert!(rule.is_met(20, 70));
        assert!(!rule.is_met(21, 100));
    }

    #[test]
    fn territory_serde_uses_kebab_kinds() {
        let t = Territory::new(2, "Tar Pond", TerritoryKind::PollutedLake, 85, 10);
        let s = serde_json::to_string(&t).unwrap();
        assert!(s.contains("\"polluted-lake\""));
        let back: Territory = serde_json::from_str(&s).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn scripted_random_cycles() {
        let mut r = ScriptedRandom::new(vec![0.1, 0.9]);
        assert_eq!(r.next_unit(), 0.1);
        assert_eq!(r.next_unit(), 0.9);
        assert_eq!(r.next_unit(), 0.1);
        assert_eq!(r.draws(), 3);
        assert_eq!(r.pick_index(3), 2);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..16 {
            let x = a.next_unit();
            assert_eq!(x, b.next_unit());
            assert!((0.0..1.0).contains(&x));
        }
    }

    proptest! {
        #[test]
        fn clamp_stays_in_range(level in 0u8..=100, delta in -500i32..500) {
            let v = clamp_level(level, delta);
            prop_assert!(v <= LEVEL_MAX);
        }

        #[test]
        fn pick_index_in_bounds(u in 0.0f64..1.0, len in 1usize..32) {
            let mut r = ScriptedRandom::new(vec![u]);
            prop_assert!(r.pick_index(len) < len);
        }
    }
}
