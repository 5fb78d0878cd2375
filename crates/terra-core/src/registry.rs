//! Territory registry: the fixed set of territories and their mutable state.

use crate::{
    clamp_level, validate_territories, CaptureRule, CoreError, Owner, Territory, TerritoryId,
    ValidationError, LEVEL_MAX,
};
use serde::Serialize;
use tracing::debug;

/// Result of applying a pollution/greenery effect to a territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EffectOutcome {
    /// Pollution after clamping.
    pub pollution: u8,
    /// Greenery after clamping.
    pub greenery: u8,
    /// True when this effect captured the territory for the actor.
    pub captured: bool,
}

/// Owns the territory list. Everything else reads through accessors.
#[derive(Clone, Debug)]
pub struct TerritoryRegistry {
    territories: Vec<Territory>,
}

impl TerritoryRegistry {
    /// Build a registry from a validated seed list.
    pub fn new(territories: Vec<Territory>) -> Result<Self, ValidationError> {
        validate_territories(&territories)?;
        Ok(Self { territories })
    }

    /// All territories in seed order.
    pub fn all(&self) -> &[Territory] {
        &self.territories
    }

    /// Look up a territory by id.
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TerritoryId) -> Result<&mut Territory, CoreError> {
        self.territories
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::UnknownTerritory(id))
    }

    /// Apply deltas, clamp both levels, then evaluate the capture rule.
    ///
    /// Capture assigns `actor` only when the territory is unowned and the
    /// clamped levels satisfy `rule`. An existing owner is never replaced.
    pub fn apply_effect(
        &mut self,
        id: TerritoryId,
        pollution_delta: i32,
        greenery_delta: i32,
        actor: Owner,
        rule: &CaptureRule,
    ) -> Result<EffectOutcome, CoreError> {
        let t = self.get_mut(id)?;
        t.pollution = clamp_level(t.pollution, pollution_delta);
        t.greenery = clamp_level(t.greenery, greenery_delta);
        let captured = t.owner.is_none() && rule.is_met(t.pollution, t.greenery);
        if captured {
            t.owner = Some(actor);
            debug!(territory = %id, ?actor, "territory captured");
        }
        Ok(EffectOutcome {
            pollution: t.pollution,
            greenery: t.greenery,
            captured,
        })
    }

    /// Seize an unowned territory for `owner` without a threshold check.
    ///
    /// Returns `Ok(false)` and leaves the territory untouched when it is
    /// already owned.
    pub fn seize(
        &mut self,
        id: TerritoryId,
        owner: Owner,
        pollution_drop: u8,
        greenery_gain: u8,
    ) -> Result<bool, CoreError> {
        let t = self.get_mut(id)?;
        if t.owner.is_some() {
            return Ok(false);
        }
        t.pollution = t.pollution.saturating_sub(pollution_drop);
        t.greenery = t.greenery.saturating_add(greenery_gain).min(LEVEL_MAX);
        t.owner = Some(owner);
        Ok(true)
    }

    /// Territories nobody owns yet.
    pub fn list_unowned(&self) -> Vec<&Territory> {
        self.territories.iter().filter(|t| t.is_unowned()).collect()
    }

    /// Ids of unowned territories, in seed order.
    pub fn unowned_ids(&self) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| t.is_unowned())
            .map(|t| t.id)
            .collect()
    }

    /// Number of territories held by `owner`.
    pub fn count_owned_by(&self, owner: Owner) -> usize {
        self.territories
            .iter()
            .filter(|t| t.owner == Some(owner))
            .count()
    }

    /// Total number of territories.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// True when the registry holds no territories.
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Fraction of all territories held by `owner`, in [0, 1].
    pub fn owned_fraction(&self, owner: Owner) -> f32 {
        if self.territories.is_empty() {
            return 0.0;
        }
        self.count_owned_by(owner) as f32 / self.territories.len() as f32
    }
}
