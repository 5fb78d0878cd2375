//! Static catalog of restoration actions.

use crate::{Cost, EconError, Ledger, ResourceAmounts};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use terra_core::{ResourceKind, TerritoryKind};

/// Action identifier, e.g. "clean".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable definition of a restoration action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAction {
    pub id: ActionId,
    pub name: String,
    #[serde(default)]
    pub cost: Cost,
    /// Signed change to pollution (negative cleans).
    pub pollution_delta: i32,
    /// Signed change to greenery.
    pub greenery_delta: i32,
    /// Territory kinds this action may target; `None` means all.
    #[serde(default)]
    pub applicable_to: Option<Vec<TerritoryKind>>,
    /// Points awarded under the flat scoring policy.
    #[serde(default)]
    pub score_bonus: u32,
}

impl GameAction {
    fn new(id: &str, name: &str, cost: Cost, pollution_delta: i32, greenery_delta: i32) -> Self {
        Self {
            id: ActionId(id.to_string()),
            name: name.to_string(),
            cost,
            pollution_delta,
            greenery_delta,
            applicable_to: None,
            score_bonus: 0,
        }
    }

    fn only(mut self, kinds: &[TerritoryKind]) -> Self {
        self.applicable_to = Some(kinds.to_vec());
        self
    }

    fn bonus(mut self, points: u32) -> Self {
        self.score_bonus = points;
        self
    }

    /// Whether the action may target a territory of `kind`.
    pub fn applies_to(&self, kind: TerritoryKind) -> bool {
        self.applicable_to
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&kind))
    }
}

/// Read-only lookup table of actions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionCatalog {
    actions: Vec<GameAction>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn res(pairs: &[(ResourceKind, u32)]) -> Cost {
    let amounts = pairs
        .iter()
        .fold(ResourceAmounts::default(), |acc, (k, v)| acc.with(*k, *v));
    Cost::resources(amounts)
}

const LAKES: &[TerritoryKind] = &[TerritoryKind::Lake, TerritoryKind::PollutedLake];
const LAND: &[TerritoryKind] = &[
    TerritoryKind::Park,
    TerritoryKind::ForestEdge,
    TerritoryKind::Forest,
    TerritoryKind::Industrial,
    TerritoryKind::Field,
    TerritoryKind::Ravine,
];
const BUILDABLE: &[TerritoryKind] = &[
    TerritoryKind::Park,
    TerritoryKind::Industrial,
    TerritoryKind::Field,
    TerritoryKind::Ravine,
];

impl ActionCatalog {
    /// Build a catalog, rejecting blank or duplicate ids.
    pub fn new(actions: Vec<GameAction>) -> Result<Self, EconError> {
        let catalog = Self { actions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Card-priced actions.
    pub fn standard() -> Self {
        use ResourceKind::*;
        Self {
            actions: vec![
                GameAction::new("clean", "Clean up", res(&[(Materials, 10), (Water, 5), (Energy, 5)]), -20, 5)
                    .bonus(30),
                GameAction::new("plant", "Plant trees", res(&[(Food, 10), (Water, 10)]), -5, 20)
                    .only(LAND)
                    .bonus(25),
                GameAction::new("build", "Build eco-facility", res(&[(Materials, 20), (Energy, 10)]), -15, 10)
                    .only(BUILDABLE)
                    .bonus(40),
                GameAction::new("purify", "Purify water", res(&[(Water, 5), (Energy, 10)]), -25, 5)
                    .only(LAKES)
                    .bonus(35),
            ],
        }
    }

    /// Same effects as [`ActionCatalog::standard`], priced in currency.
    pub fn currency_priced() -> Self {
        let prices = [("clean", 60), ("plant", 50), ("build", 90), ("purify", 70)];
        let mut catalog = Self::standard();
        for action in &mut catalog.actions {
            let price = prices
                .iter()
                .find(|(id, _)| *id == action.id.as_str())
                .map_or(0, |(_, p)| *p);
            action.cost = Cost::currency(price);
        }
        catalog
    }

    /// Actions priced over the three plain pools.
    pub fn pooled() -> Self {
        use ResourceKind::*;
        Self {
            actions: vec![
                GameAction::new("clean", "Clean up", res(&[(Materials, 10), (Water, 5)]), -20, 5).bonus(30),
                GameAction::new("plant", "Plant trees", res(&[(Food, 10), (Water, 10)]), -5, 20)
                    .only(LAND)
                    .bonus(25),
                GameAction::new("build", "Build eco-facility", res(&[(Materials, 20)]), -15, 10)
                    .only(BUILDABLE)
                    .bonus(40),
                GameAction::new("purify", "Purify water", res(&[(Water, 15)]), -25, 5)
                    .only(LAKES)
                    .bonus(35),
            ],
        }
    }

    /// Unique, non-blank ids and names.
    pub fn validate(&self) -> Result<(), EconError> {
        let mut seen = BTreeSet::new();
        for a in &self.actions {
            if a.id.0.trim().is_empty() || a.name.trim().is_empty() {
                return Err(EconError::EmptyAction);
            }
            if !seen.insert(a.id.as_str()) {
                return Err(EconError::DuplicateAction(a.id.0.clone()));
            }
        }
        Ok(())
    }

    pub fn all(&self) -> &[GameAction] {
        &self.actions
    }

    pub fn get(&self, id: &str) -> Option<&GameAction> {
        self.actions.iter().find(|a| a.id.as_str() == id)
    }

    /// Actions that may target a territory of `kind`.
    pub fn applicable_to(&self, kind: TerritoryKind) -> Vec<&GameAction> {
        self.actions.iter().filter(|a| a.applies_to(kind)).collect()
    }

    /// `ledger.affordable(action.cost)`.
    pub fn can_afford(action: &GameAction, ledger: &Ledger) -> bool {
        ledger.affordable(&action.cost)
    }

    /// Applicable actions the ledger can currently pay for.
    pub fn affordable_for<'a>(&'a self, kind: TerritoryKind, ledger: &Ledger) -> Vec<&'a GameAction> {
        self.applicable_to(kind)
            .into_iter()
            .filter(|a| Self::can_afford(a, ledger))
            .collect()
    }
}
