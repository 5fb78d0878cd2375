#![deny(warnings)]

//! Resource economy for Terra Restore.
//!
//! This crate provides:
//! - Cost vectors over currency and the four resource kinds
//! - The resource ledger (currency, denominated cards, or plain pools)
//! - The static action catalog and affordability checks

use serde::{Deserialize, Serialize};
use terra_core::{RandomSource, ResourceKind};
use thiserror::Error;
use tracing::{debug, warn};

mod catalog;

pub use catalog::{ActionCatalog, ActionId, GameAction};

/// Errors produced when validating economy configuration.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Card model needs at least one face value, all non-zero.
    #[error("card denominations must be non-empty and positive")]
    InvalidDenominations,
    /// Two catalog entries share an identifier.
    #[error("duplicate action id: {0}")]
    DuplicateAction(String),
    /// Action ids and names must not be blank.
    #[error("action id or name is empty")]
    EmptyAction,
}

/// Per-kind amounts, used for card totals, pools and cost vectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceAmounts {
    pub materials: u32,
    pub food: u32,
    pub water: u32,
    pub energy: u32,
}

impl ResourceAmounts {
    /// Same amount for every kind.
    pub fn splat(v: u32) -> Self {
        Self {
            materials: v,
            food: v,
            water: v,
            energy: v,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Materials => self.materials,
            ResourceKind::Food => self.food,
            ResourceKind::Water => self.water,
            ResourceKind::Energy => self.energy,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Materials => &mut self.materials,
            ResourceKind::Food => &mut self.food,
            ResourceKind::Water => &mut self.water,
            ResourceKind::Energy => &mut self.energy,
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, kind: ResourceKind, v: u32) -> Self {
        *self.get_mut(kind) = v;
        self
    }

    pub fn is_zero(&self) -> bool {
        ResourceKind::ALL.iter().all(|k| self.get(*k) == 0)
    }
}

/// Cost vector of an action over currency and resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cost {
    /// Currency component.
    pub currency: u32,
    /// Resource components.
    pub resources: ResourceAmounts,
}

impl Cost {
    /// Cost in currency only.
    pub fn currency(amount: u32) -> Self {
        Self {
            currency: amount,
            resources: ResourceAmounts::default(),
        }
    }

    /// Cost in resources only.
    pub fn resources(resources: ResourceAmounts) -> Self {
        Self {
            currency: 0,
            resources,
        }
    }
}

/// How resources other than currency are held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceModel {
    /// Denominated cards spent by greedy consumption.
    #[default]
    Cards,
    /// Independent integer pools spent by direct subtraction.
    Pools,
}

/// Identifier of a resource card, unique within a ledger.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub String);

/// A denominated token of one resource kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCard {
    pub id: CardId,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Face value drawn from the configured denominations.
    pub value: u32,
}

/// Economy parameters for one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Card or pool model.
    pub model: ResourceModel,
    /// Whether the currency dimension exists at all.
    pub currency_enabled: bool,
    /// Balance at session start.
    pub starting_currency: u32,
    /// Flat currency credit per round.
    pub round_income: u32,
    /// Price of one card from the bank.
    pub card_price: u32,
    /// Flat credit for selling any card.
    pub sale_price: u32,
    /// Face values a new card can take.
    pub denominations: Vec<u32>,
    /// Random cards dealt per kind at session start.
    pub starting_cards_per_kind: u32,
    /// Kinds that are dealt and can be bought as cards.
    pub card_kinds: Vec<ResourceKind>,
    /// Pool levels at session start (pool model).
    pub starting_pools: ResourceAmounts,
    /// Per-pool income per round (pool model).
    pub pool_income: ResourceAmounts,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            model: ResourceModel::Cards,
            currency_enabled: true,
            starting_currency: 400,
            round_income: 200,
            card_price: 50,
            sale_price: 20,
            denominations: vec![5, 10, 20],
            starting_cards_per_kind: 1,
            card_kinds: ResourceKind::ALL.to_vec(),
            starting_pools: ResourceAmounts::default(),
            pool_income: ResourceAmounts::default(),
        }
    }
}

impl LedgerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), EconError> {
        if self.model == ResourceModel::Cards
            && (self.denominations.is_empty() || self.denominations.contains(&0))
        {
            return Err(EconError::InvalidDenominations);
        }
        Ok(())
    }
}

/// Read-only view of a ledger for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub currency: u32,
    pub cards: Vec<ResourceCard>,
    /// Available total per kind (card sum or pool level).
    pub totals: ResourceAmounts,
}

/// Owns currency and resource holdings; the only place they change.
#[derive(Clone, Debug)]
pub struct Ledger {
    config: LedgerConfig,
    currency: u32,
    cards: Vec<ResourceCard>,
    pools: ResourceAmounts,
    next_card: u64,
}

impl Ledger {
    /// Empty ledger holding the starting balance and pools.
    pub fn new(config: LedgerConfig) -> Self {
        let currency = if config.currency_enabled {
            config.starting_currency
        } else {
            0
        };
        let pools = match config.model {
            ResourceModel::Pools => config.starting_pools,
            ResourceModel::Cards => ResourceAmounts::default(),
        };
        Self {
            config,
            currency,
            cards: Vec::new(),
            pools,
            next_card: 0,
        }
    }

    /// Ledger with the starting hand dealt from `rng`.
    pub fn seeded<R: RandomSource>(config: LedgerConfig, rng: &mut R) -> Self {
        let mut ledger = Self::new(config);
        if ledger.config.model == ResourceModel::Cards {
            let kinds = ledger.config.card_kinds.clone();
            for kind in kinds {
                for _ in 0..ledger.config.starting_cards_per_kind {
                    ledger.add_card(kind, rng);
                }
            }
        }
        ledger
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current currency balance.
    pub fn currency(&self) -> u32 {
        self.currency
    }

    /// Held cards in insertion order.
    pub fn cards(&self) -> &[ResourceCard] {
        &self.cards
    }

    /// Available total of one resource kind.
    pub fn total(&self, kind: ResourceKind) -> u32 {
        match self.config.model {
            ResourceModel::Cards => self
                .cards
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.value)
                .sum(),
            ResourceModel::Pools => self.pools.get(kind),
        }
    }

    /// Available totals for all kinds.
    pub fn totals(&self) -> ResourceAmounts {
        let mut out = ResourceAmounts::default();
        for kind in ResourceKind::ALL {
            *out.get_mut(kind) = self.total(kind);
        }
        out
    }

    /// True iff every dimension of `cost` is covered by holdings.
    pub fn affordable(&self, cost: &Cost) -> bool {
        if cost.currency > self.currency {
            return false;
        }
        ResourceKind::ALL
            .iter()
            .all(|k| cost.resources.get(*k) <= self.total(*k))
    }

    /// Debit `cost`. Callers must check [`Ledger::affordable`] first.
    ///
    /// Cards are consumed greedily from the most recently added backward,
    /// skipping any card larger than what is still outstanding. The
    /// returned amounts are what that walk failed to cover; they are not
    /// charged later.
    ///
    /// Example: cards `[20, 5, 10]` and a debit of 15 remove the 10 and
    /// the 5, leaving `[20]`.
    pub fn debit(&mut self, cost: &Cost) -> ResourceAmounts {
        debug_assert!(self.affordable(cost), "debit without affordability check");
        self.currency = self.currency.saturating_sub(cost.currency);
        let mut shortfall = ResourceAmounts::default();
        for kind in ResourceKind::ALL {
            let amount = cost.resources.get(kind);
            if amount == 0 {
                continue;
            }
            let left = match self.config.model {
                ResourceModel::Cards => self.consume_cards(kind, amount),
                ResourceModel::Pools => {
                    let pool = self.pools.get_mut(kind);
                    let left = amount.saturating_sub(*pool);
                    *pool = pool.saturating_sub(amount);
                    left
                }
            };
            if left > 0 {
                warn!(?kind, requested = amount, left, "greedy spend left a shortfall");
            }
            *shortfall.get_mut(kind) = left;
        }
        shortfall
    }

    fn consume_cards(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let mut outstanding = amount;
        let mut i = self.cards.len();
        while i > 0 && outstanding > 0 {
            i -= 1;
            let card = &self.cards[i];
            if card.kind == kind && card.value <= outstanding {
                outstanding -= card.value;
                self.cards.remove(i);
            }
        }
        outstanding
    }

    /// Increase the currency balance. Ignored when currency is disabled.
    pub fn credit(&mut self, amount: u32) {
        if self.config.currency_enabled {
            self.currency = self.currency.saturating_add(amount);
        }
    }

    /// Append a new card of `kind` with a uniformly drawn face value.
    pub fn add_card<R: RandomSource>(&mut self, kind: ResourceKind, rng: &mut R) -> CardId {
        let denoms = &self.config.denominations;
        let value = if denoms.is_empty() {
            0
        } else {
            denoms[rng.pick_index(denoms.len())]
        };
        self.next_card += 1;
        let id = CardId(format!("card-{}", self.next_card));
        self.cards.push(ResourceCard {
            id: id.clone(),
            kind,
            value,
        });
        id
    }

    /// Buy one random card of `kind` for the fixed price.
    ///
    /// Declines (returns `None`, no change) when currency is disabled, the
    /// ledger is not card-based, `kind` is not tradable, or funds are short.
    pub fn buy<R: RandomSource>(&mut self, kind: ResourceKind, rng: &mut R) -> Option<CardId> {
        if !self.config.currency_enabled
            || self.config.model != ResourceModel::Cards
            || !self.config.card_kinds.contains(&kind)
            || self.currency < self.config.card_price
        {
            debug!(?kind, currency = self.currency, "purchase declined");
            return None;
        }
        self.currency -= self.config.card_price;
        let id = self.add_card(kind, rng);
        debug!(?kind, card = %id.0, "card purchased");
        Some(id)
    }

    /// Sell `card` for the flat sale price regardless of its face value.
    pub fn sell(&mut self, card: &CardId) -> Option<ResourceCard> {
        if !self.config.currency_enabled {
            return None;
        }
        let pos = self.cards.iter().position(|c| &c.id == card)?;
        let removed = self.cards.remove(pos);
        self.currency = self.currency.saturating_add(self.config.sale_price);
        Some(removed)
    }

    /// Per-round replenishment: flat currency credit plus pool income.
    pub fn replenish(&mut self) {
        let income = self.config.round_income;
        self.credit(income);
        if self.config.model == ResourceModel::Pools {
            for kind in ResourceKind::ALL {
                let add = self.config.pool_income.get(kind);
                let pool = self.pools.get_mut(kind);
                *pool = pool.saturating_add(add);
            }
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            currency: self.currency,
            cards: self.cards.clone(),
            totals: self.totals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use terra_core::ScriptedRandom;

    fn push(ledger: &mut Ledger, kind: ResourceKind, value: u32) {
        // Map a face value to the draw that selects it from [5, 10, 20].
        let u = match value {
            5 => 0.0,
            10 => 0.4,
            _ => 0.9,
        };
        ledger.add_card(kind, &mut ScriptedRandom::new(vec![u]));
    }

    fn values(ledger: &Ledger) -> Vec<u32> {
        ledger.cards().iter().map(|c| c.value).collect()
    }

    #[test]
    fn greedy_spend_consumes_from_the_end() {
        let mut l = Ledger::new(LedgerConfig::default());
        push(&mut l, ResourceKind::Materials, 20);
        push(&mut l, ResourceKind::Materials, 5);
        push(&mut l, ResourceKind::Materials, 10);
        let cost = Cost::resources(ResourceAmounts::default().with(ResourceKind::Materials, 15));
        assert!(l.affordable(&cost));
        let short = l.debit(&cost);
        assert!(short.is_zero());
        assert_eq!(values(&l), vec![20]);
    }

    #[test]
    fn greedy_spend_can_leave_shortfall() {
        let mut l = Ledger::new(LedgerConfig::default());
        push(&mut l, ResourceKind::Water, 20);
        let cost = Cost::resources(ResourceAmounts::default().with(ResourceKind::Water, 15));
        assert!(l.affordable(&cost));
        let short = l.debit(&cost);
        assert_eq!(short.water, 15);
        assert_eq!(values(&l), vec![20]);
    }

    #[test]
    fn greedy_spend_ignores_other_kinds() {
        let mut l = Ledger::new(LedgerConfig::default());
        push(&mut l, ResourceKind::Food, 10);
        push(&mut l, ResourceKind::Energy, 5);
        push(&mut l, ResourceKind::Food, 5);
        let cost = Cost::resources(ResourceAmounts::default().with(ResourceKind::Food, 15));
        l.debit(&cost);
        assert_eq!(l.cards().len(), 1);
        assert_eq!(l.cards()[0].kind, ResourceKind::Energy);
    }

    #[test]
    fn affordability_per_dimension() {
        let mut l = Ledger::new(LedgerConfig::default());
        push(&mut l, ResourceKind::Energy, 10);
        assert!(l.affordable(&Cost::currency(400)));
        assert!(!l.affordable(&Cost::currency(401)));
        let energy = ResourceAmounts::default().with(ResourceKind::Energy, 10);
        assert!(l.affordable(&Cost::resources(energy)));
        let more = ResourceAmounts::default().with(ResourceKind::Energy, 11);
        assert!(!l.affordable(&Cost::resources(more)));
    }

    #[test]
    fn buy_then_sell_is_asymmetric() {
        let mut l = Ledger::new(LedgerConfig::default());
        let mut rng = ScriptedRandom::new(vec![0.5]);
        let id = l.buy(ResourceKind::Materials, &mut rng).unwrap();
        assert_eq!(l.currency(), 350);
        assert_eq!(l.cards().len(), 1);
        assert_eq!(l.cards()[0].kind, ResourceKind::Materials);
        let sold = l.sell(&id).unwrap();
        assert_eq!(sold.id, id);
        assert_eq!(l.currency(), 370);
        assert!(l.cards().is_empty());
    }

    #[test]
    fn sell_price_is_flat_for_every_denomination() {
        for value in [5, 10, 20] {
            let mut l = Ledger::new(LedgerConfig::default());
            push(&mut l, ResourceKind::Food, value);
            let id = l.cards()[0].id.clone();
            l.sell(&id).unwrap();
            assert_eq!(l.currency(), 420, "face value {value}");
        }
    }

    #[test]
    fn buy_declines_without_funds() {
        let cfg = LedgerConfig {
            starting_currency: 49,
            ..LedgerConfig::default()
        };
        let mut l = Ledger::new(cfg);
        assert!(l.buy(ResourceKind::Water, &mut ScriptedRandom::default()).is_none());
        assert_eq!(l.currency(), 49);
        assert!(l.cards().is_empty());
    }

    #[test]
    fn sell_unknown_card_is_noop() {
        let mut l = Ledger::new(LedgerConfig::default());
        assert!(l.sell(&CardId("missing".into())).is_none());
        assert_eq!(l.currency(), 400);
    }

    #[test]
    fn card_ids_are_unique() {
        let mut l = Ledger::new(LedgerConfig::default());
        let mut rng = ScriptedRandom::new(vec![0.1, 0.6, 0.99]);
        let a = l.add_card(ResourceKind::Food, &mut rng);
        let b = l.add_card(ResourceKind::Food, &mut rng);
        assert_ne!(a, b);
        assert_eq!(values(&l), vec![5, 10]);
    }

    #[test]
    fn seeded_hand_deals_each_kind() {
        let cfg = LedgerConfig {
            starting_cards_per_kind: 2,
            ..LedgerConfig::default()
        };
        let l = Ledger::seeded(cfg, &mut ScriptedRandom::new(vec![0.2, 0.5, 0.8]));
        assert_eq!(l.cards().len(), 8);
        for kind in ResourceKind::ALL {
            assert_eq!(l.cards().iter().filter(|c| c.kind == kind).count(), 2);
        }
    }

    #[test]
    fn pool_model_subtracts_and_replenishes() {
        let cfg = LedgerConfig {
            model: ResourceModel::Pools,
            currency_enabled: false,
            starting_pools: ResourceAmounts {
                materials: 30,
                food: 20,
                water: 10,
                energy: 0,
            },
            pool_income: ResourceAmounts {
                materials: 5,
                food: 10,
                water: 15,
                energy: 0,
            },
            ..LedgerConfig::default()
        };
        let mut l = Ledger::seeded(cfg, &mut ScriptedRandom::default());
        assert!(l.cards().is_empty());
        assert_eq!(l.currency(), 0);
        let cost = Cost::resources(ResourceAmounts::default().with(ResourceKind::Materials, 25));
        assert!(l.affordable(&cost));
        assert!(l.debit(&cost).is_zero());
        assert_eq!(l.total(ResourceKind::Materials), 5);
        l.replenish();
        assert_eq!(l.totals().materials, 10);
        assert_eq!(l.totals().food, 30);
        assert_eq!(l.totals().water, 25);
        assert_eq!(l.currency(), 0);
        assert!(!l.affordable(&Cost::currency(1)));
        assert!(l.buy(ResourceKind::Food, &mut ScriptedRandom::default()).is_none());
    }

    #[test]
    fn replenish_credits_round_income() {
        let mut l = Ledger::new(LedgerConfig::default());
        l.replenish();
        assert_eq!(l.currency(), 600);
    }

    #[test]
    fn invalid_denominations_rejected() {
        let cfg = LedgerConfig {
            denominations: vec![],
            ..LedgerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(EconError::InvalidDenominations));
        assert!(LedgerConfig::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn buys_never_overdraw(start in 0u32..500, buys in 0usize..20) {
            let cfg = LedgerConfig { starting_currency: start, ..LedgerConfig::default() };
            let mut l = Ledger::new(cfg);
            let mut rng = ScriptedRandom::new(vec![0.3, 0.7]);
            let mut bought = 0u32;
            for _ in 0..buys {
                if l.buy(ResourceKind::Energy, &mut rng).is_some() {
                    bought += 1;
                }
            }
            prop_assert_eq!(l.currency(), start - bought * 50);
            prop_assert_eq!(bought, (start / 50).min(buys as u32));
        }

        #[test]
        fn debit_never_removes_more_than_requested(draws in proptest::collection::vec(0.0f64..1.0, 1..12),
                                                   amount in 0u32..120) {
            let mut l = Ledger::new(LedgerConfig::default());
            let mut rng = ScriptedRandom::new(draws.clone());
            for _ in 0..draws.len() {
                l.add_card(ResourceKind::Materials, &mut rng);
            }
            let before = l.total(ResourceKind::Materials);
            let cost = Cost::resources(ResourceAmounts::default().with(ResourceKind::Materials, amount));
            if l.affordable(&cost) {
                let short = l.debit(&cost);
                let removed = before - l.total(ResourceKind::Materials);
                prop_assert_eq!(removed + short.materials, amount);
            }
        }
    }
}
