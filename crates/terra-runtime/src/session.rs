//! Game session controller.
//!
//! A [`GameSession`] owns every piece of mutable game state: the ledger,
//! the territory registry, the competitor roster, both timers and the
//! player's score and selection. Commands never fail loudly; a command
//! that cannot run leaves the session untouched and reports a [`Decline`].

use crate::clock::{Cadence, ClockEvent, ClockSnapshot, RoundClock};
use crate::config::{ConfigError, GameConfig};
use serde::Serialize;
use terra_ai::{simulate, SimulationReport};
use terra_core::{
    Competitor, EffectOutcome, Owner, RandomSource, ResourceKind, SeededRandom, Territory,
    TerritoryId, TerritoryRegistry,
};
use terra_econ::{
    ActionCatalog, ActionId, CardId, GameAction, Ledger, LedgerSnapshot, ResourceAmounts,
    ResourceCard,
};
use tracing::{debug, error, info};

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    Running,
    /// Timers halted by `stop()`; `start()` begins a fresh game.
    Stopped,
}

/// Why a command left the session unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decline {
    NotRunning,
    UnknownAction,
    UnknownTerritory,
    /// The action cannot target this territory kind.
    NotApplicable,
    Unaffordable,
}

/// Effects of an applied action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub action: ActionId,
    pub territory: TerritoryId,
    pub effect: EffectOutcome,
    pub score_gained: u32,
    /// Currency credited for capturing the territory.
    pub bonus_credited: u32,
    /// Part of the cost the greedy card walk could not cover.
    pub shortfall: ResourceAmounts,
}

/// Result of [`GameSession::perform_action`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied(ActionReport),
    Declined(Decline),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }

    pub fn report(&self) -> Option<&ActionReport> {
        match self {
            ActionOutcome::Applied(r) => Some(r),
            ActionOutcome::Declined(_) => None,
        }
    }
}

/// Timer-driven events during one or more seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Rounds that began, in order.
    pub rounds_started: Vec<u32>,
    /// Every competitor run, from round boundaries and the cadence timer.
    pub competitor_runs: Vec<SimulationReport>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.rounds_started.is_empty() && self.competitor_runs.is_empty()
    }

    fn merge(&mut self, other: TickReport) {
        self.rounds_started.extend(other.rounds_started);
        self.competitor_runs.extend(other.competitor_runs);
    }
}

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub territories: u32,
    pub color: String,
    pub avatar: String,
    pub is_player: bool,
}

/// Everything the presentation layer renders.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub clock: ClockSnapshot,
    pub player_score: u32,
    pub selected: Option<TerritoryId>,
    pub ledger: LedgerSnapshot,
    pub territories: Vec<Territory>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub player_territories: usize,
    pub total_territories: usize,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Single-threaded game session.
#[derive(Debug)]
pub struct GameSession<R: RandomSource = SeededRandom> {
    config: GameConfig,
    rng: R,
    ledger: Ledger,
    registry: TerritoryRegistry,
    initial_registry: TerritoryRegistry,
    competitors: Vec<Competitor>,
    clock: RoundClock,
    cadence: Cadence,
    phase: SessionPhase,
    player_score: u32,
    selected: Option<TerritoryId>,
}

impl GameSession<SeededRandom> {
    /// Session drawing from a seeded ChaCha8 source.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Validate `config` and build a session in the `NotStarted` phase.
    pub fn new(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = TerritoryRegistry::new(config.territories.clone())?;
        Ok(Self {
            ledger: Ledger::new(config.ledger.clone()),
            initial_registry: registry.clone(),
            registry,
            competitors: config.competitors.clone(),
            clock: RoundClock::new(config.clock.round_seconds),
            cadence: Cadence::new(config.clock.competitor_interval_seconds),
            phase: SessionPhase::NotStarted,
            player_score: 0,
            selected: None,
            rng,
            config,
        })
    }

    /// Begin a fresh game.
    ///
    /// Resets the ledger (dealing the starting hand), score, round,
    /// countdown, selection and competitor roster. Territories keep their
    /// state unless `reset_territories_on_start` is set.
    pub fn start(&mut self) {
        if self.config.reset_territories_on_start {
            self.registry = self.initial_registry.clone();
        }
        self.competitors = self.config.competitors.clone();
        self.ledger = Ledger::seeded(self.config.ledger.clone(), &mut self.rng);
        self.player_score = 0;
        self.selected = None;
        self.clock.start();
        self.cadence.reset();
        self.phase = SessionPhase::Running;
        info!(
            currency = self.ledger.currency(),
            cards = self.ledger.cards().len(),
            "session started"
        );
    }

    /// Halt both timers.
    pub fn stop(&mut self) {
        if self.phase == SessionPhase::Running {
            self.clock.stop();
            self.phase = SessionPhase::Stopped;
            info!(round = self.clock.round(), score = self.player_score, "session stopped");
        }
    }

    /// Set or clear the selected territory.
    ///
    /// Selecting an owned or unknown territory is ignored and returns false.
    pub fn select_territory(&mut self, id: Option<TerritoryId>) -> bool {
        let Some(id) = id else {
            self.selected = None;
            return true;
        };
        match self.registry.get(id) {
            Some(t) if t.is_unowned() => {
                self.selected = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Pay for `action_id` and apply it to `territory` on behalf of the player.
    pub fn perform_action(&mut self, action_id: &str, territory: TerritoryId) -> ActionOutcome {
        if self.phase != SessionPhase::Running {
            return decline(Decline::NotRunning);
        }
        let Some(action) = self.config.actions.get(action_id).cloned() else {
            return decline(Decline::UnknownAction);
        };
        let Some(kind) = self.registry.get(territory).map(|t| t.kind) else {
            return decline(Decline::UnknownTerritory);
        };
        if !action.applies_to(kind) {
            return decline(Decline::NotApplicable);
        }
        if !self.ledger.affordable(&action.cost) {
            return decline(Decline::Unaffordable);
        }

        let shortfall = self.ledger.debit(&action.cost);
        let effect = match self.registry.apply_effect(
            territory,
            action.pollution_delta,
            action.greenery_delta,
            Owner::Player,
            &self.config.capture,
        ) {
            Ok(effect) => effect,
            Err(e) => {
                error!(%e, "territory vanished during action");
                return ActionOutcome::Declined(Decline::UnknownTerritory);
            }
        };
        let score_gained = self.config.scoring.points(
            action.pollution_delta,
            action.greenery_delta,
            action.score_bonus,
        );
        self.player_score = self.player_score.saturating_add(score_gained);
        let bonus_credited = if effect.captured && self.ledger.config().currency_enabled {
            self.ledger.credit(self.config.capture_bonus);
            self.config.capture_bonus
        } else {
            0
        };
        self.selected = None;
        info!(
            action = action.id.as_str(),
            territory = %territory,
            pollution = effect.pollution,
            greenery = effect.greenery,
            captured = effect.captured,
            score_gained,
            "action applied"
        );
        ActionOutcome::Applied(ActionReport {
            action: action.id,
            territory,
            effect,
            score_gained,
            bonus_credited,
            shortfall,
        })
    }

    /// Buy one random card of `kind`.
    pub fn buy_resource_card(&mut self, kind: ResourceKind) -> Option<CardId> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.ledger.buy(kind, &mut self.rng)
    }

    /// Sell a held card for the flat sale price.
    pub fn sell_resource_card(&mut self, card: &CardId) -> Option<ResourceCard> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.ledger.sell(card)
    }

    fn run_competitors(&mut self) -> SimulationReport {
        match simulate(
            &mut self.competitors,
            &mut self.registry,
            &self.config.competitor,
            &mut self.rng,
        ) {
            Ok(report) => report,
            Err(e) => {
                error!(%e, "competitor tick referenced a missing territory");
                SimulationReport::default()
            }
        }
    }

    /// Countdown timer callback: one second of the round clock.
    ///
    /// At a boundary the competitors act, the ledger is replenished, the
    /// round increments and the countdown resets, all in this call.
    pub fn tick_round(&mut self) -> Option<(u32, SimulationReport)> {
        if self.clock.tick() != ClockEvent::BoundaryDue {
            return None;
        }
        let sim = self.run_competitors();
        self.ledger.replenish();
        let round = self.clock.advance_round();
        info!(
            round,
            currency = self.ledger.currency(),
            seizures = sim.seizures.len(),
            "round started"
        );
        Some((round, sim))
    }

    /// Secondary timer callback: one competitor run, independent of rounds.
    pub fn competitor_tick(&mut self) -> Option<SimulationReport> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        let sim = self.run_competitors();
        debug!(seizures = sim.seizures.len(), "competitor cadence");
        Some(sim)
    }

    /// One second of virtual time: the countdown, then the cadence timer.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.phase != SessionPhase::Running {
            return report;
        }
        if let Some((round, sim)) = self.tick_round() {
            report.rounds_started.push(round);
            report.competitor_runs.push(sim);
        }
        if self.cadence.step() {
            if let Some(sim) = self.competitor_tick() {
                report.competitor_runs.push(sim);
            }
        }
        report
    }

    /// Run `seconds` ticks of virtual time.
    pub fn advance(&mut self, seconds: u32) -> TickReport {
        let mut report = TickReport::default();
        for _ in 0..seconds {
            report.merge(self.tick());
        }
        report
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn registry(&self) -> &TerritoryRegistry {
        &self.registry
    }

    pub fn territories(&self) -> &[Territory] {
        self.registry.all()
    }

    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.config.actions
    }

    pub fn player_score(&self) -> u32 {
        self.player_score
    }

    pub fn current_round(&self) -> u32 {
        self.clock.round()
    }

    pub fn time_remaining(&self) -> u32 {
        self.clock.remaining()
    }

    pub fn selected(&self) -> Option<TerritoryId> {
        self.selected
    }

    #[cfg(test)]
    pub(crate) fn clock_mut(&mut self) -> &mut RoundClock {
        &mut self.clock
    }

    /// Whether the ledger covers the named action's cost.
    pub fn can_afford(&self, action_id: &str) -> bool {
        self.config
            .actions
            .get(action_id)
            .is_some_and(|a| ActionCatalog::can_afford(a, &self.ledger))
    }

    /// Actions that may target `territory`; empty for unknown ids.
    pub fn available_actions(&self, territory: TerritoryId) -> Vec<&GameAction> {
        self.registry
            .get(territory)
            .map(|t| self.config.actions.applicable_to(t.kind))
            .unwrap_or_default()
    }

    /// Player plus competitors, sorted by score descending.
    ///
    /// The sort is stable with the player first, so the player wins ties.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let owned = self.registry.count_owned_by(Owner::Player);
        let mut board = Vec::with_capacity(self.competitors.len() + 1);
        board.push(LeaderboardEntry {
            name: self.config.player_name.clone(),
            score: self.player_score,
            territories: u32::try_from(owned).unwrap_or(u32::MAX),
            color: "green".to_string(),
            avatar: "target".to_string(),
            is_player: true,
        });
        board.extend(self.competitors.iter().map(|c| LeaderboardEntry {
            name: c.name.clone(),
            score: c.score,
            territories: c.territories_owned,
            color: c.color.clone(),
            avatar: c.avatar.clone(),
            is_player: false,
        }));
        board.sort_by(|a, b| b.score.cmp(&a.score));
        board
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            clock: self.clock.snapshot(),
            player_score: self.player_score,
            selected: self.selected,
            ledger: self.ledger.snapshot(),
            territories: self.registry.all().to_vec(),
            leaderboard: self.leaderboard(),
            player_territories: self.registry.count_owned_by(Owner::Player),
            total_territories: self.registry.len(),
        }
    }
}

fn decline(reason: Decline) -> ActionOutcome {
    debug!(?reason, "action declined");
    ActionOutcome::Declined(reason)
}
