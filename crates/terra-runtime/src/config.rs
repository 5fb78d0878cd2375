//! Typed game configuration, YAML loading and presets.
//!
//! Every engine variant is a [`GameConfig`]: resource model, action
//! pricing, capture thresholds, round timing and replenishment constants.
//! Missing YAML keys fall back to the `classic` values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use terra_ai::{default_roster, AiError, CompetitorParams};
use terra_core::{
    seed_territories, validate_capture_rule, validate_competitors, validate_territories,
    CaptureRule, Competitor, ResourceKind, Territory, ValidationError,
};
use terra_econ::{ActionCatalog, EconError, LedgerConfig, ResourceAmounts, ResourceModel};
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Territory or roster data is inconsistent.
    #[error("invalid world data: {0}")]
    World(#[from] ValidationError),
    /// Ledger or catalog settings are inconsistent.
    #[error("invalid economy: {0}")]
    Econ(#[from] EconError),
    /// Competitor tunables are out of range.
    #[error("invalid competitor parameters: {0}")]
    Competitor(#[from] AiError),
    /// Timer periods must be positive.
    #[error("invalid clock: {0}")]
    Clock(&'static str),
    /// No preset with that name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// How an applied action converts into player score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// `|pollution_delta| + greenery_delta`, floored at zero.
    #[default]
    EffectMagnitude,
    /// The action's fixed `score_bonus`.
    FlatBonus,
}

impl ScorePolicy {
    /// Points awarded for an action with these deltas and bonus.
    pub fn points(self, pollution_delta: i32, greenery_delta: i32, bonus: u32) -> u32 {
        match self {
            ScorePolicy::EffectMagnitude => {
                let v = i64::from(pollution_delta).abs() + i64::from(greenery_delta);
                u32::try_from(v.max(0)).unwrap_or(u32::MAX)
            }
            ScorePolicy::FlatBonus => bonus,
        }
    }
}

/// Periods of the two session timers, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Round length.
    pub round_seconds: u32,
    /// Period of the secondary competitor timer.
    pub competitor_interval_seconds: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            round_seconds: 180,
            competitor_interval_seconds: 8,
        }
    }
}

/// Top-level session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Leaderboard name of the human player.
    pub player_name: String,
    pub ledger: LedgerConfig,
    /// Threshold gating player capture.
    pub capture: CaptureRule,
    pub competitor: CompetitorParams,
    pub clock: ClockConfig,
    pub scoring: ScorePolicy,
    /// One-time currency credit when the player captures a territory.
    pub capture_bonus: u32,
    /// Restore territories to the seed list on every `start()`.
    pub reset_territories_on_start: bool,
    pub territories: Vec<Territory>,
    pub competitors: Vec<Competitor>,
    pub actions: ActionCatalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl GameConfig {
    /// Names accepted by [`GameConfig::preset`].
    pub const PRESETS: [&'static str; 4] = ["classic", "easy", "pooled", "currency_only"];

    /// 400 currency, one random card per kind, +200 per round.
    pub fn classic() -> Self {
        Self {
            player_name: "You".to_string(),
            ledger: LedgerConfig::default(),
            capture: CaptureRule::default(),
            competitor: CompetitorParams::default(),
            clock: ClockConfig::default(),
            scoring: ScorePolicy::EffectMagnitude,
            capture_bonus: 0,
            reset_territories_on_start: false,
            territories: seed_territories(),
            competitors: default_roster(),
            actions: ActionCatalog::standard(),
        }
    }

    /// 600 currency, two cards per kind, +300 per round, capture bonus.
    pub fn easy() -> Self {
        let mut cfg = Self::classic();
        cfg.ledger.starting_currency = 600;
        cfg.ledger.starting_cards_per_kind = 2;
        cfg.ledger.round_income = 300;
        cfg.capture_bonus = 100;
        cfg
    }

    /// Three plain pools (materials, food, water), no currency, no cards.
    pub fn pooled() -> Self {
        let mut cfg = Self::classic();
        cfg.ledger = LedgerConfig {
            model: ResourceModel::Pools,
            currency_enabled: false,
            starting_currency: 0,
            round_income: 0,
            starting_cards_per_kind: 0,
            card_kinds: Vec::new(),
            starting_pools: ResourceAmounts {
                materials: 30,
                food: 30,
                water: 30,
                energy: 0,
            },
            pool_income: ResourceAmounts {
                materials: 10,
                food: 10,
                water: 10,
                energy: 0,
            },
            ..LedgerConfig::default()
        };
        cfg.actions = ActionCatalog::pooled();
        cfg.scoring = ScorePolicy::FlatBonus;
        cfg
    }

    /// Actions priced in currency; no cards are dealt or sold.
    pub fn currency_only() -> Self {
        let mut cfg = Self::classic();
        cfg.ledger.starting_cards_per_kind = 0;
        cfg.ledger.card_kinds = Vec::new();
        cfg.actions = ActionCatalog::currency_priced();
        cfg
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "classic" => Ok(Self::classic()),
            "easy" => Ok(Self::easy()),
            "pooled" => Ok(Self::pooled()),
            "currency_only" => Ok(Self::currency_only()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        validate_territories(&self.territories)?;
        validate_competitors(&self.competitors)?;
        validate_capture_rule(&self.capture)?;
        self.ledger.validate()?;
        self.actions.validate()?;
        self.competitor.validate()?;
        if self.clock.round_seconds == 0 {
            return Err(ConfigError::Clock("round_seconds must be > 0"));
        }
        if self.clock.competitor_interval_seconds == 0 {
            return Err(ConfigError::Clock("competitor_interval_seconds must be > 0"));
        }
        Ok(())
    }

    /// Start a builder from the `classic` preset.
    pub fn builder() -> GameConfigBuilder {
        GameConfigBuilder {
            cfg: Self::classic(),
        }
    }
}

/// Overrides individual constants on top of a preset.
#[derive(Clone, Debug)]
pub struct GameConfigBuilder {
    cfg: GameConfig,
}

impl GameConfigBuilder {
    /// Start from an arbitrary base configuration.
    pub fn from_config(cfg: GameConfig) -> Self {
        Self { cfg }
    }

    pub fn player_name(mut self, name: &str) -> Self {
        self.cfg.player_name = name.to_string();
        self
    }

    pub fn ledger(mut self, ledger: LedgerConfig) -> Self {
        self.cfg.ledger = ledger;
        self
    }

    pub fn starting_currency(mut self, amount: u32) -> Self {
        self.cfg.ledger.starting_currency = amount;
        self
    }

    pub fn round_income(mut self, amount: u32) -> Self {
        self.cfg.ledger.round_income = amount;
        self
    }

    pub fn starting_cards_per_kind(mut self, n: u32) -> Self {
        self.cfg.ledger.starting_cards_per_kind = n;
        self
    }

    /// Restrict which kinds are dealt and tradable.
    pub fn card_kinds(mut self, kinds: &[ResourceKind]) -> Self {
        self.cfg.ledger.card_kinds = kinds.to_vec();
        self
    }

    pub fn capture_rule(mut self, rule: CaptureRule) -> Self {
        self.cfg.capture = rule;
        self
    }

    pub fn competitor_params(mut self, params: CompetitorParams) -> Self {
        self.cfg.competitor = params;
        self
    }

    pub fn round_seconds(mut self, secs: u32) -> Self {
        self.cfg.clock.round_seconds = secs;
        self
    }

    pub fn competitor_interval_seconds(mut self, secs: u32) -> Self {
        self.cfg.clock.competitor_interval_seconds = secs;
        self
    }

    pub fn scoring(mut self, policy: ScorePolicy) -> Self {
        self.cfg.scoring = policy;
        self
    }

    pub fn capture_bonus(mut self, amount: u32) -> Self {
        self.cfg.capture_bonus = amount;
        self
    }

    pub fn reset_territories_on_start(mut self, on: bool) -> Self {
        self.cfg.reset_territories_on_start = on;
        self
    }

    pub fn territories(mut self, list: Vec<Territory>) -> Self {
        self.cfg.territories = list;
        self
    }

    pub fn competitors(mut self, list: Vec<Competitor>) -> Self {
        self.cfg.competitors = list;
        self
    }

    pub fn actions(mut self, catalog: ActionCatalog) -> Self {
        self.cfg.actions = catalog;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<GameConfig, ConfigError> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn presets_validate() {
        for name in GameConfig::PRESETS {
            GameConfig::preset(name).unwrap().validate().unwrap();
        }
        assert!(matches!(
            GameConfig::preset("hard"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn classic_constants() {
        let cfg = GameConfig::classic();
        assert_eq!(cfg.ledger.starting_currency, 400);
        assert_eq!(cfg.ledger.card_price, 50);
        assert_eq!(cfg.ledger.sale_price, 20);
        assert_eq!(cfg.ledger.round_income, 200);
        assert_eq!(cfg.clock.round_seconds, 180);
        assert_eq!(cfg.clock.competitor_interval_seconds, 8);
        assert_eq!(cfg.capture, CaptureRule { max_pollution: 20, min_greenery: 70 });
    }

    #[test]
    fn partial_yaml_falls_back_to_classic() {
        let cfg = GameConfig::from_yaml_str(
            "player_name: Ada\nledger:\n  starting_currency: 1000\nclock:\n  round_seconds: 60\n",
        )
        .unwrap();
        assert_eq!(cfg.player_name, "Ada");
        assert_eq!(cfg.ledger.starting_currency, 1000);
        assert_eq!(cfg.ledger.card_price, 50);
        assert_eq!(cfg.clock.round_seconds, 60);
        assert_eq!(cfg.clock.competitor_interval_seconds, 8);
        assert_eq!(cfg.territories.len(), 9);
    }

    #[test]
    fn yaml_rejects_zero_round() {
        let err = GameConfig::from_yaml_str("clock:\n  round_seconds: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Clock(_)));
    }

    #[test]
    fn builder_overrides_and_validates() {
        let cfg = GameConfig::builder()
            .starting_currency(50)
            .round_income(10)
            .scoring(ScorePolicy::FlatBonus)
            .build()
            .unwrap();
        assert_eq!(cfg.ledger.starting_currency, 50);
        assert_eq!(cfg.ledger.round_income, 10);
        assert!(GameConfig::builder().competitor_interval_seconds(0).build().is_err());
        assert!(GameConfig::builder().player_name(" ").build().is_err());
    }

    #[test]
    fn score_policies() {
        assert_eq!(ScorePolicy::EffectMagnitude.points(-20, 5, 99), 25);
        assert_eq!(ScorePolicy::EffectMagnitude.points(0, -5, 0), 0);
        assert_eq!(ScorePolicy::FlatBonus.points(-20, 5, 30), 30);
    }

    #[test]
    fn asset_presets_load() {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/presets");
        let easy = GameConfig::load(root.join("easy.yaml")).unwrap();
        assert_eq!(easy.ledger.starting_currency, 600);
        assert_eq!(easy.ledger.starting_cards_per_kind, 2);
        assert_eq!(easy.ledger.round_income, 300);
        assert_eq!(easy.capture_bonus, 100);
        let pooled = GameConfig::load(root.join("pooled.yaml")).unwrap();
        assert_eq!(pooled.ledger.model, ResourceModel::Pools);
        assert!(!pooled.ledger.currency_enabled);
        assert_eq!(pooled.actions.all().len(), 3);
    }
}
