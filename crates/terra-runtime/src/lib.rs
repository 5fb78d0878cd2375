#![deny(warnings)]

//! Session runtime for Terra Restore: configuration, timers and the game
//! session controller that ties the ledger, the territory registry and the
//! competitor simulator together.

pub mod clock;
pub mod config;
pub mod session;

pub use clock::{Cadence, ClockEvent, ClockSnapshot, ClockState, RoundClock};
pub use config::{ClockConfig, ConfigError, GameConfig, GameConfigBuilder, ScorePolicy};
pub use session::{
    ActionOutcome, ActionReport, Decline, GameSession, LeaderboardEntry, SessionPhase,
    SessionSnapshot, TickReport,
};
