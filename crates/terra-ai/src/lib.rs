#![deny(warnings)]

//! Competitor simulation: score drift, cosmetic territory counters and
//! probabilistic seizure of unowned territories.

use serde::{Deserialize, Serialize};
use terra_core::{
    Competitor, CompetitorId, CoreError, Owner, RandomSource, TerritoryId, TerritoryRegistry,
};
use thiserror::Error;
use tracing::debug;

/// Errors produced when validating competitor parameters.
#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    /// Thresholds are compared to draws in [0, 1).
    #[error("threshold {0} must be within [0, 1]")]
    InvalidThreshold(f64),
    /// Score increments need a positive span.
    #[error("score span must be > 0")]
    EmptyScoreSpan,
}

/// Tunables for one competitor tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorParams {
    /// Lowest score increment.
    pub score_min: u32,
    /// Increment is `score_min + floor(u * score_span)`.
    pub score_span: u32,
    /// Counter bumps when a draw exceeds this value.
    pub counter_threshold: f64,
    /// An unowned territory is seized when a draw exceeds this value.
    pub seizure_threshold: f64,
    /// Pollution removed from a seized territory.
    pub seizure_pollution_drop: u8,
    /// Greenery added to a seized territory.
    pub seizure_greenery_gain: u8,
    /// Also bump the seizing competitor's counter.
    pub count_seizures: bool,
}

impl Default for CompetitorParams {
    fn default() -> Self {
        Self {
            score_min: 5,
            score_span: 15,
            counter_threshold: 0.7,
            seizure_threshold: 0.85,
            seizure_pollution_drop: 10,
            seizure_greenery_gain: 10,
            count_seizures: false,
        }
    }
}

impl CompetitorParams {
    pub fn validate(&self) -> Result<(), AiError> {
        for t in [self.counter_threshold, self.seizure_threshold] {
            if !(0.0..=1.0).contains(&t) {
                return Err(AiError::InvalidThreshold(t));
            }
        }
        if self.score_span == 0 {
            return Err(AiError::EmptyScoreSpan);
        }
        Ok(())
    }
}

/// A territory taken by a competitor during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Seizure {
    pub territory: TerritoryId,
    pub competitor: CompetitorId,
}

/// What one competitor tick changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Score gained per competitor, in roster order.
    pub score_gains: Vec<(CompetitorId, u32)>,
    /// Competitors whose counter was bumped by the random step.
    pub counter_bumps: Vec<CompetitorId>,
    pub seizures: Vec<Seizure>,
}

/// The three rivals every session starts with.
pub fn default_roster() -> Vec<Competitor> {
    let mk = |id: u32, name: &str, color: &str, avatar: &str| Competitor {
        id: CompetitorId(id),
        name: name.to_string(),
        color: color.to_string(),
        score: 0,
        territories_owned: 0,
        avatar: avatar.to_string(),
    };
    vec![
        mk(1, "Green Wave", "blue", "wave"),
        mk(2, "Eco Rangers", "amber", "ranger"),
        mk(3, "Terra Guard", "purple", "shield"),
    ]
}

/// Run one competitor tick.
///
/// Every competitor first gains a random score increment and, with
/// probability `1 - counter_threshold`, a counter bump. Then every
/// territory that is unowned at that point is seized with probability
/// `1 - seizure_threshold` by a uniformly chosen competitor. Seizure skips
/// the player capture thresholds.
pub fn simulate<R: RandomSource>(
    roster: &mut [Competitor],
    registry: &mut TerritoryRegistry,
    params: &CompetitorParams,
    rng: &mut R,
) -> Result<SimulationReport, CoreError> {
    let mut report = SimulationReport::default();
    for c in roster.iter_mut() {
        let gain = params.score_min + (rng.next_unit() * f64::from(params.score_span)).floor() as u32;
        c.score = c.score.saturating_add(gain);
        report.score_gains.push((c.id, gain));
        if rng.next_unit() > params.counter_threshold {
            c.territories_owned = c.territories_owned.saturating_add(1);
            report.counter_bumps.push(c.id);
        }
    }

    for id in registry.unowned_ids() {
        if rng.next_unit() <= params.seizure_threshold || roster.is_empty() {
            continue;
        }
        let pick = rng.pick_index(roster.len());
        let winner = &mut roster[pick];
        let seized = registry.seize(
            id,
            Owner::Competitor(winner.id),
            params.seizure_pollution_drop,
            params.seizure_greenery_gain,
        )?;
        if seized {
            if params.count_seizures {
                winner.territories_owned = winner.territories_owned.saturating_add(1);
            }
            debug!(territory = %id, competitor = %winner.name, "competitor seized territory");
            report.seizures.push(Seizure {
                territory: id,
                competitor: winner.id,
            });
        }
    }
    Ok(report)
}
