#![deny(warnings)]

//! Headless driver: runs a session in virtual or wall-clock time with an
//! optional autoplay bot and prints the final leaderboard.

use anyhow::{bail, Result};
use std::time::Duration;
use terra_core::{RandomSource, ResourceKind, TerritoryId, TerritoryKind};
use terra_runtime::{GameConfig, GameSession};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    preset: Option<String>,
    config: Option<String>,
    seconds: Option<u32>,
    seed: Option<u64>,
    realtime: bool,
    autoplay: bool,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--preset" => args.preset = it.next(),
            "--config" => args.config = it.next(),
            "--seconds" => args.seconds = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--realtime" => args.realtime = true,
            "--autoplay" => args.autoplay = true,
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

fn load_config(args: &Args) -> Result<GameConfig> {
    match (&args.config, &args.preset) {
        (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
        (Some(path), None) => Ok(GameConfig::load(path)?),
        (None, Some(name)) => Ok(GameConfig::preset(name)?),
        (None, None) => Ok(GameConfig::classic()),
    }
}

/// Seconds between autoplay decisions.
const AUTOPLAY_EVERY: u32 = 5;

/// Act on the first unowned territory that has an affordable action,
/// otherwise buy a card toward the first target's cheapest action.
fn autoplay_step<R: RandomSource>(session: &mut GameSession<R>) -> bool {
    let targets: Vec<(TerritoryId, TerritoryKind)> = session
        .registry()
        .list_unowned()
        .iter()
        .map(|t| (t.id, t.kind))
        .collect();
    for (id, kind) in &targets {
        let choice = session
            .catalog()
            .affordable_for(*kind, session.ledger())
            .first()
            .map(|a| a.id.clone());
        if let Some(action) = choice {
            return session.perform_action(action.as_str(), *id).is_applied();
        }
    }
    let Some((_, kind)) = targets.first() else {
        return false;
    };
    let need = session
        .catalog()
        .applicable_to(*kind)
        .first()
        .map(|a| a.cost.resources);
    let missing = need.and_then(|need| {
        ResourceKind::ALL
            .into_iter()
            .find(|k| session.ledger().total(*k) < need.get(*k))
    });
    match missing {
        Some(k) => session.buy_resource_card(k).is_some(),
        None => false,
    }
}

fn run_virtual<R: RandomSource>(session: &mut GameSession<R>, seconds: u32, autoplay: bool) {
    for second in 1..=seconds {
        session.tick();
        if autoplay && second % AUTOPLAY_EVERY == 0 {
            autoplay_step(session);
        }
    }
}

async fn run_realtime<R: RandomSource>(session: &mut GameSession<R>, seconds: u32, autoplay: bool) {
    let rival_every = u64::from(session.config().clock.competitor_interval_seconds);
    let mut round_timer = tokio::time::interval(Duration::from_secs(1));
    let mut rival_timer = tokio::time::interval(Duration::from_secs(rival_every));
    // Intervals complete their first tick immediately.
    round_timer.tick().await;
    rival_timer.tick().await;
    let deadline = tokio::time::sleep(Duration::from_secs(u64::from(seconds)));
    tokio::pin!(deadline);
    let mut elapsed = 0u32;
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = round_timer.tick() => {
                elapsed += 1;
                if let Some((round, sim)) = session.tick_round() {
                    info!(round, seizures = sim.seizures.len(), "new round");
                }
                if autoplay && elapsed % AUTOPLAY_EVERY == 0 {
                    autoplay_step(session);
                }
            }
            _ = rival_timer.tick() => {
                session.competitor_tick();
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(?args, "starting CLI");

    let config = load_config(&args)?;
    let seconds = args.seconds.unwrap_or(config.clock.round_seconds * 3);
    let mut session = GameSession::with_seed(config, args.seed.unwrap_or(42))?;
    session.start();

    if args.realtime {
        run_realtime(&mut session, seconds, args.autoplay).await;
    } else {
        run_virtual(&mut session, seconds, args.autoplay);
    }
    session.stop();

    let snap = session.snapshot();
    if args.json {
        println!("{}", snap.to_json()?);
        return Ok(());
    }

    println!(
        "Round {} | {}s left | currency: {} | cards: {} | cleaned: {}/{}",
        snap.clock.round,
        snap.clock.time_remaining,
        snap.ledger.currency,
        snap.ledger.cards.len(),
        snap.player_territories,
        snap.total_territories
    );
    for (rank, entry) in snap.leaderboard.iter().enumerate() {
        println!(
            "{:>2}. {:<14} {:>6} pts | {} territories{}",
            rank + 1,
            entry.name,
            entry.score,
            entry.territories,
            if entry.is_player { "  <- you" } else { "" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::ScriptedRandom;

    #[test]
    fn autoplay_makes_progress() {
        let mut s = GameSession::new(GameConfig::currency_only(), ScriptedRandom::new(vec![0.0])).unwrap();
        s.start();
        run_virtual(&mut s, 60, true);
        assert!(s.player_score() > 0);
        assert!(s.ledger().currency() < 400 + 200);
    }

    #[test]
    fn autoplay_buys_missing_cards() {
        let cfg = GameConfig::builder().starting_cards_per_kind(0).build().unwrap();
        let mut s = GameSession::new(cfg, ScriptedRandom::new(vec![0.0])).unwrap();
        s.start();
        assert!(autoplay_step(&mut s));
        assert_eq!(s.ledger().cards().len(), 1);
        assert_eq!(s.ledger().currency(), 350);
    }

    #[test]
    fn config_flags_are_exclusive() {
        let args = Args {
            preset: Some("easy".into()),
            config: Some("x.yaml".into()),
            ..Args::default()
        };
        assert!(load_config(&args).is_err());
        let args = Args {
            preset: Some("easy".into()),
            ..Args::default()
        };
        assert_eq!(load_config(&args).unwrap().ledger.starting_currency, 600);
    }
}
