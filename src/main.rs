//! Blind Break entry point
//!
//! Native builds run headless autopilot matches (AI on both sides) and log
//! the results. The browser build starts from `web::wasm_start` instead.
//!
//! Usage: `blind-break [MATCHES] [--tuning tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use blind_break::sim::{self, GameState, MatchOutcome};
    use blind_break::{MatchStats, Tuning};
    use clap::Parser;

    /// Host frame rate the runner pretends to have
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Simulated seconds before a match is abandoned
    const MATCH_TIMEOUT: f32 = 1800.0;

    #[derive(Parser, Debug)]
    #[command(name = "blind-break")]
    #[command(about = "Run seeded Blind Break matches with the AI on both sides")]
    pub struct Cli {
        /// Matches to play, seeded 1..=N
        #[arg(default_value_t = 5)]
        pub matches: u64,
        /// JSON tuning override; missing fields keep their defaults
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

    pub fn load_tuning(path: Option<&Path>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Tuning::from_json(&json).with_context(|| path.display().to_string())
    }

    pub fn play(seed: u64, tuning: &Tuning) -> Option<(MatchOutcome, MatchStats)> {
        let mut state = GameState::with_tuning(seed, tuning.clone());
        sim::set_autopilot(&mut state, true);

        let mut elapsed = 0.0;
        while !state.is_over() {
            if elapsed > MATCH_TIMEOUT {
                log::warn!("Seed {seed}: match abandoned after {MATCH_TIMEOUT}s");
                return None;
            }
            sim::advance(&mut state, FRAME_DT);
            elapsed += FRAME_DT;
            state.drain_events();
        }

        let outcome = state.outcome?;
        log::info!(
            "Seed {seed}: {:?} wins {}-{} in {:.0}s simulated",
            outcome.winner,
            outcome.player_score,
            outcome.ai_score,
            elapsed
        );
        Some((outcome, state.stats))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::init();
    log::info!("Blind Break (headless) starting...");

    let cli = headless::Cli::parse();
    let matches = cli.matches;
    let tuning = headless::load_tuning(cli.tuning.as_deref())?;

    let mut wins = [0u32; 3];
    let mut cleared = 0;
    for seed in 1..=matches {
        let Some((outcome, stats)) = headless::play(seed, &tuning) else {
            continue;
        };
        let slot = match outcome.winner {
            Some(blind_break::sim::Side::Player) => 0,
            Some(blind_break::sim::Side::Ai) => 1,
            None => 2,
        };
        wins[slot] += 1;
        if outcome.cleared {
            cleared += 1;
        }
        log::debug!("Seed {seed} stats: {}", stats.summary());
    }

    println!(
        "{matches} matches: side A {} / side B {} / ties {} ({cleared} cleared)",
        wins[0], wins[1], wins[2]
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
