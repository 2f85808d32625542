//! Per-match statistics
//!
//! Counted by the simulation as it runs; read by HUD and end screens.

use serde::{Deserialize, Serialize};

use crate::sim::Side;

/// Counters for one side of the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideStats {
    /// Shots struck (recons excluded)
    pub shots: u32,
    /// Object balls pocketed
    pub lit_pockets: u32,
    /// Cue balls pocketed
    pub scratches: u32,
    /// Recon scans used
    pub recons: u32,
}

impl SideStats {
    /// Pockets per shot, 0 when no shots were taken
    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.lit_pockets as f32 / self.shots as f32
        }
    }
}

/// Statistics for both sides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub player: SideStats,
    pub ai: SideStats,
}

impl MatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn side(&self, side: Side) -> &SideStats {
        match side {
            Side::Player => &self.player,
            Side::Ai => &self.ai,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideStats {
        match side {
            Side::Player => &mut self.player,
            Side::Ai => &mut self.ai,
        }
    }

    pub fn record_shot(&mut self, side: Side) {
        self.side_mut(side).shots += 1;
    }

    pub fn record_pocket(&mut self, side: Side) {
        self.side_mut(side).lit_pockets += 1;
    }

    pub fn record_scratch(&mut self, side: Side) {
        self.side_mut(side).scratches += 1;
    }

    pub fn record_recon(&mut self, side: Side) {
        self.side_mut(side).recons += 1;
    }

    /// One-line summary for logs and the end screen
    pub fn summary(&self) -> String {
        format!(
            "player {} shots / {} pocketed / {} scratches, ai {} shots / {} pocketed / {} scratches",
            self.player.shots,
            self.player.lit_pockets,
            self.player.scratches,
            self.ai.shots,
            self.ai.lit_pockets,
            self.ai.scratches,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_side() {
        let mut stats = MatchStats::new();
        stats.record_shot(Side::Player);
        stats.record_shot(Side::Player);
        stats.record_pocket(Side::Player);
        stats.record_scratch(Side::Ai);

        assert_eq!(stats.player.shots, 2);
        assert_eq!(stats.player.lit_pockets, 1);
        assert_eq!(stats.ai.scratches, 1);
        assert_eq!(stats.ai.shots, 0);
        assert!((stats.player.accuracy() - 0.5).abs() < 1e-6);
        assert_eq!(stats.ai.accuracy(), 0.0);
    }
}
