use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::SignalKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitLevels {
    pub target: f64,
    pub stop_loss: f64,
}

/// Picks target/stop-loss levels for a freshly minted signal.
///
/// Injected so tests can pin the magnitudes. HOLD signals never get exit
/// levels, which is why they also never close.
pub trait ExitPolicy: Send {
    fn exit_levels(&mut self, kind: SignalKind, entry_price: f64) -> Option<ExitLevels>;
}

/// Draws target offsets in [3%, 15%] and stop offsets in [2%, 8%] from a
/// seedable RNG. BUY targets sit above entry with the stop below; SELL is
/// mirrored. There is no real risk model behind these bands.
pub struct BandExitPolicy {
    rng: StdRng,
    target_band: (f64, f64),
    stop_band: (f64, f64),
}

impl BandExitPolicy {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            target_band: (0.03, 0.15),
            stop_band: (0.02, 0.08),
        }
    }
}

impl Default for BandExitPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitPolicy for BandExitPolicy {
    // Draws happen inside the Buy/Sell arms so HOLD calls leave the RNG
    // untouched and a seeded sequence depends only on minted signals.
    fn exit_levels(&mut self, kind: SignalKind, entry_price: f64) -> Option<ExitLevels> {
        match kind {
            SignalKind::Buy => {
                let target_off = self.rng.random_range(self.target_band.0..self.target_band.1);
                let stop_off = self.rng.random_range(self.stop_band.0..self.stop_band.1);
                Some(ExitLevels {
                    target: entry_price * (1.0 + target_off),
                    stop_loss: entry_price * (1.0 - stop_off),
                })
            }
            SignalKind::Sell => {
                let target_off = self.rng.random_range(self.target_band.0..self.target_band.1);
                let stop_off = self.rng.random_range(self.stop_band.0..self.stop_band.1);
                Some(ExitLevels {
                    target: entry_price * (1.0 - target_off),
                    stop_loss: entry_price * (1.0 + stop_off),
                })
            }
            SignalKind::Hold => None,
        }
    }
}
