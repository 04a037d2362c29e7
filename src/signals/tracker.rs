use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::market::MarketSnapshot;

use super::classifier::classify;
use super::sizing::ExitPolicy;
use super::types::{CloseReason, Signal, SignalEvent, SignalKind};

// Performance must move by this many percentage points in one tick...
const MOVE_DELTA_PCT: f64 = 2.0;
// ...while sitting beyond this absolute level, to count as significant.
const MOVE_FLOOR_PCT: f64 = 5.0;

/// Single owner of every signal minted this session.
///
/// Minting appends, reticks mutate evaluation state only, and nothing else
/// touches the set. Oldest signals are dropped past `max_signals` to bound
/// memory; that cap is a display policy, not a correctness rule.
pub struct SignalBook {
    signals: Vec<Signal>,
    max_signals: usize,
    policy: Box<dyn ExitPolicy>,
}

impl SignalBook {
    pub fn new(max_signals: usize, policy: Box<dyn ExitPolicy>) -> Self {
        Self {
            signals: Vec::new(),
            max_signals,
            policy,
        }
    }

    /// Classify the given snapshots and mint up to `max_new` open signals,
    /// highest confidence first. HOLD classifications are skipped, as are
    /// symbols that already carry an open signal.
    pub fn generate(&mut self, snapshots: &[MarketSnapshot], max_new: usize) -> Vec<Signal> {
        let open_symbols: HashSet<&str> = self
            .signals
            .iter()
            .filter(|s| s.open)
            .map(|s| s.symbol.as_str())
            .collect();

        let mut candidates: Vec<(&MarketSnapshot, _)> = snapshots
            .iter()
            .filter(|s| !open_symbols.contains(s.symbol.as_str()))
            .map(|s| (s, classify(s)))
            .filter(|(_, c)| c.kind != SignalKind::Hold)
            .collect();

        candidates.sort_by(|a, b| b.1.confidence.cmp(&a.1.confidence));

        let mut minted = Vec::new();
        for (snapshot, classification) in candidates.into_iter().take(max_new) {
            let exits = self
                .policy
                .exit_levels(classification.kind, snapshot.price);
            let now = Utc::now();

            let signal = Signal {
                id: Uuid::new_v4(),
                symbol: snapshot.symbol.clone(),
                kind: classification.kind,
                strength: classification.strength,
                confidence: classification.confidence,
                entry_price: snapshot.price,
                target_price: exits.map(|e| e.target),
                stop_loss: exits.map(|e| e.stop_loss),
                reasoning: classification.reasoning,
                created_at: now,
                updated_at: now,
                open: true,
                performance_pct: 0.0,
                close_reason: None,
            };

            info!(
                "🆕 {:?}/{:?} signal for {} @ ${:.4} (confidence {})",
                signal.kind, signal.strength, signal.symbol, signal.entry_price, signal.confidence
            );

            self.signals.push(signal.clone());
            minted.push(signal);
        }

        // Bound memory: keep the most recent signals by creation order
        if self.signals.len() > self.max_signals {
            let excess = self.signals.len() - self.max_signals;
            self.signals.drain(0..excess);
            debug!("🗑️ Dropped {} oldest signals (cap {})", excess, self.max_signals);
        }

        minted
    }

    /// One evaluation pass over all open signals against the latest
    /// snapshots. A symbol missing from the list is skipped silently and
    /// the signal stays open unchanged. Each signal is independent, so a
    /// bad record never aborts the rest of the batch.
    pub fn retick(&mut self, latest: &[MarketSnapshot]) -> Vec<SignalEvent> {
        let by_symbol: HashMap<&str, &MarketSnapshot> =
            latest.iter().map(|s| (s.symbol.as_str(), s)).collect();

        let mut events = Vec::new();

        for signal in self.signals.iter_mut() {
            if !signal.open {
                continue;
            }

            let snapshot = match by_symbol.get(signal.symbol.as_str()) {
                Some(s) => *s,
                None => {
                    debug!("🔍 {} not in latest snapshots, skipping", signal.symbol);
                    continue;
                }
            };

            let current = snapshot.price;
            let previous_perf = signal.performance_pct;
            signal.performance_pct = signal.performance_for(current);
            signal.updated_at = Utc::now();

            // Target first, then stop-loss. HOLD signals carry neither and
            // stay open indefinitely.
            let hit_target = match (signal.kind, signal.target_price) {
                (SignalKind::Buy, Some(target)) => current >= target,
                (SignalKind::Sell, Some(target)) => current <= target,
                _ => false,
            };
            if hit_target {
                signal.open = false;
                signal.close_reason = Some(CloseReason::HitTarget);
                info!(
                    "🎯 {} hit target at ${:.4} ({:+.2}%)",
                    signal.symbol, current, signal.performance_pct
                );
                events.push(SignalEvent::Closed {
                    signal: signal.clone(),
                    reason: CloseReason::HitTarget,
                });
                continue;
            }

            let hit_stop = match (signal.kind, signal.stop_loss) {
                (SignalKind::Buy, Some(stop)) => current <= stop,
                (SignalKind::Sell, Some(stop)) => current >= stop,
                _ => false,
            };
            if hit_stop {
                signal.open = false;
                signal.close_reason = Some(CloseReason::HitStopLoss);
                warn!(
                    "🛑 {} hit stop-loss at ${:.4} ({:+.2}%)",
                    signal.symbol, current, signal.performance_pct
                );
                events.push(SignalEvent::Closed {
                    signal: signal.clone(),
                    reason: CloseReason::HitStopLoss,
                });
                continue;
            }

            let delta = signal.performance_pct - previous_perf;
            if delta.abs() > MOVE_DELTA_PCT && signal.performance_pct.abs() > MOVE_FLOOR_PCT {
                events.push(SignalEvent::SignificantMove {
                    signal: signal.clone(),
                    delta_pct: delta,
                });
            }
        }

        events
    }

    /// Seed the book from persisted records (startup restore).
    pub fn restore(&mut self, mut signals: Vec<Signal>) {
        signals.sort_by_key(|s| s.created_at);
        self.signals = signals;
        if self.signals.len() > self.max_signals {
            let excess = self.signals.len() - self.max_signals;
            self.signals.drain(0..excess);
        }
        info!("📥 Restored {} signals ({} open)", self.signals.len(), self.open_count());
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn open_count(&self) -> usize {
        self.signals.iter().filter(|s| s.open).count()
    }
}
