use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    HitTarget,
    HitStopLoss,
}

/// A minted recommendation, tracked until it closes.
///
/// `symbol` is a weak reference into the snapshot list: the asset can drop
/// out of the top markets at any time, in which case reticks simply skip
/// the signal. Entry, target and stop-loss are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub symbol: String,
    pub kind: SignalKind,
    pub strength: SignalStrength,
    pub confidence: u8,
    pub entry_price: f64,
    pub target_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub open: bool,
    pub performance_pct: f64,
    pub close_reason: Option<CloseReason>,
}

impl Signal {
    /// Signed performance relative to entry. SELL signals profit when the
    /// price falls, so the sign flips; HOLD reads like a BUY for display.
    pub fn performance_for(&self, current_price: f64) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        match self.kind {
            SignalKind::Sell => (self.entry_price - current_price) / self.entry_price * 100.0,
            _ => (current_price - self.entry_price) / self.entry_price * 100.0,
        }
    }
}

/// Presentation events emitted by a retick pass.
#[derive(Debug, Clone)]
pub enum SignalEvent {
    Closed {
        signal: Signal,
        reason: CloseReason,
    },
    SignificantMove {
        signal: Signal,
        /// Percentage-point change in performance since the previous tick.
        delta_pct: f64,
    },
}
