use crate::market::MarketSnapshot;

use super::types::{SignalKind, SignalStrength};

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: SignalKind,
    pub strength: SignalStrength,
    pub confidence: u8,
    pub reasoning: String,
}

/// Map a snapshot onto a BUY/SELL/HOLD label from 24h thresholds.
///
/// Pure and deterministic: same four numeric inputs, same output. The rows
/// are checked top to bottom, first match wins:
///
///   pct > 5  and vol/cap > 0.1  => BUY  STRONG   85
///   pct > 2                     => BUY  MODERATE 70
///   pct < -5 and vol/cap > 0.1  => SELL STRONG   80
///   pct < -2                    => SELL MODERATE 65
///   otherwise                   => HOLD, MODERATE when |pct| > 1 else WEAK, 60
pub fn classify(snapshot: &MarketSnapshot) -> Classification {
    let pct = snapshot.pct_change_24h;
    let vol_ratio = snapshot.volume_ratio();

    if pct > 5.0 && vol_ratio > 0.1 {
        return Classification {
            kind: SignalKind::Buy,
            strength: SignalStrength::Strong,
            confidence: 85,
            reasoning: format!(
                "Strong upward momentum: up {:.2}% in 24h on heavy volume",
                pct
            ),
        };
    }

    if pct > 2.0 {
        return Classification {
            kind: SignalKind::Buy,
            strength: SignalStrength::Moderate,
            confidence: 70,
            reasoning: format!("Positive momentum: up {:.2}% in 24h", pct),
        };
    }

    if pct < -5.0 && vol_ratio > 0.1 {
        return Classification {
            kind: SignalKind::Sell,
            strength: SignalStrength::Strong,
            confidence: 80,
            reasoning: format!(
                "Heavy selling pressure: down {:.2}% in 24h on heavy volume",
                pct.abs()
            ),
        };
    }

    if pct < -2.0 {
        return Classification {
            kind: SignalKind::Sell,
            strength: SignalStrength::Moderate,
            confidence: 65,
            reasoning: format!("Negative momentum: down {:.2}% in 24h", pct.abs()),
        };
    }

    Classification {
        kind: SignalKind::Hold,
        strength: if pct.abs() > 1.0 {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        },
        confidence: 60,
        reasoning: format!("No clear direction: {:.2}% in 24h", pct),
    }
}
