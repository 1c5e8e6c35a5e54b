//! Core types for the fraud engine

use crate::config::EngineConfig;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A payment request under evaluation.
///
/// Constructed fresh per request and assumed validated upstream (non-empty
/// identifiers, positive amount).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCheck {
    /// Paying party, an opaque VPA string
    pub sender_id: String,

    /// Receiving party, an opaque VPA string
    pub receiver_id: String,

    /// Transfer amount
    pub amount: Decimal,
}

impl TransactionCheck {
    /// Create a new check
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            amount,
        }
    }

    /// Whether sender and receiver are the same party
    pub fn is_self_transaction(&self) -> bool {
        self.sender_id == self.receiver_id
    }
}

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Clamp an accumulated (possibly overflowing) total into range
    pub fn from_accumulated(total: u32) -> Self {
        Self(total.min(100) as u8)
    }

    /// Get raw score
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verdict tier derived from the numeric score
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// No meaningful risk indicators
    Safe,
    /// Enough indicators to warrant caution
    Suspicious,
    /// Near-conclusive evidence of fraud
    Malicious,
}

impl Verdict {
    /// Map a score to its verdict tier under the configured cutoffs.
    ///
    /// Total and monotonic: a higher score never maps to a less severe tier.
    pub fn from_score(score: RiskScore, config: &EngineConfig) -> Self {
        if score.value() >= config.malicious_cutoff {
            Verdict::Malicious
        } else if score.value() >= config.suspicious_cutoff {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Suspicious => write!(f, "SUSPICIOUS"),
            Verdict::Malicious => write!(f, "MALICIOUS"),
        }
    }
}

/// Whether a signal provider obtained its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStatus {
    /// Provider evaluated normally
    Ok,
    /// Provider could not obtain its data; contributes nothing
    Unavailable,
}

/// Partial contribution from one signal provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalOutcome {
    /// Score contribution
    pub delta: u32,

    /// Human-readable reasons for the contribution
    pub reasons: Vec<String>,

    /// Provider status
    pub status: SignalStatus,
}

impl SignalOutcome {
    /// No opinion, nothing flagged
    pub fn clean() -> Self {
        Self {
            delta: 0,
            reasons: Vec::new(),
            status: SignalStatus::Ok,
        }
    }

    /// A positive finding with one reason
    pub fn flagged(delta: u32, reason: impl Into<String>) -> Self {
        Self {
            delta,
            reasons: vec![reason.into()],
            status: SignalStatus::Ok,
        }
    }

    /// Provider failed; zero contribution
    pub fn unavailable() -> Self {
        Self {
            delta: 0,
            reasons: Vec::new(),
            status: SignalStatus::Unavailable,
        }
    }
}

/// Final risk assessment for one payment request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    /// Bounded risk score
    pub score: RiskScore,

    /// Verdict tier
    pub verdict: Verdict,

    /// Triggering reasons, in provider evaluation order
    pub reasons: Vec<String>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
