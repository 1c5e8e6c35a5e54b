//! Score combiner and verdict policy
//!
//! Folds the ordered signal outcomes into one bounded `RiskResult`.
//! Application order: self-transaction, external verification
//! (base-replacing), report history, velocity (de-duplicated), high-value
//! amplifier, fan-in override. The verdict cutoffs are 70/30 by default.

use crate::config::EngineConfig;
use crate::signals::{BotPatternOutcome, VerificationOutcome, VERIFIER_FALLBACK_REASON};
use crate::types::{RiskResult, RiskScore, SignalOutcome, Verdict};
use chrono::Utc;
use rust_decimal::Decimal;

pub(crate) const HIGH_VALUE_DELTA: u32 = 20;
pub(crate) const HIGH_VALUE_REASON: &str = "High value transaction to suspicious account";

/// One check's worth of provider outputs, in evaluation order
pub(crate) struct SignalSet {
    pub self_transaction: SignalOutcome,
    pub verification: VerificationOutcome,
    pub report_history: SignalOutcome,
    pub velocity: SignalOutcome,
    pub bot_pattern: BotPatternOutcome,
}

/// Append a reason unless the exact text is already present.
///
/// Duplicate reasons are allowed only with distinct text; two sources
/// reporting the same finding verbatim collapse to one line.
fn push_reason(reasons: &mut Vec<String>, reason: String) {
    if !reasons.contains(&reason) {
        reasons.push(reason);
    }
}

fn push_reasons(reasons: &mut Vec<String>, new_reasons: Vec<String>) {
    for reason in new_reasons {
        push_reason(reasons, reason);
    }
}

/// Fold the signal outcomes into the final result.
pub(crate) fn combine(amount: Decimal, signals: SignalSet, config: &EngineConfig) -> RiskResult {
    let mut score: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    score += signals.self_transaction.delta;
    push_reasons(&mut reasons, signals.self_transaction.reasons);

    // A positive oracle opinion becomes the authoritative base score,
    // replacing what local structural checks accumulated so far. The
    // remaining local signals then adjust it.
    let mut oracle_scored = false;
    let mut oracle_down = false;
    match signals.verification {
        VerificationOutcome::Scored(opinion) => {
            score = u32::from(opinion.risk_score);
            push_reasons(&mut reasons, opinion.breakdown);
            oracle_scored = true;
        }
        VerificationOutcome::NoOpinion => {}
        VerificationOutcome::Unavailable => {
            oracle_down = true;
        }
    }

    score += signals.report_history.delta;
    push_reasons(&mut reasons, signals.report_history.reasons);

    // With an oracle base score in place, skip the velocity contribution if
    // some already-collected reason encodes the same underlying fact.
    if signals.velocity.delta > 0 {
        let already_counted = oracle_scored
            && reasons
                .iter()
                .any(|reason| reason.to_lowercase().contains("velocity"));
        if !already_counted {
            score += signals.velocity.delta;
            push_reasons(&mut reasons, signals.velocity.reasons);
        }
    }

    // Amplifier, not an independent signal: a large payment is only
    // suspicious when something else already is.
    if score > 0 && amount > config.high_value_threshold {
        score += HIGH_VALUE_DELTA;
        push_reason(&mut reasons, HIGH_VALUE_REASON.to_string());
    }

    // The degraded-mode note closes the explanation, after the local rules
    // that carried the analysis.
    if oracle_down {
        push_reason(&mut reasons, VERIFIER_FALLBACK_REASON.to_string());
    }

    // Fan-in override dominates everything computed above. Earlier reasons
    // are kept for explainability; they cannot reduce severity. The verdict
    // is forced directly: the override does not route through the cutoffs.
    let mut forced_verdict = None;
    if let BotPatternOutcome::Override { reason } = signals.bot_pattern {
        score = 100;
        push_reason(&mut reasons, reason);
        forced_verdict = Some(Verdict::Malicious);
    }

    let score = RiskScore::from_accumulated(score);
    RiskResult {
        score,
        verdict: forced_verdict.unwrap_or_else(|| Verdict::from_score(score, config)),
        reasons,
        assessed_at: Utc::now(),
    }
}
