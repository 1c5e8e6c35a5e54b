//! Signal providers
//!
//! Each provider inspects one dimension of risk and returns a partial
//! contribution. A provider that cannot obtain its data degrades to
//! `Unavailable` with zero delta; it never aborts the overall analysis.

use crate::config::EngineConfig;
use crate::store::HistoryStore;
use crate::types::{SignalOutcome, TransactionCheck};
use crate::verifier::{Verifier, VerifierOpinion};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

pub(crate) const SELF_TRANSACTION_DELTA: u32 = 50;
pub(crate) const REPORTED_RECEIVER_DELTA: u32 = 80;
pub(crate) const HIGH_VELOCITY_DELTA: u32 = 30;
pub(crate) const MODERATE_VELOCITY_DELTA: u32 = 10;

pub(crate) const SELF_TRANSACTION_REASON: &str =
    "Circular Transaction: Sender and Receiver are identical";
pub(crate) const HIGH_VELOCITY_REASON: &str = "High transaction velocity (10+ in 1 hour)";
pub(crate) const MODERATE_VELOCITY_REASON: &str = "Moderate transaction velocity";
pub(crate) const VERIFIER_FALLBACK_REASON: &str =
    "ML Service Unavailable (Fallback to basic rules)";

/// Structural check: sender paying itself
pub(crate) fn self_transaction(check: &TransactionCheck) -> SignalOutcome {
    if check.is_self_transaction() {
        SignalOutcome::flagged(SELF_TRANSACTION_DELTA, SELF_TRANSACTION_REASON)
    } else {
        SignalOutcome::clean()
    }
}

/// Has this receiver been reported as a scammer before?
///
/// The delta is flat regardless of the report count; the count only feeds
/// the reason text.
pub(crate) async fn report_history(
    store: &dyn HistoryStore,
    receiver_id: &str,
) -> SignalOutcome {
    match store.count_reports(receiver_id).await {
        Ok(0) => SignalOutcome::clean(),
        Ok(count) => SignalOutcome::flagged(
            REPORTED_RECEIVER_DELTA,
            format!("Flagged as scam by {count} users"),
        ),
        Err(e) => {
            warn!("Report lookup failed for {receiver_id}: {e}");
            SignalOutcome::unavailable()
        }
    }
}

/// Raw inbound load on the receiver over the velocity window
pub(crate) async fn velocity(
    store: &dyn HistoryStore,
    receiver_id: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> SignalOutcome {
    let since = now - config.velocity_window();
    match store.count_transactions_since(receiver_id, since).await {
        Ok(count) if count > config.velocity_high_count => {
            SignalOutcome::flagged(HIGH_VELOCITY_DELTA, HIGH_VELOCITY_REASON)
        }
        Ok(count) if count > config.velocity_moderate_count => {
            SignalOutcome::flagged(MODERATE_VELOCITY_DELTA, MODERATE_VELOCITY_REASON)
        }
        Ok(_) => SignalOutcome::clean(),
        Err(e) => {
            warn!("Velocity lookup failed for {receiver_id}: {e}");
            SignalOutcome::unavailable()
        }
    }
}

/// Outcome of the fan-in (payment bombing) check
pub(crate) enum BotPatternOutcome {
    /// No anomalous fan-in
    Clear,
    /// Store query failed; no contribution
    Unavailable,
    /// Fan-in burst detected; the final score is forced to 100
    Override {
        /// Reason describing the burst
        reason: String,
    },
}

/// Many distinct senders hitting one receiver in a short burst.
///
/// The current request's own sender is excluded so a single retrying sender
/// cannot trip the override.
pub(crate) async fn bot_pattern(
    store: &dyn HistoryStore,
    check: &TransactionCheck,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> BotPatternOutcome {
    let since = now - config.bot_window();
    match store
        .distinct_senders_since(&check.receiver_id, since, &check.sender_id)
        .await
    {
        Ok(senders) if senders.len() >= config.bot_distinct_sender_threshold => {
            BotPatternOutcome::Override {
                reason: format!(
                    "Velocity Anomaly: Targeted by {} distinct senders in {}m (Bot-like pattern)",
                    senders.len(),
                    config.bot_window_minutes
                ),
            }
        }
        Ok(_) => BotPatternOutcome::Clear,
        Err(e) => {
            warn!("Fan-in lookup failed for {}: {e}", check.receiver_id);
            BotPatternOutcome::Unavailable
        }
    }
}

/// Outcome of the external verification call
pub(crate) enum VerificationOutcome {
    /// Oracle answered with a positive score; becomes the base score
    Scored(VerifierOpinion),
    /// Oracle answered with score 0; no effect
    NoOpinion,
    /// Oracle failed or timed out; local rules carry the analysis
    Unavailable,
}

/// Call the oracle with a bounded lifetime.
///
/// Dropping the future on timeout also drops the pending request; nothing
/// leaks past the check.
pub(crate) async fn verification(
    verifier: &dyn Verifier,
    check: &TransactionCheck,
    timeout: Duration,
) -> VerificationOutcome {
    match tokio::time::timeout(timeout, verifier.verify(check)).await {
        Ok(Ok(opinion)) if opinion.risk_score > 0 => VerificationOutcome::Scored(opinion),
        Ok(Ok(_)) => VerificationOutcome::NoOpinion,
        Ok(Err(e)) => {
            warn!("Verifier call failed for {}: {e}", check.receiver_id);
            VerificationOutcome::Unavailable
        }
        Err(_) => {
            warn!(
                "Verifier call timed out after {timeout:?} for {}",
                check.receiver_id
            );
            VerificationOutcome::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FailingStore, MemoryHistoryStore};
    use crate::types::SignalStatus;
    use crate::verifier::StaticVerifier;
    use rust_decimal::Decimal;

    fn check(sender: &str, receiver: &str) -> TransactionCheck {
        TransactionCheck::new(sender, receiver, Decimal::from(500))
    }

    #[test]
    fn test_self_transaction_signal() {
        let outcome = self_transaction(&check("a@upi", "a@upi"));
        assert_eq!(outcome.delta, SELF_TRANSACTION_DELTA);
        assert_eq!(outcome.reasons, vec![SELF_TRANSACTION_REASON.to_string()]);

        let outcome = self_transaction(&check("a@upi", "b@upi"));
        assert_eq!(outcome.delta, 0);
        assert!(outcome.reasons.is_empty());
    }

    #[tokio::test]
    async fn test_report_history_flat_delta() {
        let store = MemoryHistoryStore::new();
        for _ in 0..7 {
            store.record_report("shop@upi");
        }

        let outcome = report_history(&store, "shop@upi").await;
        assert_eq!(outcome.delta, REPORTED_RECEIVER_DELTA);
        assert_eq!(outcome.reasons, vec!["Flagged as scam by 7 users".to_string()]);

        let outcome = report_history(&store, "clean@upi").await;
        assert_eq!(outcome.delta, 0);
    }

    #[tokio::test]
    async fn test_report_history_degrades_on_store_failure() {
        let outcome = report_history(&FailingStore, "shop@upi").await;
        assert_eq!(outcome.delta, 0);
        assert_eq!(outcome.status, SignalStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_velocity_tiers() {
        let config = EngineConfig::default();
        let store = MemoryHistoryStore::new();
        let now = Utc::now();

        // 6 recent inbound -> moderate
        for i in 0..6_i64 {
            store.record_transaction_at(
                &format!("s{i}@upi"),
                "shop@upi",
                now - chrono::Duration::minutes(i),
            );
        }
        let outcome = velocity(&store, "shop@upi", now, &config).await;
        assert_eq!(outcome.delta, MODERATE_VELOCITY_DELTA);

        // 11 recent inbound -> high
        for i in 6..11_i64 {
            store.record_transaction_at(
                &format!("s{i}@upi"),
                "shop@upi",
                now - chrono::Duration::minutes(i),
            );
        }
        let outcome = velocity(&store, "shop@upi", now, &config).await;
        assert_eq!(outcome.delta, HIGH_VELOCITY_DELTA);
        assert_eq!(outcome.reasons, vec![HIGH_VELOCITY_REASON.to_string()]);
    }

    #[tokio::test]
    async fn test_velocity_ignores_stale_history() {
        let config = EngineConfig::default();
        let store = MemoryHistoryStore::new();
        let now = Utc::now();

        for i in 0..20_i64 {
            store.record_transaction_at(
                &format!("s{i}@upi"),
                "shop@upi",
                now - chrono::Duration::hours(2),
            );
        }

        let outcome = velocity(&store, "shop@upi", now, &config).await;
        assert_eq!(outcome.delta, 0);
    }

    #[tokio::test]
    async fn test_bot_pattern_threshold() {
        let config = EngineConfig::default();
        let store = MemoryHistoryStore::new();
        let now = Utc::now();
        let incoming = check("current@upi", "victim@upi");

        for i in 0..4_i64 {
            store.record_transaction_at(
                &format!("bot{i}@upi"),
                "victim@upi",
                now - chrono::Duration::minutes(i),
            );
        }
        assert!(matches!(
            bot_pattern(&store, &incoming, now, &config).await,
            BotPatternOutcome::Clear
        ));

        store.record_transaction_at("bot4@upi", "victim@upi", now);
        match bot_pattern(&store, &incoming, now, &config).await {
            BotPatternOutcome::Override { reason } => {
                assert_eq!(
                    reason,
                    "Velocity Anomaly: Targeted by 5 distinct senders in 15m (Bot-like pattern)"
                );
            }
            _ => panic!("expected override at 5 distinct senders"),
        }
    }

    #[tokio::test]
    async fn test_bot_pattern_excludes_current_sender() {
        let config = EngineConfig::default();
        let store = MemoryHistoryStore::new();
        let now = Utc::now();

        // One sender retrying 10 times is not a fan-in burst
        for _ in 0..10 {
            store.record_transaction_at("retry@upi", "victim@upi", now);
        }

        let incoming = check("retry@upi", "victim@upi");
        assert!(matches!(
            bot_pattern(&store, &incoming, now, &config).await,
            BotPatternOutcome::Clear
        ));
    }

    #[tokio::test]
    async fn test_verification_zero_score_is_no_opinion() {
        let verifier = StaticVerifier::silent();
        let outcome = verification(
            &verifier,
            &check("a@upi", "b@upi"),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(outcome, VerificationOutcome::NoOpinion));
    }

    #[tokio::test]
    async fn test_verification_failure_degrades() {
        let verifier = StaticVerifier::unavailable();
        let outcome = verification(
            &verifier,
            &check("a@upi", "b@upi"),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(outcome, VerificationOutcome::Unavailable));
    }
}
