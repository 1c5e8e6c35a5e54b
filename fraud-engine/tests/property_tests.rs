//! Property-based tests for scoring invariants
//!
//! Verified over arbitrary histories and oracle opinions:
//! - The score is always within [0, 100]
//! - The verdict is a monotonic function of the score
//! - A fan-in burst at or past the threshold always forces 100/MALICIOUS

use fraud_engine::{
    EngineConfig, MemoryHistoryStore, RiskAnalyzer, RiskScore, StaticVerifier, TransactionCheck,
    Verdict, VerifierOpinion,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Strategy for opaque VPA-style identifiers
fn vpa_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{3,8}@upi").unwrap()
}

proptest! {
    #[test]
    fn score_is_bounded_and_verdict_consistent(
        reports in 0u64..50,
        distinct_senders in 0usize..12,
        repeats_per_sender in 1usize..4,
        oracle_score in 0u8..=100,
        amount_units in 1u64..200_000,
        self_transaction in any::<bool>(),
    ) {
        let result = runtime().block_on(async {
            let store = Arc::new(MemoryHistoryStore::new());
            for _ in 0..reports {
                store.record_report("receiver@upi");
            }
            for sender in 0..distinct_senders {
                for _ in 0..repeats_per_sender {
                    store.record_transaction(&format!("sender{sender}@upi"), "receiver@upi");
                }
            }

            let verifier = Arc::new(StaticVerifier::with_opinion(VerifierOpinion {
                risk_score: oracle_score,
                breakdown: vec!["Model flagged receiver".to_string()],
            }));
            let analyzer = RiskAnalyzer::new(store, verifier);

            let sender = if self_transaction { "receiver@upi" } else { "payer@upi" };
            let check = TransactionCheck::new(sender, "receiver@upi", Decimal::from(amount_units));
            analyzer.analyze(&check).await
        });

        prop_assert!(result.score.value() <= 100);

        let config = EngineConfig::default();
        prop_assert_eq!(result.verdict, Verdict::from_score(result.score, &config));

        // Recorded senders never include the current one, so at or past the
        // threshold the override must dominate.
        if distinct_senders >= config.bot_distinct_sender_threshold && !self_transaction {
            prop_assert_eq!(result.score.value(), 100);
            prop_assert_eq!(result.verdict, Verdict::Malicious);
        }
    }

    #[test]
    fn verdict_is_monotonic_in_score(lower in 0u8..=100, upper in 0u8..=100) {
        let config = EngineConfig::default();
        let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };

        let low = Verdict::from_score(RiskScore::new(lower), &config);
        let high = Verdict::from_score(RiskScore::new(upper), &config);
        prop_assert!(low <= high);
    }

    #[test]
    fn self_transactions_never_score_below_fifty(
        receiver in vpa_strategy(),
        amount_units in 1u64..200_000,
    ) {
        let result = runtime().block_on(async {
            let store = Arc::new(MemoryHistoryStore::new());
            let verifier = Arc::new(StaticVerifier::silent());
            let analyzer = RiskAnalyzer::new(store, verifier);

            let check = TransactionCheck::new(
                receiver.clone(),
                receiver.clone(),
                Decimal::from(amount_units),
            );
            analyzer.analyze(&check).await
        });

        prop_assert!(result.score.value() >= 50);
        prop_assert!(result
            .reasons
            .contains(&"Circular Transaction: Sender and Receiver are identical".to_string()));
    }
}
