//! Risk analyzer orchestration

use crate::config::EngineConfig;
use crate::error::Result;
use crate::scoring::{self, SignalSet};
use crate::signals;
use crate::store::HistoryStore;
use crate::types::{RiskResult, TransactionCheck};
use crate::verifier::Verifier;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Risk analyzer, the engine's sole entry point.
///
/// Stateless per check; safe to share across concurrent requests.
pub struct RiskAnalyzer {
    store: Arc<dyn HistoryStore>,
    verifier: Arc<dyn Verifier>,
    config: EngineConfig,
}

impl RiskAnalyzer {
    /// Create an analyzer with default configuration
    pub fn new(store: Arc<dyn HistoryStore>, verifier: Arc<dyn Verifier>) -> Self {
        Self {
            store,
            verifier,
            config: EngineConfig::default(),
        }
    }

    /// Create an analyzer with custom configuration
    pub fn with_config(
        store: Arc<dyn HistoryStore>,
        verifier: Arc<dyn Verifier>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            verifier,
            config,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one payment request.
    ///
    /// Always produces a result: providers that fail degrade to zero
    /// contribution and the remaining signals carry the analysis. The
    /// history-backed signals and the oracle call run concurrently, so
    /// end-to-end latency is bounded by the slowest single provider.
    pub async fn analyze(&self, check: &TransactionCheck) -> RiskResult {
        let now = Utc::now();

        let self_transaction = signals::self_transaction(check);

        let (verification, report_history, velocity, bot_pattern) = tokio::join!(
            signals::verification(
                self.verifier.as_ref(),
                check,
                self.config.verifier_timeout()
            ),
            signals::report_history(self.store.as_ref(), &check.receiver_id),
            signals::velocity(self.store.as_ref(), &check.receiver_id, now, &self.config),
            signals::bot_pattern(self.store.as_ref(), check, now, &self.config),
        );

        let result = scoring::combine(
            check.amount,
            SignalSet {
                self_transaction,
                verification,
                report_history,
                velocity,
                bot_pattern,
            },
            &self.config,
        );

        info!(
            "Risk check complete: score {} ({}) for receiver {}",
            result.score, result.verdict, check.receiver_id
        );

        result
    }
}
