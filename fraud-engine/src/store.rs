//! Transaction history store interface and in-memory implementation

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Read-only view of past transactions and scam reports.
///
/// The engine only ever queries this interface; writing history is the
/// embedding application's concern. Implementations may retry transient
/// failures internally; any error they return is treated by the analyzer as
/// "signal unavailable", never as fatal.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Number of scam reports filed against `receiver_id`
    async fn count_reports(&self, receiver_id: &str) -> Result<u64>;

    /// Number of inbound transactions to `receiver_id` recorded at or after
    /// `since`
    async fn count_transactions_since(
        &self,
        receiver_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u64>;

    /// Distinct sender ids that paid `receiver_id` at or after `since`,
    /// excluding `excluding` (so the current sender's own retries do not
    /// inflate the count)
    async fn distinct_senders_since(
        &self,
        receiver_id: &str,
        since: DateTime<Utc>,
        excluding: &str,
    ) -> Result<HashSet<String>>;
}

/// Inbound transaction record tracked per receiver
#[derive(Debug, Clone)]
struct InboundRecord {
    transaction_id: Uuid,
    sender_id: String,
    received_at: DateTime<Utc>,
}

/// In-memory history store backed by per-receiver record lists.
///
/// Suitable for tests, demos and single-process embedding. Records older
/// than the retention horizon are pruned on write.
pub struct MemoryHistoryStore {
    retention: Duration,
    // Map: receiver_id -> inbound transactions
    inbound: DashMap<String, Vec<InboundRecord>>,
    // Map: receiver_id -> report count
    reports: DashMap<String, u64>,
}

impl MemoryHistoryStore {
    /// Create a store with a 24-hour retention horizon
    pub fn new() -> Self {
        Self::with_retention(Duration::hours(24))
    }

    /// Create a store with a custom retention horizon
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            retention,
            inbound: DashMap::new(),
            reports: DashMap::new(),
        }
    }

    /// Record an inbound transaction observed now
    pub fn record_transaction(&self, sender_id: &str, receiver_id: &str) -> Uuid {
        self.record_transaction_at(sender_id, receiver_id, Utc::now())
    }

    /// Record an inbound transaction with an explicit timestamp
    pub fn record_transaction_at(
        &self,
        sender_id: &str,
        receiver_id: &str,
        received_at: DateTime<Utc>,
    ) -> Uuid {
        let transaction_id = Uuid::new_v4();
        let horizon = Utc::now() - self.retention;

        let mut entry = self.inbound.entry(receiver_id.to_string()).or_default();
        entry.retain(|record| record.received_at >= horizon);
        entry.push(InboundRecord {
            transaction_id,
            sender_id: sender_id.to_string(),
            received_at,
        });

        transaction_id
    }

    /// File a scam report against `receiver_id`
    pub fn record_report(&self, receiver_id: &str) {
        *self.reports.entry(receiver_id.to_string()).or_insert(0) += 1;
    }

    /// Whether a recorded transaction is still retained for `receiver_id`.
    ///
    /// Lets embedders confirm a previously recorded transaction by the id
    /// `record_transaction` handed back, e.g. to skip double-recording on
    /// retried requests.
    pub fn contains_transaction(&self, receiver_id: &str, transaction_id: Uuid) -> bool {
        self.inbound
            .get(receiver_id)
            .map(|records| {
                records
                    .iter()
                    .any(|record| record.transaction_id == transaction_id)
            })
            .unwrap_or(false)
    }

    /// Number of receivers with tracked inbound history
    pub fn tracked_receivers(&self) -> usize {
        self.inbound.len()
    }

    /// Drop all history for a receiver
    pub fn reset_receiver(&self, receiver_id: &str) {
        self.inbound.remove(receiver_id);
        self.reports.remove(receiver_id);
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn count_reports(&self, receiver_id: &str) -> Result<u64> {
        Ok(self
            .reports
            .get(receiver_id)
            .map(|count| *count)
            .unwrap_or(0))
    }

    async fn count_transactions_since(
        &self,
        receiver_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count = self
            .inbound
            .get(receiver_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.received_at >= since)
                    .count() as u64
            })
            .unwrap_or(0);
        Ok(count)
    }

    async fn distinct_senders_since(
        &self,
        receiver_id: &str,
        since: DateTime<Utc>,
        excluding: &str,
    ) -> Result<HashSet<String>> {
        let senders = self
            .inbound
            .get(receiver_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        record.received_at >= since && record.sender_id != excluding
                    })
                    .map(|record| record.sender_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(senders)
    }
}

#[cfg(test)]
use crate::error::Error;

/// Store stub that fails every query, for degraded-path tests
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
#[async_trait]
impl HistoryStore for FailingStore {
    async fn count_reports(&self, _receiver_id: &str) -> Result<u64> {
        Err(Error::Store("connection refused".to_string()))
    }

    async fn count_transactions_since(
        &self,
        _receiver_id: &str,
        _since: DateTime<Utc>,
    ) -> Result<u64> {
        Err(Error::Store("connection refused".to_string()))
    }

    async fn distinct_senders_since(
        &self,
        _receiver_id: &str,
        _since: DateTime<Utc>,
        _excluding: &str,
    ) -> Result<HashSet<String>> {
        Err(Error::Store("connection refused".to_string()))
    }
}
