//! Fraud Engine for PaySentry
//!
//! Real-time receiver-side risk scoring for payment requests. Given a
//! `TransactionCheck`, the engine combines historical report counts,
//! transaction velocity, fan-in (bot) patterns, structural anomalies and an
//! external verification oracle into one bounded, explainable `RiskResult`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod verifier;

mod scoring;
mod signals;

pub use analyzer::RiskAnalyzer;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use store::{HistoryStore, MemoryHistoryStore};
pub use types::*;
pub use verifier::{HttpVerifier, StaticVerifier, Verifier, VerifierOpinion};
