//! Verification oracle interface and HTTP client

use crate::error::{Error, Result};
use crate::types::TransactionCheck;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Independent risk opinion returned by the oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierOpinion {
    /// Oracle score in [0, 100]; 0 means "no opinion"
    pub risk_score: u8,

    /// Oracle's explanation strings, appended verbatim to the result reasons
    pub breakdown: Vec<String>,
}

/// Remote oracle providing an independent risk judgment.
///
/// Modeled as a capability behind a trait so tests can inject deterministic
/// stand-ins; see [`StaticVerifier`].
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Score one payment request
    async fn verify(&self, check: &TransactionCheck) -> Result<VerifierOpinion>;
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    sender_vpa: &'a str,
    receiver_vpa: &'a str,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    // The model reports a float probability scaled to [0, 100]
    risk_score: f64,
    #[serde(default)]
    breakdown: Vec<String>,
}

impl VerifyResponse {
    fn into_opinion(self) -> VerifierOpinion {
        VerifierOpinion {
            risk_score: self.risk_score.clamp(0.0, 100.0).round() as u8,
            breakdown: self.breakdown,
        }
    }
}

/// HTTP client for the verification oracle
pub struct HttpVerifier {
    endpoint: String,
    http_client: Client,
}

impl HttpVerifier {
    /// Create a client for the oracle at `endpoint` with a request-level
    /// timeout. A slow oracle fails the call; it never hangs the check.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Verifier(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(&self, check: &TransactionCheck) -> Result<VerifierOpinion> {
        let request = VerifyRequest {
            sender_vpa: &check.sender_id,
            receiver_vpa: &check.receiver_id,
            amount: check.amount,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::VerifierTimeout
                } else {
                    Error::Verifier(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::Verifier(format!(
                "oracle returned status {}",
                response.status()
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| Error::Verifier(format!("malformed response body: {e}")))?;

        Ok(body.into_opinion())
    }
}

/// Fixed-response verifier for tests and offline runs
pub struct StaticVerifier {
    opinion: Option<VerifierOpinion>,
}

impl StaticVerifier {
    /// Always answer with the given opinion
    pub fn with_opinion(opinion: VerifierOpinion) -> Self {
        Self {
            opinion: Some(opinion),
        }
    }

    /// Always answer "no opinion" (score 0)
    pub fn silent() -> Self {
        Self::with_opinion(VerifierOpinion {
            risk_score: 0,
            breakdown: Vec::new(),
        })
    }

    /// Always fail, simulating an unreachable oracle
    pub fn unavailable() -> Self {
        Self { opinion: None }
    }
}

#[async_trait]
impl Verifier for StaticVerifier {
    async fn verify(&self, _check: &TransactionCheck) -> Result<VerifierOpinion> {
        match &self.opinion {
            Some(opinion) => Ok(opinion.clone()),
            None => Err(Error::Verifier("oracle unreachable".to_string())),
        }
    }
}
