//! Remote grading service client — authoritative grades and simulations
//!
//! Each call walks an ordered list of credential strategies. A 401 moves on
//! to the next strategy; any other failure stops immediately so a failing
//! service is not hit four times. Strategies are tried strictly in sequence.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const UNAUTHORIZED: u16 = 401;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one remote evaluation, decoded at the boundary
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    /// HTTP 2xx with `success: true`; the full response body
    Authoritative(Value),
    Unavailable(UnavailableReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnavailableReason {
    /// No base URL configured
    NotConfigured,
    /// No credential of any kind was available
    NoCredentials,
    /// Every strategy was answered with 401
    AuthExhausted,
    Transport(String),
    HttpStatus(u16),
    MalformedBody(String),
    /// 2xx but `success` was not true
    Rejected(Option<String>),
    Timeout(Duration),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "grading service not configured"),
            Self::NoCredentials => write!(f, "no credentials available"),
            Self::AuthExhausted => write!(f, "all credential strategies rejected (401)"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::HttpStatus(code) => write!(f, "grading service returned HTTP {code}"),
            Self::MalformedBody(e) => write!(f, "malformed response: {e}"),
            Self::Rejected(Some(msg)) => write!(f, "grading service reported failure: {msg}"),
            Self::Rejected(None) => write!(f, "grading service reported failure"),
            Self::Timeout(d) => write!(f, "timed out after {}s", d.as_secs()),
        }
    }
}

/// Result of a single strategy attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(Value),
    /// Wrong credential; try the next strategy
    RetryableFailure,
    /// Service down or bad request; stop
    FatalFailure(UnavailableReason),
}

// ---------------------------------------------------------------------------
// Credential strategies
// ---------------------------------------------------------------------------

/// Service-level credentials, from configuration
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub service_role_key: Option<String>,
    pub anon_key: Option<String>,
}

/// One way of presenting a credential
#[derive(Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// The calling user's own bearer token
    UserBearer(String),
    /// Service-role key as a bearer token
    ServiceRole(String),
    /// Service-role key in the `apikey` header
    ServiceRoleApiKey(String),
    /// Low-privilege anonymous key, bearer plus `apikey`
    Anonymous(String),
}

// Keys never reach logs
impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AuthStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserBearer(_) => "user_bearer",
            Self::ServiceRole(_) => "service_role",
            Self::ServiceRoleApiKey(_) => "service_role_apikey",
            Self::Anonymous(_) => "anonymous",
        }
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::UserBearer(token) | Self::ServiceRole(token) => request.bearer_auth(token),
            Self::ServiceRoleApiKey(key) => request.header("apikey", key),
            Self::Anonymous(key) => request.bearer_auth(key).header("apikey", key),
        }
    }
}

/// Strategies in priority order, from whatever credentials exist
pub fn build_strategies(user_token: Option<&str>, credentials: &Credentials) -> Vec<AuthStrategy> {
    let mut strategies = Vec::with_capacity(4);
    if let Some(token) = user_token.filter(|t| !t.is_empty()) {
        strategies.push(AuthStrategy::UserBearer(token.to_string()));
    }
    if let Some(key) = &credentials.service_role_key {
        strategies.push(AuthStrategy::ServiceRole(key.clone()));
        strategies.push(AuthStrategy::ServiceRoleApiKey(key.clone()));
    }
    if let Some(key) = &credentials.anon_key {
        strategies.push(AuthStrategy::Anonymous(key.clone()));
    }
    strategies
}

/// Walk the strategies in order: next only on `RetryableFailure`
pub async fn run_strategies<'a, F, Fut>(
    strategies: &'a [AuthStrategy],
    mut attempt: F,
) -> RemoteOutcome
where
    F: FnMut(&'a AuthStrategy) -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    if strategies.is_empty() {
        return RemoteOutcome::Unavailable(UnavailableReason::NoCredentials);
    }

    for strategy in strategies {
        match attempt(strategy).await {
            AttemptOutcome::Success(body) => {
                debug!(strategy = strategy.name(), "Remote evaluation succeeded");
                return RemoteOutcome::Authoritative(body);
            }
            AttemptOutcome::RetryableFailure => {
                debug!(
                    strategy = strategy.name(),
                    "Credential rejected, trying next strategy"
                );
            }
            AttemptOutcome::FatalFailure(reason) => {
                warn!(strategy = strategy.name(), %reason, "Remote evaluation failed");
                return RemoteOutcome::Unavailable(reason);
            }
        }
    }

    RemoteOutcome::Unavailable(UnavailableReason::AuthExhausted)
}

/// Classify a 2xx body: authoritative only when `success` is literally true
pub fn classify_body(body: Value) -> AttemptOutcome {
    match body.get("success").and_then(Value::as_bool) {
        Some(true) => AttemptOutcome::Success(body),
        _ => {
            let message = body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string);
            AttemptOutcome::FatalFailure(UnavailableReason::Rejected(message))
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Remote operations the orchestrator can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEndpoint {
    GradeTrade,
    SimulateOutcomes,
    SimulateSeason,
    WhatIf,
}

impl RemoteEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::GradeTrade => "grade-trade",
            Self::SimulateOutcomes => "simulate-trade-outcomes",
            Self::SimulateSeason => "simulate-season",
            Self::WhatIf => "what-if-scenario",
        }
    }
}

/// Seam between the orchestrator and the remote service
#[async_trait]
pub trait RemoteEvaluator: Send + Sync {
    async fn call(
        &self,
        endpoint: RemoteEndpoint,
        payload: &Value,
        user_token: Option<&str>,
    ) -> RemoteOutcome;
}

/// HTTP client for the authoritative grading service
#[derive(Clone)]
pub struct GradingServiceClient {
    client: Client,
    base_url: Option<String>,
    credentials: Credentials,
}

impl GradingServiceClient {
    pub fn new(
        base_url: Option<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            credentials,
        })
    }

    async fn attempt(&self, url: &str, payload: &Value, strategy: &AuthStrategy) -> AttemptOutcome {
        let request = strategy.apply(self.client.post(url).json(payload));

        let resp = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                let reason = UnavailableReason::Transport(e.to_string());
                return AttemptOutcome::FatalFailure(reason);
            }
        };

        let status = resp.status();
        if status.as_u16() == UNAUTHORIZED {
            return AttemptOutcome::RetryableFailure;
        }
        if !status.is_success() {
            return AttemptOutcome::FatalFailure(UnavailableReason::HttpStatus(status.as_u16()));
        }

        match resp.json::<Value>().await {
            Ok(body) => classify_body(body),
            Err(e) => AttemptOutcome::FatalFailure(UnavailableReason::MalformedBody(e.to_string())),
        }
    }
}

#[async_trait]
impl RemoteEvaluator for GradingServiceClient {
    async fn call(
        &self,
        endpoint: RemoteEndpoint,
        payload: &Value,
        user_token: Option<&str>,
    ) -> RemoteOutcome {
        let Some(base_url) = &self.base_url else {
            return RemoteOutcome::Unavailable(UnavailableReason::NotConfigured);
        };

        let url = format!("{}/{}", base_url, endpoint.path());
        let strategies = build_strategies(user_token, &self.credentials);
        info!(
            endpoint = endpoint.path(),
            strategies = strategies.len(),
            "Calling grading service"
        );

        run_strategies(&strategies, |strategy| self.attempt(&url, payload, strategy)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
