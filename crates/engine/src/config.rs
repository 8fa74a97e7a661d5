//! Engine configuration, read from the environment

use crate::leaderboard::GmScoreMode;
use std::env;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "data/trades.db";
const DEFAULT_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub db_path: String,
    /// Base URL of the authoritative grading service. `None` forces local fallback.
    pub grading_base_url: Option<String>,
    pub service_role_key: Option<String>,
    pub anon_key: Option<String>,
    /// Wall-clock budget for one remote evaluation, across all auth strategies
    pub remote_timeout: Duration,
    pub gm_score_mode: GmScoreMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            grading_base_url: None,
            service_role_key: None,
            anon_key: None,
            remote_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            gm_score_mode: GmScoreMode::default(),
        }
    }
}

impl EvalConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_secs: u64 = env::var("GRADING_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("GRADING_TIMEOUT_SECS must be an integer: {e}"))?;

        let gm_score_mode = match env::var("GM_SCORE_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => GmScoreMode::default(),
        };

        Ok(Self {
            db_path: env::var("TRADE_EVAL_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into()),
            grading_base_url: non_empty_var("GRADING_SERVICE_URL"),
            service_role_key: non_empty_var("GRADING_SERVICE_ROLE_KEY"),
            anon_key: non_empty_var("GRADING_ANON_KEY"),
            remote_timeout: Duration::from_secs(timeout_secs),
            gm_score_mode,
        })
    }

    /// Returns true if a remote grading service is configured at all
    pub fn has_remote(&self) -> bool {
        self.grading_base_url.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
