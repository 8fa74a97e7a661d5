//! Read-only access to the persistent trade store

use crate::error::EvalResult;
use crate::leaderboard::TradeOutcome;
use crate::types::{clamp_grade, Trade, TradeStatus};
use async_trait::async_trait;
use persistence::repository::TradeRepository;
use persistence::SqlitePool;

/// Seam between the engine and wherever trades live
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn get_trade(&self, trade_id: &str) -> EvalResult<Option<Trade>>;

    async fn session_trades(
        &self,
        session_id: &str,
        status: Option<TradeStatus>,
    ) -> EvalResult<Vec<Trade>>;

    /// Every historical trade, for leaderboard aggregation
    async fn trade_outcomes(&self) -> EvalResult<Vec<TradeOutcome>>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteTradeStore {
    pool: SqlitePool,
}

impl SqliteTradeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeStore for SqliteTradeStore {
    async fn get_trade(&self, trade_id: &str) -> EvalResult<Option<Trade>> {
        let repo = TradeRepository::new(&self.pool);
        repo.get_by_id(trade_id)
            .await?
            .map(Trade::try_from)
            .transpose()
    }

    async fn session_trades(
        &self,
        session_id: &str,
        status: Option<TradeStatus>,
    ) -> EvalResult<Vec<Trade>> {
        let repo = TradeRepository::new(&self.pool);
        repo.get_by_session(session_id, status.as_ref().map(TradeStatus::as_str))
            .await?
            .into_iter()
            .map(Trade::try_from)
            .collect()
    }

    async fn trade_outcomes(&self) -> EvalResult<Vec<TradeOutcome>> {
        let repo = TradeRepository::new(&self.pool);
        let records = repo.get_all_outcomes().await?;
        Ok(records
            .into_iter()
            .map(|r| TradeOutcome {
                status: TradeStatus::parse(&r.status),
                grade: clamp_grade(r.grade as f64),
                user_id: r.user_id,
                user_email: r.user_email,
                user_display_name: r.user_display_name,
                created_at: r.created_at,
            })
            .collect())
    }
}
