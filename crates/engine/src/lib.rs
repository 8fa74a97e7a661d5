//! Trade Evaluation Engine: grading, simulation, and scenario analysis
//!
//! Every evaluation is delegated to the remote grading service first and
//! falls back to a local computation when that service cannot answer.
//! Provides:
//! - Evaluation orchestrator with provenance-tagged results
//! - Remote grading client with ordered credential fallback
//! - Monte Carlo outcome simulation and what-if scenario deltas
//! - Draft pick valuation across four value charts
//! - GM leaderboard aggregation over trade history

pub mod api;
pub mod config;
pub mod draft_value;
pub mod error;
pub mod leaderboard;
pub mod orchestrator;
pub mod scenario;
pub mod season;
pub mod simulation;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use api::{
    GradingServiceClient, RemoteEndpoint, RemoteEvaluator, RemoteOutcome, UnavailableReason,
};
pub use config::EvalConfig;
pub use draft_value::{ChartWeights, DraftCapital, PickValuationRow, TeamDraftCapital};
pub use error::{EvalError, EvalResult};
pub use leaderboard::{
    GmScoreMode, LeaderboardPage, LeaderboardParams, LeaderboardQuery, LeaderboardSort, SortOrder,
    UserGmScore,
};
pub use orchestrator::{
    EvaluationOrchestrator, EvaluationRequest, EvaluationResponse, GradeRequest, GradeResult,
    SeasonOutcome,
};
pub use scenario::{ScenarioParameters, ScenarioResult, ScenarioType, WhatIfRequest};
pub use season::{SeasonProjection, SimulateSeasonRequest, Sport};
pub use simulation::{SimulateOutcomesRequest, SimulationResult, Volatility};
pub use store::{SqliteTradeStore, TradeStore};
pub use types::*;
