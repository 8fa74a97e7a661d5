//! Evaluation Orchestrator
//!
//! Every request goes to the remote grading service first. A response counts
//! as authoritative only if the call returned 2xx with `success: true` and
//! the body decodes into the expected shape; anything else falls back to the
//! matching local computation and the result is tagged `local_fallback`.
//! Remote trouble never reaches the caller as an error.

use crate::api::{RemoteEndpoint, RemoteEvaluator, RemoteOutcome, UnavailableReason};
use crate::draft_value::{
    aggregate, trade_draft_capital, validate_picks, ChartWeights, DraftCapital, TeamDraftCapital,
};
use crate::error::{EvalError, EvalResult};
use crate::leaderboard::{
    aggregate_user_scores, query_leaderboard, GmScoreMode, LeaderboardPage, LeaderboardQuery,
};
use crate::scenario::{evaluate_scenario, ScenarioResult, WhatIfRequest};
use crate::season::{project_season, SeasonProjection, SimulateSeasonRequest};
use crate::simulation::{simulate_outcomes, SimulateOutcomesRequest, SimulationResult};
use crate::store::TradeStore;
use crate::types::{DraftPickAsset, Evaluation, TradeStatus, MAX_GRADE, MIN_GRADE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(25);

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub trade_id: String,
}

/// Tagged request accepted by [`EvaluationOrchestrator::evaluate`]
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationRequest {
    Grade(GradeRequest),
    SimulateOutcomes(SimulateOutcomesRequest),
    SimulateSeason(SimulateSeasonRequest),
    WhatIf(WhatIfRequest),
}

impl EvaluationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Grade(_) => "grade",
            Self::SimulateOutcomes(_) => "simulate_outcomes",
            Self::SimulateSeason(_) => "simulate_season",
            Self::WhatIf(_) => "what_if",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeResult {
    pub trade_id: String,
    pub grade: u8,
    /// Opaque component breakdown from the grading model; absent locally
    pub breakdown: Option<Value>,
    pub draft_capital: Vec<TeamDraftCapital>,
}

/// Season projections: the remote simulator's payload is passed through as-is
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SeasonOutcome {
    Remote(Value),
    Local(SeasonProjection),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EvaluationResponse {
    Grade(Evaluation<GradeResult>),
    SimulateOutcomes(Evaluation<SimulationResult>),
    SimulateSeason(Evaluation<SeasonOutcome>),
    WhatIf(Evaluation<ScenarioResult>),
}

/// Shape the grading service returns for `grade-trade`
#[derive(Debug, Deserialize)]
struct RemoteGrade {
    grade: i64,
    #[serde(default)]
    breakdown: Option<Value>,
}

/// Range checks on a decoded authoritative body; a failure is a malformed body
trait CheckedBody: DeserializeOwned {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl CheckedBody for Value {}

impl CheckedBody for RemoteGrade {
    fn check(&self) -> Result<(), String> {
        grade_in_range("grade", self.grade)
    }
}

impl CheckedBody for SimulationResult {
    fn check(&self) -> Result<(), String> {
        grade_in_range("original_grade", self.original_grade.into())?;
        grade_in_range("median", self.median.into())?;
        for p in self.percentiles.as_array() {
            grade_in_range("percentile", p.into())?;
        }
        for g in self.risk.variance_band {
            grade_in_range("variance_band", g.into())?;
        }
        if let Some(&g) = self.outcomes.iter().find(|&&g| i32::from(g) > MAX_GRADE) {
            return Err(format!("outcome {g} out of range"));
        }
        if !(MIN_GRADE as f64..=MAX_GRADE as f64).contains(&self.mean) {
            return Err(format!("mean {} out of range", self.mean));
        }
        if self.risk.downside_risk > 100 || self.risk.upside_potential > 100 {
            return Err("risk percentage above 100".into());
        }
        Ok(())
    }
}

impl CheckedBody for ScenarioResult {
    fn check(&self) -> Result<(), String> {
        grade_in_range("original_grade", self.original_grade.into())?;
        grade_in_range("adjusted_grade", self.adjusted_grade.into())
    }
}

fn grade_in_range(field: &str, value: i64) -> Result<(), String> {
    if (i64::from(MIN_GRADE)..=i64::from(MAX_GRADE)).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} {value} out of range"))
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct EvaluationOrchestrator {
    store: Arc<dyn TradeStore>,
    remote: Arc<dyn RemoteEvaluator>,
    remote_timeout: Duration,
    chart_weights: ChartWeights,
    gm_score_mode: GmScoreMode,
}

impl EvaluationOrchestrator {
    pub fn new(store: Arc<dyn TradeStore>, remote: Arc<dyn RemoteEvaluator>) -> Self {
        Self {
            store,
            remote,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            chart_weights: ChartWeights::default(),
            gm_score_mode: GmScoreMode::default(),
        }
    }

    /// Upper wall-clock bound on one remote evaluation
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_gm_score_mode(mut self, mode: GmScoreMode) -> Self {
        self.gm_score_mode = mode;
        self
    }

    pub fn with_chart_weights(mut self, weights: ChartWeights) -> Self {
        self.chart_weights = weights;
        self
    }

    /// Dispatch a tagged request
    pub async fn evaluate(
        &self,
        request: &EvaluationRequest,
        user_token: Option<&str>,
    ) -> EvalResult<EvaluationResponse> {
        info!(kind = request.kind(), "Evaluation requested");
        Ok(match request {
            EvaluationRequest::Grade(r) => {
                EvaluationResponse::Grade(self.grade(r, user_token).await?)
            }
            EvaluationRequest::SimulateOutcomes(r) => {
                EvaluationResponse::SimulateOutcomes(self.simulate_outcomes(r, user_token).await?)
            }
            EvaluationRequest::SimulateSeason(r) => {
                EvaluationResponse::SimulateSeason(self.simulate_season(r, user_token).await?)
            }
            EvaluationRequest::WhatIf(r) => {
                EvaluationResponse::WhatIf(self.what_if(r, user_token).await?)
            }
        })
    }

    /// Grade a stored trade. Local fallback is the grade already on record.
    pub async fn grade(
        &self,
        request: &GradeRequest,
        user_token: Option<&str>,
    ) -> EvalResult<Evaluation<GradeResult>> {
        if request.trade_id.trim().is_empty() {
            return Err(EvalError::Validation("trade_id is required".into()));
        }
        let trade = self
            .store
            .get_trade(&request.trade_id)
            .await?
            .ok_or_else(|| EvalError::NotFound(format!("trade '{}'", request.trade_id)))?;

        let draft_capital = trade_draft_capital(&trade, &self.chart_weights);
        let payload = json!({ "trade_id": trade.id, "trade": trade });

        let remote = self
            .authoritative::<RemoteGrade>(
                "grade",
                RemoteEndpoint::GradeTrade,
                &payload,
                user_token,
            )
            .await;

        Ok(match remote {
            Ok(r) => Evaluation::authoritative(GradeResult {
                trade_id: trade.id,
                grade: r.grade as u8,
                breakdown: r.breakdown,
                draft_capital,
            }),
            Err(reason) => Evaluation::local(
                GradeResult {
                    trade_id: trade.id,
                    grade: trade.grade,
                    breakdown: None,
                    draft_capital,
                },
                reason.to_string(),
            ),
        })
    }

    /// Outcome distribution; local fallback is the Monte Carlo evaluator
    pub async fn simulate_outcomes(
        &self,
        request: &SimulateOutcomesRequest,
        user_token: Option<&str>,
    ) -> EvalResult<Evaluation<SimulationResult>> {
        let params = request.params()?;
        let payload = json!({
            "trade_id": request.trade_id,
            "original_grade": params.base_grade,
            "num_simulations": params.num_simulations,
            "volatility": params.volatility,
            "injury_factor": params.injury_factor,
            "development_factor": params.development_factor,
        });

        Ok(
            match self
                .authoritative::<SimulationResult>(
                    "simulate_outcomes",
                    RemoteEndpoint::SimulateOutcomes,
                    &payload,
                    user_token,
                )
                .await
            {
                Ok(result) => Evaluation::authoritative(result),
                Err(reason) => Evaluation::local(simulate_outcomes(&params), reason.to_string()),
            },
        )
    }

    /// Season projection with the session's accepted trades as context
    pub async fn simulate_season(
        &self,
        request: &SimulateSeasonRequest,
        user_token: Option<&str>,
    ) -> EvalResult<Evaluation<SeasonOutcome>> {
        let sport = request.validate()?;
        let session_trades = self
            .store
            .session_trades(&request.session_id, Some(TradeStatus::Accepted))
            .await?;

        let payload = json!({
            "session_id": request.session_id,
            "sport": sport,
            "team_key": request.team_key,
            "season_year": request.season_year_or_current(),
            "depth": request.depth.unwrap_or_default(),
            "trades": session_trades,
        });

        Ok(
            match self
                .authoritative::<Value>(
                    "simulate_season",
                    RemoteEndpoint::SimulateSeason,
                    &payload,
                    user_token,
                )
                .await
            {
                Ok(body) => Evaluation::authoritative(SeasonOutcome::Remote(body)),
                Err(reason) => Evaluation::local(
                    SeasonOutcome::Local(project_season(request, sport, &session_trades)),
                    reason.to_string(),
                ),
            },
        )
    }

    /// Scenario delta. Validated locally before the remote is consulted.
    pub async fn what_if(
        &self,
        request: &WhatIfRequest,
        user_token: Option<&str>,
    ) -> EvalResult<Evaluation<ScenarioResult>> {
        let (scenario, grade) = request.validate()?;
        let local = evaluate_scenario(scenario, &request.parameters, grade)?;

        let payload = json!({
            "trade_id": request.trade_id,
            "original_grade": grade,
            "scenario_type": scenario,
            "parameters": request.parameters,
        });

        Ok(
            match self
                .authoritative::<ScenarioResult>(
                    "what_if",
                    RemoteEndpoint::WhatIf,
                    &payload,
                    user_token,
                )
                .await
            {
                Ok(result) => Evaluation::authoritative(result),
                Err(reason) => Evaluation::local(local, reason.to_string()),
            },
        )
    }

    /// League-wide leaderboard, rebuilt from the full trade history
    pub async fn leaderboard(&self, query: &LeaderboardQuery) -> EvalResult<LeaderboardPage> {
        let outcomes = self.store.trade_outcomes().await?;
        let scores = aggregate_user_scores(&outcomes, self.gm_score_mode);
        Ok(query_leaderboard(scores, query))
    }

    /// Side-by-side chart values and total draft capital for a set of picks
    pub fn draft_valuation(&self, picks: &[DraftPickAsset]) -> EvalResult<DraftCapital> {
        validate_picks(picks)?;
        Ok(aggregate(picks, &self.chart_weights))
    }

    /// Call the remote within the timeout, decode the body as `T` and range-check it.
    /// Every failure is logged here and returned as the fallback reason.
    async fn authoritative<T: CheckedBody>(
        &self,
        kind: &'static str,
        endpoint: RemoteEndpoint,
        payload: &Value,
        user_token: Option<&str>,
    ) -> Result<T, UnavailableReason> {
        let outcome = match tokio::time::timeout(
            self.remote_timeout,
            self.remote.call(endpoint, payload, user_token),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => RemoteOutcome::Unavailable(UnavailableReason::Timeout(self.remote_timeout)),
        };

        let decoded = match outcome {
            RemoteOutcome::Authoritative(body) => serde_json::from_value::<T>(body)
                .map_err(|e| e.to_string())
                .and_then(|decoded| decoded.check().map(|()| decoded))
                .map_err(UnavailableReason::MalformedBody),
            RemoteOutcome::Unavailable(reason) => Err(reason),
        };

        if let Err(reason) = &decoded {
            warn!(kind, %reason, "Grading service unavailable, using local fallback");
        }
        decoded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::TradeOutcome;
    use crate::scenario::{InjurySeverity, ScenarioParameters, ScenarioType};
    use crate::simulation::SimulationParams;
    use crate::types::{AssetKind, Provenance, Trade, TradeAsset};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemoryStore {
        trades: Vec<Trade>,
    }

    #[async_trait]
    impl TradeStore for MemoryStore {
        async fn get_trade(&self, trade_id: &str) -> EvalResult<Option<Trade>> {
            Ok(self.trades.iter().find(|t| t.id == trade_id).cloned())
        }

        async fn session_trades(
            &self,
            session_id: &str,
            status: Option<TradeStatus>,
        ) -> EvalResult<Vec<Trade>> {
            Ok(self
                .trades
                .iter()
                .filter(|t| t.session_id == session_id)
                .filter(|t| status.map_or(true, |s| t.status == s))
                .cloned()
                .collect())
        }

        async fn trade_outcomes(&self) -> EvalResult<Vec<TradeOutcome>> {
            Ok(self
                .trades
                .iter()
                .map(|t| TradeOutcome {
                    user_id: t.user_id.clone(),
                    user_email: None,
                    user_display_name: None,
                    grade: t.grade,
                    status: Some(t.status),
                    created_at: t.created_at.clone(),
                })
                .collect())
        }
    }

    /// Remote that always answers the same way
    struct StubRemote {
        outcome: RemoteOutcome,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl StubRemote {
        fn new(outcome: RemoteOutcome) -> Self {
            Self {
                outcome,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteEvaluator for StubRemote {
        async fn call(
            &self,
            _endpoint: RemoteEndpoint,
            _payload: &Value,
            _user_token: Option<&str>,
        ) -> RemoteOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        }
    }

    fn sample_trade() -> Trade {
        Trade {
            id: "t1".into(),
            user_id: "u1".into(),
            session_id: "s1".into(),
            sport: "nfl".into(),
            teams: vec!["KC".into(), "BUF".into()],
            assets: vec![TradeAsset {
                from_team: "BUF".into(),
                to_team: "KC".into(),
                kind: AssetKind::DraftPick(DraftPickAsset {
                    year: 2027,
                    round: 2,
                    pick: None,
                    legacy_value: Some(dec!(20)),
                    modern_value: Some(dec!(20)),
                    surplus_value: Some(dec!(20)),
                    academic_value: Some(dec!(20)),
                    synthesized_value: None,
                }),
            }],
            grade: 64,
            status: TradeStatus::Accepted,
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn orchestrator(remote: StubRemote) -> (EvaluationOrchestrator, Arc<StubRemote>) {
        let remote = Arc::new(remote);
        let store = Arc::new(MemoryStore {
            trades: vec![sample_trade()],
        });
        (EvaluationOrchestrator::new(store, remote.clone()), remote)
    }

    fn unavailable() -> StubRemote {
        StubRemote::new(RemoteOutcome::Unavailable(UnavailableReason::HttpStatus(503)))
    }

    #[tokio::test]
    async fn test_grade_authoritative_is_idempotent() {
        let (orch, remote) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(
            json!({"success": true, "grade": 88, "breakdown": {"talent_balance": 30}}),
        )));
        let req = GradeRequest { trade_id: "t1".into() };

        let first = orch.grade(&req, Some("jwt")).await.unwrap();
        let second = orch.grade(&req, Some("jwt")).await.unwrap();

        assert_eq!(first.provenance, Provenance::Authoritative);
        assert_eq!(first.result.grade, 88);
        assert_eq!(first.result.grade, second.result.grade);
        assert_eq!(first.result.draft_capital[0].capital.total_draft_capital, dec!(20));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_grade_falls_back_to_stored_grade() {
        let (orch, _) = orchestrator(unavailable());
        let eval = orch
            .grade(&GradeRequest { trade_id: "t1".into() }, None)
            .await
            .unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        assert_eq!(eval.result.grade, 64);
        assert!(eval.result.breakdown.is_none());
        assert!(eval.fallback_reason.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_grade_out_of_range_remote_is_rejected() {
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(
            json!({"success": true, "grade": 140}),
        )));
        let eval = orch
            .grade(&GradeRequest { trade_id: "t1".into() }, None)
            .await
            .unwrap();
        assert!(!eval.is_authoritative());
        assert_eq!(eval.result.grade, 64);
    }

    #[tokio::test]
    async fn test_grade_unknown_trade_is_not_found() {
        let (orch, remote) = orchestrator(unavailable());
        let err = orch
            .grade(&GradeRequest { trade_id: "missing".into() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::NotFound(_)));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_simulate_outcomes_malformed_body_falls_back() {
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(
            json!({"success": true, "unexpected": "shape"}),
        )));
        let req = SimulateOutcomesRequest {
            trade_id: "t1".into(),
            original_grade: 70,
            num_simulations: Some(200),
            volatility: None,
            injury_factor: None,
            development_factor: None,
        };
        let eval = orch.simulate_outcomes(&req, None).await.unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        assert_eq!(eval.result.num_simulations, 200);
        assert_eq!(
            eval.result.histogram.iter().map(|b| b.count).sum::<usize>(),
            200
        );
    }

    fn remote_body<T: Serialize>(result: &T) -> Value {
        let mut body = serde_json::to_value(result).unwrap();
        body["success"] = json!(true);
        body
    }

    fn outcomes_request() -> SimulateOutcomesRequest {
        SimulateOutcomesRequest {
            trade_id: "t1".into(),
            original_grade: 70,
            num_simulations: Some(100),
            volatility: None,
            injury_factor: None,
            development_factor: None,
        }
    }

    #[tokio::test]
    async fn test_simulate_outcomes_authoritative_body_decodes() {
        let remote_result = simulate_outcomes(&SimulationParams::new(70));
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(remote_body(
            &remote_result,
        ))));
        let eval = orch.simulate_outcomes(&outcomes_request(), None).await.unwrap();
        assert!(eval.is_authoritative());
        assert_eq!(eval.result.num_simulations, remote_result.num_simulations);
        assert_eq!(eval.result.median, remote_result.median);
    }

    #[tokio::test]
    async fn test_simulate_outcomes_out_of_range_body_falls_back() {
        let mut body = remote_body(&simulate_outcomes(&SimulationParams::new(70)));
        body["median"] = json!(150);
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(body)));
        let eval = orch.simulate_outcomes(&outcomes_request(), None).await.unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        assert_eq!(eval.result.num_simulations, 100);
        assert!(eval.fallback_reason.unwrap().contains("median 150"));
    }

    fn injury_request() -> WhatIfRequest {
        WhatIfRequest {
            trade_id: "t1".into(),
            original_grade: 75,
            scenario_type: "injury_impact".into(),
            parameters: ScenarioParameters {
                severity: Some(InjurySeverity::Major),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_what_if_authoritative_body_decodes() {
        let mut remote_result = evaluate_scenario(
            ScenarioType::InjuryImpact,
            &injury_request().parameters,
            75,
        )
        .unwrap();
        remote_result.delta = -10;
        remote_result.adjusted_grade = 65;
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(remote_body(
            &remote_result,
        ))));
        let eval = orch.what_if(&injury_request(), None).await.unwrap();
        assert!(eval.is_authoritative());
        assert_eq!(eval.result.adjusted_grade, 65);
        assert_eq!(eval.result.delta, -10);
    }

    #[tokio::test]
    async fn test_what_if_adjusted_grade_out_of_range_falls_back() {
        let mut body = remote_body(
            &evaluate_scenario(ScenarioType::InjuryImpact, &injury_request().parameters, 75)
                .unwrap(),
        );
        body["adjusted_grade"] = json!(200);
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(body)));
        let eval = orch.what_if(&injury_request(), None).await.unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        assert_eq!(eval.result.adjusted_grade, 67);
    }

    #[tokio::test]
    async fn test_slow_remote_times_out_to_fallback() {
        let mut stub = StubRemote::new(RemoteOutcome::Authoritative(json!({"success": true})));
        stub.delay = Some(Duration::from_secs(5));
        let (orch, _) = orchestrator(stub);
        let orch = orch.with_remote_timeout(Duration::from_millis(50));

        let req = WhatIfRequest {
            trade_id: "t1".into(),
            original_grade: 75,
            scenario_type: "injury_impact".into(),
            parameters: ScenarioParameters {
                severity: Some(InjurySeverity::Major),
                ..Default::default()
            },
        };
        let eval = orch.what_if(&req, None).await.unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        assert_eq!(eval.result.adjusted_grade, 67);
        assert!(eval.fallback_reason.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_what_if_validation_happens_before_remote() {
        let (orch, remote) = orchestrator(unavailable());
        let req = WhatIfRequest {
            trade_id: "t1".into(),
            original_grade: 75,
            scenario_type: "mystery".into(),
            parameters: ScenarioParameters::default(),
        };
        assert!(matches!(
            orch.what_if(&req, None).await,
            Err(EvalError::Validation(_))
        ));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_season_fallback_is_tagged_v1() {
        let (orch, _) = orchestrator(unavailable());
        let req = SimulateSeasonRequest {
            session_id: "s1".into(),
            sport: "nfl".into(),
            team_key: "KC".into(),
            season_year: Some(2026),
            depth: None,
        };
        let eval = orch.simulate_season(&req, None).await.unwrap();
        assert_eq!(eval.provenance, Provenance::LocalFallback);
        let body = serde_json::to_value(&eval).unwrap();
        assert_eq!(body["result"]["simulation_version"], "v1");
        assert_eq!(body["result"]["trades_considered"], 1);
        assert_eq!(body["provenance"], "local_fallback");
    }

    #[tokio::test]
    async fn test_season_authoritative_passes_body_through() {
        let (orch, _) = orchestrator(StubRemote::new(RemoteOutcome::Authoritative(
            json!({"success": true, "projected_wins": 12, "simulation_version": "v3"}),
        )));
        let req = SimulateSeasonRequest {
            session_id: "s1".into(),
            sport: "nfl".into(),
            team_key: "KC".into(),
            season_year: None,
            depth: None,
        };
        let eval = orch.simulate_season(&req, None).await.unwrap();
        assert!(eval.is_authoritative());
        let body = serde_json::to_value(&eval.result).unwrap();
        assert_eq!(body["simulation_version"], "v3");
    }

    #[tokio::test]
    async fn test_evaluate_dispatches_tagged_request() {
        let (orch, _) = orchestrator(unavailable());
        let request: EvaluationRequest = serde_json::from_value(json!({
            "kind": "what_if",
            "trade_id": "t1",
            "original_grade": 80,
            "scenario_type": "add_pick",
            "parameters": {"round": 1, "side": "sent"}
        }))
        .unwrap();
        assert_eq!(request.kind(), "what_if");

        match orch.evaluate(&request, None).await.unwrap() {
            EvaluationResponse::WhatIf(eval) => {
                assert_eq!(eval.result.delta, -12);
                assert_eq!(eval.result.adjusted_grade, 68);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_leaderboard_from_store() {
        let (orch, remote) = orchestrator(unavailable());
        let page = orch.leaderboard(&LeaderboardQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].total_gm_score, 64);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }
}
