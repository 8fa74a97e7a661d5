//! Local season projection (v1)
//!
//! Used only when the remote season simulator is unavailable. Each accepted
//! trade in the session nudges a .500 baseline by how far its grade sits from
//! 50; this is an approximation, not a play-by-play simulation.

use crate::error::{EvalError, EvalResult};
use crate::types::{round_half_up, Trade, TradeStatus};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const LOCAL_SIMULATION_VERSION: &str = "v1";

const BASELINE_WIN_PCT: f64 = 0.5;
const GRADE_NEUTRAL: f64 = 50.0;
const SHIFT_PER_GRADE_POINT: f64 = 1.0 / 500.0;
const MAX_WIN_SHIFT: f64 = 0.25;
const PLAYOFF_ODDS_FLOOR: f64 = 0.02;
const PLAYOFF_ODDS_CEIL: f64 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Nba,
    Mlb,
    Nhl,
}

impl Sport {
    /// Regular-season games per team
    pub fn games(&self) -> u32 {
        match self {
            Self::Nfl => 17,
            Self::Nba => 82,
            Self::Mlb => 162,
            Self::Nhl => 82,
        }
    }
}

impl FromStr for Sport {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nfl" => Ok(Self::Nfl),
            "nba" => Ok(Self::Nba),
            "mlb" => Ok(Self::Mlb),
            "nhl" => Ok(Self::Nhl),
            other => Err(EvalError::Validation(format!("unsupported sport '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonDepth {
    Quick,
    #[default]
    Standard,
    Full,
}

/// Caller-facing `simulate_season` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateSeasonRequest {
    pub session_id: String,
    pub sport: String,
    pub team_key: String,
    #[serde(default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub depth: Option<SeasonDepth>,
}

impl SimulateSeasonRequest {
    pub fn validate(&self) -> EvalResult<Sport> {
        if self.session_id.trim().is_empty() {
            return Err(EvalError::Validation("session_id is required".into()));
        }
        if self.team_key.trim().is_empty() {
            return Err(EvalError::Validation("team_key is required".into()));
        }
        self.sport.parse()
    }

    pub fn season_year_or_current(&self) -> i32 {
        self.season_year.unwrap_or_else(|| chrono::Utc::now().year())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonProjection {
    pub session_id: String,
    pub sport: Sport,
    pub team_key: String,
    pub season_year: i32,
    pub depth: SeasonDepth,
    pub games: u32,
    /// Accepted session trades involving the team
    pub trades_considered: usize,
    pub baseline_wins: u32,
    pub projected_wins: u32,
    pub projected_losses: u32,
    /// Change in win percentage attributed to the trades
    pub win_pct_shift: f64,
    /// Integer percent
    pub playoff_odds: u32,
    pub simulation_version: &'static str,
}

/// Project a season from the session's accepted trades
pub fn project_season(
    request: &SimulateSeasonRequest,
    sport: Sport,
    session_trades: &[Trade],
) -> SeasonProjection {
    let involved: Vec<&Trade> = session_trades
        .iter()
        .filter(|t| t.status == TradeStatus::Accepted)
        .filter(|t| t.teams.iter().any(|team| team.eq_ignore_ascii_case(&request.team_key)))
        .collect();

    let shift = involved
        .iter()
        .map(|t| (t.grade as f64 - GRADE_NEUTRAL) * SHIFT_PER_GRADE_POINT)
        .sum::<f64>()
        .clamp(-MAX_WIN_SHIFT, MAX_WIN_SHIFT);

    let games = sport.games();
    let projected_wins = round_half_up(games as f64 * (BASELINE_WIN_PCT + shift)) as u32;
    let playoff_odds =
        (BASELINE_WIN_PCT + 2.0 * shift).clamp(PLAYOFF_ODDS_FLOOR, PLAYOFF_ODDS_CEIL);

    SeasonProjection {
        session_id: request.session_id.clone(),
        sport,
        team_key: request.team_key.clone(),
        season_year: request.season_year_or_current(),
        depth: request.depth.unwrap_or_default(),
        games,
        trades_considered: involved.len(),
        baseline_wins: round_half_up(games as f64 * BASELINE_WIN_PCT) as u32,
        projected_wins,
        projected_losses: games - projected_wins.min(games),
        win_pct_shift: (shift * 1000.0).round() / 1000.0,
        playoff_odds: round_half_up(playoff_odds * 100.0) as u32,
        simulation_version: LOCAL_SIMULATION_VERSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(id: &str, grade: u8, status: TradeStatus, teams: &[&str]) -> Trade {
        Trade {
            id: id.into(),
            user_id: "u1".into(),
            session_id: "s1".into(),
            sport: "nba".into(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
            assets: vec![],
            grade,
            status,
            created_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn request(sport: &str) -> SimulateSeasonRequest {
        SimulateSeasonRequest {
            session_id: "s1".into(),
            sport: sport.into(),
            team_key: "BOS".into(),
            season_year: Some(2026),
            depth: None,
        }
    }

    #[test]
    fn test_no_trades_is_baseline() {
        let req = request("nba");
        let projection = project_season(&req, Sport::Nba, &[]);
        assert_eq!(projection.projected_wins, 41);
        assert_eq!(projection.projected_losses, 41);
        assert_eq!(projection.playoff_odds, 50);
        assert_eq!(projection.simulation_version, "v1");
    }

    #[test]
    fn test_only_accepted_trades_for_team_count() {
        let trades = vec![
            trade("t1", 100, TradeStatus::Accepted, &["BOS", "LAL"]),
            trade("t2", 100, TradeStatus::Rejected, &["BOS", "LAL"]),
            trade("t3", 0, TradeStatus::Accepted, &["NYK", "MIA"]),
        ];
        let projection = project_season(&request("nba"), Sport::Nba, &trades);
        assert_eq!(projection.trades_considered, 1);
        // +0.1 shift: 82 × 0.6 = 49.2 → 49
        assert_eq!(projection.projected_wins, 49);
        assert_eq!(projection.playoff_odds, 70);
    }

    #[test]
    fn test_shift_is_capped() {
        let trades: Vec<Trade> = (0..10)
            .map(|i| trade(&format!("t{i}"), 100, TradeStatus::Accepted, &["BOS", "LAL"]))
            .collect();
        let projection = project_season(&request("nfl"), Sport::Nfl, &trades);
        assert_eq!(projection.win_pct_shift, 0.25);
        assert_eq!(projection.playoff_odds, 98);
        assert!(projection.projected_wins <= projection.games);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(request("cricket").validate(), Err(EvalError::Validation(_))));
        assert_eq!(request("NHL").validate().unwrap(), Sport::Nhl);
        let mut missing_team = request("nfl");
        missing_team.team_key = " ".into();
        assert!(missing_team.validate().is_err());
    }
}
