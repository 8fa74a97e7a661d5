//! Scenario delta engine — deterministic "what-if" adjustments to a grade
//!
//! Each scenario maps its parameters to a signed integer delta, spreads that
//! delta across four component categories with fixed weights, and clamps the
//! adjusted grade to [0, 100]. No randomness.

use crate::error::{EvalError, EvalResult};
use crate::simulation::validate_grade;
use crate::types::{clamp_grade, round_half_up, round_one_decimal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFAULT_IMPROVEMENT_PCT: f64 = 10.0;
const PCT_PER_GRADE_POINT: f64 = 3.0;
/// Grade points per draft round, indexed by round (index 0 unused)
const PICK_ROUND_VALUE: [i32; 8] = [0, 12, 8, 5, 3, 2, 1, 1];
const REMOVE_PLAYER_DELTA: i32 = 5;
const AGE_DELTA_PER_YEAR: i32 = -2;
const MAX_YEARS_FORWARD: u8 = 3;

const WEIGHT_TALENT: f64 = 0.30;
const WEIGHT_CONTRACT: f64 = 0.20;
const WEIGHT_FIT: f64 = 0.25;
const WEIGHT_FUTURE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    PlayerImprovement,
    PlayerDecline,
    InjuryImpact,
    AddPick,
    RemovePlayer,
    AgeProgression,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerImprovement => "player_improvement",
            Self::PlayerDecline => "player_decline",
            Self::InjuryImpact => "injury_impact",
            Self::AddPick => "add_pick",
            Self::RemovePlayer => "remove_player",
            Self::AgeProgression => "age_progression",
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player_improvement" => Ok(Self::PlayerImprovement),
            "player_decline" => Ok(Self::PlayerDecline),
            "injury_impact" => Ok(Self::InjuryImpact),
            "add_pick" => Ok(Self::AddPick),
            "remove_player" => Ok(Self::RemovePlayer),
            "age_progression" => Ok(Self::AgeProgression),
            other => Err(EvalError::Validation(format!("unknown scenario_type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjurySeverity {
    #[default]
    Minor,
    Major,
    SeasonEnding,
}

impl InjurySeverity {
    fn delta(&self) -> i32 {
        match self {
            Self::Minor => -3,
            Self::Major => -8,
            Self::SeasonEnding => -15,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::SeasonEnding => "season-ending",
        }
    }
}

/// Which way an asset moves, from the evaluated side's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSide {
    Received,
    Sent,
}

/// Type-specific knobs; each scenario reads only the ones it needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioParameters {
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub improvement_pct: Option<f64>,
    #[serde(default)]
    pub severity: Option<InjurySeverity>,
    #[serde(default)]
    pub round: Option<u8>,
    #[serde(default)]
    pub pick_year: Option<i32>,
    #[serde(default)]
    pub side: Option<AssetSide>,
    #[serde(default)]
    pub years_forward: Option<u8>,
}

/// Caller-facing `what_if` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfRequest {
    pub trade_id: String,
    pub original_grade: i64,
    pub scenario_type: String,
    #[serde(default)]
    pub parameters: ScenarioParameters,
}

impl WhatIfRequest {
    pub fn validate(&self) -> EvalResult<(ScenarioType, u8)> {
        if self.trade_id.trim().is_empty() {
            return Err(EvalError::Validation("trade_id is required".into()));
        }
        let scenario: ScenarioType = self.scenario_type.parse()?;
        let grade = validate_grade(self.original_grade)?;
        Ok((scenario, grade))
    }
}

/// How a delta splits across the four grading components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBreakdown {
    pub talent_balance: f64,
    pub contract_value: f64,
    pub team_fit: f64,
    pub future_assets: f64,
}

impl ScenarioBreakdown {
    pub fn from_delta(delta: i32) -> Self {
        let d = delta as f64;
        Self {
            talent_balance: round_one_decimal(d * WEIGHT_TALENT),
            contract_value: round_one_decimal(d * WEIGHT_CONTRACT),
            team_fit: round_one_decimal(d * WEIGHT_FIT),
            future_assets: round_one_decimal(d * WEIGHT_FUTURE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_type: ScenarioType,
    pub description: String,
    pub reasoning: String,
    pub original_grade: u8,
    pub adjusted_grade: u8,
    pub delta: i32,
    #[serde(default)]
    pub breakdown: Option<ScenarioBreakdown>,
}

/// Compute the scenario's delta against `original_grade`
pub fn evaluate_scenario(
    scenario: ScenarioType,
    params: &ScenarioParameters,
    original_grade: u8,
) -> EvalResult<ScenarioResult> {
    let player = params.player_name.as_deref().unwrap_or("the key player");

    let (delta, description, reasoning) = match scenario {
        ScenarioType::PlayerImprovement | ScenarioType::PlayerDecline => {
            let default_pct = if scenario == ScenarioType::PlayerImprovement {
                DEFAULT_IMPROVEMENT_PCT
            } else {
                -DEFAULT_IMPROVEMENT_PCT
            };
            let pct = params.improvement_pct.unwrap_or(default_pct);
            let delta = pct_to_delta(pct);
            let (verb, effect) = if pct < 0.0 {
                ("declines", "lowers")
            } else {
                ("improves", "raises")
            };
            (
                delta,
                format!("What if {player} {verb} by {}%?", pct.abs()),
                format!(
                    "A {pct:+}% change in production {effect} the value received \
                     by {} grade points",
                    delta.abs()
                ),
            )
        }
        ScenarioType::InjuryImpact => {
            let severity = params.severity.unwrap_or_default();
            let delta = severity.delta();
            (
                delta,
                format!("What if {player} suffers a {} injury?", severity.label()),
                format!(
                    "A {} injury costs availability and carries re-injury risk ({delta} points)",
                    severity.label()
                ),
            )
        }
        ScenarioType::AddPick => {
            let round = required(params.round, "parameters.round")?;
            if round == 0 {
                return Err(EvalError::Validation("parameters.round must be at least 1".into()));
            }
            let side = required(params.side, "parameters.side")?;
            let magnitude = PICK_ROUND_VALUE[(round as usize).min(PICK_ROUND_VALUE.len() - 1)];
            let year = params
                .pick_year
                .map(|y| format!("{y} "))
                .unwrap_or_default();
            match side {
                AssetSide::Received => (
                    magnitude,
                    format!("What if you also receive a {year}round {round} pick?"),
                    format!("Extra round {round} draft capital adds {magnitude} grade points"),
                ),
                AssetSide::Sent => (
                    -magnitude,
                    format!("What if you also send a {year}round {round} pick?"),
                    format!("Giving up round {round} draft capital costs {magnitude} grade points"),
                ),
            }
        }
        ScenarioType::RemovePlayer => {
            let side = required(params.side, "parameters.side")?;
            match side {
                AssetSide::Sent => (
                    REMOVE_PLAYER_DELTA,
                    format!("What if you keep {player} instead of sending them?"),
                    "Keeping a player you were giving away improves your side".to_string(),
                ),
                AssetSide::Received => (
                    -REMOVE_PLAYER_DELTA,
                    format!("What if {player} is removed from the package you receive?"),
                    "Receiving less talent for the same cost lowers the grade".to_string(),
                ),
            }
        }
        ScenarioType::AgeProgression => {
            let years = params.years_forward.unwrap_or(1);
            if !(1..=MAX_YEARS_FORWARD).contains(&years) {
                return Err(EvalError::Validation(format!(
                    "parameters.years_forward must be in 1..={MAX_YEARS_FORWARD}, got {years}"
                )));
            }
            let delta = AGE_DELTA_PER_YEAR * years as i32;
            let plural = if years == 1 { "" } else { "s" };
            (
                delta,
                format!("How does this trade look {years} year{plural} from now?"),
                format!(
                    "Projecting {years} year{plural} forward ages the rosters and costs {} points",
                    delta.abs()
                ),
            )
        }
    };

    let adjusted_grade = clamp_grade(original_grade as f64 + delta as f64);

    Ok(ScenarioResult {
        scenario_type: scenario,
        description,
        reasoning,
        original_grade,
        adjusted_grade,
        delta,
        breakdown: Some(ScenarioBreakdown::from_delta(delta)),
    })
}

fn pct_to_delta(pct: f64) -> i32 {
    round_half_up(pct / PCT_PER_GRADE_POINT) as i32
}

fn required<T>(value: Option<T>, name: &str) -> EvalResult<T> {
    value.ok_or_else(|| EvalError::Validation(format!("{name} is required for this scenario")))
}
