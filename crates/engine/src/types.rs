//! Domain types shared across the evaluation engine

use crate::error::{EvalError, EvalResult};
use persistence::repository::TradeRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_GRADE: i32 = 0;
pub const MAX_GRADE: i32 = 100;

/// Outcome of a graded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Accepted,
    Rejected,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A draft pick moving between teams, with the per-chart valuations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPickAsset {
    pub year: i32,
    pub round: u8,
    /// Pick number within the round, if the order is known
    #[serde(default)]
    pub pick: Option<u8>,
    #[serde(default)]
    pub legacy_value: Option<Decimal>,
    #[serde(default)]
    pub modern_value: Option<Decimal>,
    #[serde(default)]
    pub surplus_value: Option<Decimal>,
    #[serde(default)]
    pub academic_value: Option<Decimal>,
    /// Synthesized score; filled in by [`crate::draft_value::synthesize`] when absent
    #[serde(default)]
    pub synthesized_value: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetKind {
    Player {
        name: String,
        #[serde(default)]
        position: Option<String>,
    },
    DraftPick(DraftPickAsset),
}

/// One asset moving from one team to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAsset {
    pub from_team: String,
    pub to_team: String,
    #[serde(flatten)]
    pub kind: AssetKind,
}

/// A graded trade, as read from the trade store. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub sport: String,
    pub teams: Vec<String>,
    pub assets: Vec<TradeAsset>,
    pub grade: u8,
    pub status: TradeStatus,
    pub created_at: String,
}

impl Trade {
    /// Draft picks received by `team`
    pub fn picks_received_by<'a>(
        &'a self,
        team: &'a str,
    ) -> impl Iterator<Item = &'a DraftPickAsset> {
        self.assets.iter().filter_map(move |a| match &a.kind {
            AssetKind::DraftPick(pick) if a.to_team == team => Some(pick),
            _ => None,
        })
    }
}

impl TryFrom<TradeRecord> for Trade {
    type Error = EvalError;

    fn try_from(record: TradeRecord) -> EvalResult<Self> {
        let teams: Vec<String> = serde_json::from_str(&record.teams_json)?;
        let assets: Vec<TradeAsset> = serde_json::from_str(&record.assets_json)?;
        let status = TradeStatus::parse(&record.status).ok_or_else(|| {
            EvalError::Store(format!("trade {} has unknown status '{}'", record.id, record.status))
        })?;

        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            session_id: record.session_id,
            sport: record.sport,
            teams,
            assets,
            grade: clamp_grade(record.grade as f64),
            status,
            created_at: record.created_at,
        })
    }
}

/// Where an evaluation result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Returned by the remote grading service with `success: true`
    Authoritative,
    /// Computed locally after the remote was unavailable
    LocalFallback,
}

/// A result tagged with its provenance
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation<T> {
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub result: T,
}

impl<T> Evaluation<T> {
    pub fn authoritative(result: T) -> Self {
        Self {
            provenance: Provenance::Authoritative,
            fallback_reason: None,
            result,
        }
    }

    pub fn local(result: T, reason: impl Into<String>) -> Self {
        Self {
            provenance: Provenance::LocalFallback,
            fallback_reason: Some(reason.into()),
            result,
        }
    }

    pub fn is_authoritative(&self) -> bool {
        self.provenance == Provenance::Authoritative
    }
}

/// Round half toward positive infinity (-1.5 → -1, 2.5 → 3)
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to one decimal place, half up
pub fn round_one_decimal(x: f64) -> f64 {
    round_half_up(x * 10.0) / 10.0
}

/// Clamp to [0, 100] and round to an integer grade
pub fn clamp_grade(x: f64) -> u8 {
    round_half_up(x).clamp(MIN_GRADE as f64, MAX_GRADE as f64) as u8
}
