//! GM Leaderboard — fold historical trade grades into per-user scores
//!
//! Rebuilt from the full trade history on every request; nothing is persisted.
//! Supports free-text search, multi-key sorting and offset pagination.

use crate::error::{EvalError, EvalResult};
use crate::types::{round_half_up, round_one_decimal, TradeStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One historical trade, reduced to what the leaderboard needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_display_name: Option<String>,
    pub grade: u8,
    /// `None` for statuses other than accepted/rejected; counted in the total only
    pub status: Option<TradeStatus>,
    /// ISO-8601; compared lexicographically
    pub created_at: String,
}

/// How `total_gm_score` is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GmScoreMode {
    /// Sum of the grades of accepted trades
    #[default]
    AcceptedSum,
    /// Legacy shortcut: round(average grade of all trades) × accepted count.
    /// Equals the accepted sum only by coincidence.
    AverageTimesAccepted,
}

impl FromStr for GmScoreMode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accepted_sum" => Ok(Self::AcceptedSum),
            "average_times_accepted" => Ok(Self::AverageTimesAccepted),
            other => Err(EvalError::Validation(format!("unknown gm score mode '{other}'"))),
        }
    }
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGmScore {
    pub user_id: String,
    pub user_email: Option<String>,
    pub display_name: Option<String>,
    pub total_trades: u32,
    pub accepted_trades: u32,
    pub rejected_trades: u32,
    /// Mean of all grades, one decimal
    pub average_grade: f64,
    pub total_gm_score: i64,
    pub highest_grade: u8,
    pub lowest_grade: u8,
    pub last_trade_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardSort {
    #[default]
    Score,
    TotalTrades,
    AverageGrade,
    AcceptedTrades,
    LastTrade,
}

impl FromStr for LeaderboardSort {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" | "total_gm_score" => Ok(Self::Score),
            "trades" | "total_trades" => Ok(Self::TotalTrades),
            "average_grade" | "avg_grade" => Ok(Self::AverageGrade),
            "accepted" | "accepted_trades" => Ok(Self::AcceptedTrades),
            "last_trade" | "last_trade_at" => Ok(Self::LastTrade),
            other => Err(EvalError::Validation(format!("unknown sort_by '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(EvalError::Validation(format!("unknown sort_order '{other}'"))),
        }
    }
}

/// Raw query-string parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Validated leaderboard query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
    /// 1-based
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub sort_by: LeaderboardSort,
    pub sort_order: SortOrder,
}

impl Default for LeaderboardQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            sort_by: LeaderboardSort::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl TryFrom<LeaderboardParams> for LeaderboardQuery {
    type Error = EvalError;

    fn try_from(params: LeaderboardParams) -> EvalResult<Self> {
        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(EvalError::Validation("page must be at least 1".into()));
        }
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(EvalError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
            )));
        }

        Ok(Self {
            page,
            limit,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            sort_by: params
                .sort_by
                .as_deref()
                .map(str::parse::<LeaderboardSort>)
                .transpose()?
                .unwrap_or_default(),
            sort_order: params
                .sort_order
                .as_deref()
                .map(str::parse::<SortOrder>)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardPage {
    pub entries: Vec<UserGmScore>,
    /// Rows matching the search, before pagination
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UserAccumulator {
    user_email: Option<String>,
    display_name: Option<String>,
    accepted: u32,
    rejected: u32,
    grades: Vec<u8>,
    accepted_sum: i64,
    last_trade_at: String,
}

/// Group outcomes by user and derive each user's GM score
pub fn aggregate_user_scores(outcomes: &[TradeOutcome], mode: GmScoreMode) -> Vec<UserGmScore> {
    let mut by_user: HashMap<&str, UserAccumulator> = HashMap::new();

    for outcome in outcomes {
        let acc = by_user.entry(outcome.user_id.as_str()).or_default();

        match outcome.status {
            Some(TradeStatus::Accepted) => {
                acc.accepted += 1;
                acc.accepted_sum += outcome.grade as i64;
            }
            Some(TradeStatus::Rejected) => acc.rejected += 1,
            None => {}
        }
        acc.grades.push(outcome.grade);

        if outcome.created_at > acc.last_trade_at {
            acc.last_trade_at = outcome.created_at.clone();
        }
        if acc.user_email.is_none() {
            acc.user_email = outcome.user_email.clone();
        }
        if acc.display_name.is_none() {
            acc.display_name = outcome.user_display_name.clone();
        }
    }

    let mut scores: Vec<UserGmScore> = by_user
        .into_iter()
        .map(|(user_id, acc)| {
            let total = acc.grades.len();
            let sum: u32 = acc.grades.iter().map(|&g| g as u32).sum();
            let average_grade = round_one_decimal(sum as f64 / total as f64);

            let total_gm_score = match mode {
                GmScoreMode::AcceptedSum => acc.accepted_sum,
                GmScoreMode::AverageTimesAccepted => {
                    round_half_up(average_grade) as i64 * acc.accepted as i64
                }
            };

            UserGmScore {
                user_id: user_id.to_string(),
                user_email: acc.user_email,
                display_name: acc.display_name,
                total_trades: total as u32,
                accepted_trades: acc.accepted,
                rejected_trades: acc.rejected,
                average_grade,
                total_gm_score,
                highest_grade: acc.grades.iter().copied().max().unwrap_or(0),
                lowest_grade: acc.grades.iter().copied().min().unwrap_or(0),
                last_trade_at: acc.last_trade_at,
            }
        })
        .collect();

    scores.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    scores
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

fn matches_search(score: &UserGmScore, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let hit = |s: &str| s.to_lowercase().contains(&needle);
    hit(&score.user_id)
        || score.user_email.as_deref().is_some_and(hit)
        || score.display_name.as_deref().is_some_and(hit)
}

fn compare(a: &UserGmScore, b: &UserGmScore, key: LeaderboardSort) -> Ordering {
    match key {
        LeaderboardSort::Score => a.total_gm_score.cmp(&b.total_gm_score),
        LeaderboardSort::TotalTrades => a.total_trades.cmp(&b.total_trades),
        LeaderboardSort::AverageGrade => a
            .average_grade
            .partial_cmp(&b.average_grade)
            .unwrap_or(Ordering::Equal),
        LeaderboardSort::AcceptedTrades => a.accepted_trades.cmp(&b.accepted_trades),
        LeaderboardSort::LastTrade => a.last_trade_at.cmp(&b.last_trade_at),
    }
}

/// Filter, sort and paginate aggregated scores.
/// Ties fall back to user id ascending so pages are stable.
pub fn query_leaderboard(
    mut scores: Vec<UserGmScore>,
    query: &LeaderboardQuery,
) -> LeaderboardPage {
    if let Some(needle) = &query.search {
        scores.retain(|s| matches_search(s, needle));
    }

    scores.sort_by(|a, b| {
        let primary = match query.sort_order {
            SortOrder::Asc => compare(a, b, query.sort_by),
            SortOrder::Desc => compare(b, a, query.sort_by),
        };
        primary.then_with(|| a.user_id.cmp(&b.user_id))
    });

    let total = scores.len();
    let total_pages = total.div_ceil(query.limit);
    let offset = (query.page - 1).saturating_mul(query.limit);
    let entries: Vec<UserGmScore> = scores.into_iter().skip(offset).take(query.limit).collect();

    LeaderboardPage {
        entries,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
