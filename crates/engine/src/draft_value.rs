//! Draft Asset Valuation Aggregator
//!
//! Combines the four independently produced pick-value charts into one
//! synthesized score per pick and sums synthesized scores into draft capital.
//! A missing chart is unknown, never zero.

use crate::error::{EvalError, EvalResult};
use crate::types::{DraftPickAsset, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Relative weight of each chart in the synthesized score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartWeights {
    pub legacy: Decimal,
    pub modern: Decimal,
    pub surplus: Decimal,
    pub academic: Decimal,
}

impl Default for ChartWeights {
    fn default() -> Self {
        Self {
            legacy: dec!(0.20),
            modern: dec!(0.30),
            surplus: dec!(0.30),
            academic: dec!(0.20),
        }
    }
}

/// One pick shown side by side across charts
#[derive(Debug, Clone, Serialize)]
pub struct PickValuationRow {
    pub year: i32,
    pub round: u8,
    pub pick: Option<u8>,
    pub legacy_value: Option<Decimal>,
    pub modern_value: Option<Decimal>,
    pub surplus_value: Option<Decimal>,
    pub academic_value: Option<Decimal>,
    pub synthesized_value: Option<Decimal>,
    /// Number of charts that supplied a value
    pub charts_present: usize,
}

/// Valuation of one side's picks
#[derive(Debug, Clone, Serialize)]
pub struct DraftCapital {
    pub picks: Vec<PickValuationRow>,
    /// Sum of the known synthesized values
    pub total_draft_capital: Decimal,
    /// Picks contributing nothing to the total because no chart valued them
    pub unknown_picks: usize,
}

/// Draft capital received by one team in a trade
#[derive(Debug, Clone, Serialize)]
pub struct TeamDraftCapital {
    pub team: String,
    #[serde(flatten)]
    pub capital: DraftCapital,
}

/// Synthesize one score from whichever charts are present.
///
/// Weighted mean renormalized over the present charts, floored at zero.
/// Returns `None` only when no chart has a value.
pub fn synthesize(pick: &DraftPickAsset, weights: &ChartWeights) -> Option<Decimal> {
    let inputs = [
        (pick.legacy_value, weights.legacy),
        (pick.modern_value, weights.modern),
        (pick.surplus_value, weights.surplus),
        (pick.academic_value, weights.academic),
    ];

    let (weighted_sum, weight_total) = inputs
        .iter()
        .filter_map(|(value, weight)| value.map(|v| (v * *weight, *weight)))
        .fold((Decimal::ZERO, Decimal::ZERO), |(s, w), (vw, wt)| (s + vw, w + wt));

    if weight_total.is_zero() {
        return None;
    }

    Some((weighted_sum / weight_total).max(Decimal::ZERO).round_dp(2))
}

/// Value a pick: an upstream synthesized figure wins, otherwise synthesize it
pub fn value_pick(pick: &DraftPickAsset, weights: &ChartWeights) -> PickValuationRow {
    let charts_present = [
        pick.legacy_value,
        pick.modern_value,
        pick.surplus_value,
        pick.academic_value,
    ]
    .iter()
    .filter(|v| v.is_some())
    .count();

    let synthesized_value = pick
        .synthesized_value
        .map(|v| v.max(Decimal::ZERO))
        .or_else(|| synthesize(pick, weights));

    PickValuationRow {
        year: pick.year,
        round: pick.round,
        pick: pick.pick,
        legacy_value: pick.legacy_value,
        modern_value: pick.modern_value,
        surplus_value: pick.surplus_value,
        academic_value: pick.academic_value,
        synthesized_value,
        charts_present,
    }
}

/// Value every pick on one side and total the known synthesized scores
pub fn aggregate<'a>(
    picks: impl IntoIterator<Item = &'a DraftPickAsset>,
    weights: &ChartWeights,
) -> DraftCapital {
    let rows: Vec<PickValuationRow> = picks.into_iter().map(|p| value_pick(p, weights)).collect();

    let total_draft_capital = rows.iter().filter_map(|r| r.synthesized_value).sum();
    let unknown_picks = rows.iter().filter(|r| r.synthesized_value.is_none()).count();

    DraftCapital {
        picks: rows,
        total_draft_capital,
        unknown_picks,
    }
}

/// Reject picks that cannot exist before valuing them
pub fn validate_picks(picks: &[DraftPickAsset]) -> EvalResult<()> {
    match picks.iter().find(|p| p.round == 0) {
        Some(p) => Err(EvalError::Validation(format!(
            "draft pick round must be at least 1 ({} round {})",
            p.year, p.round
        ))),
        None => Ok(()),
    }
}

/// Draft capital received by each team in the trade, in team order
pub fn trade_draft_capital(trade: &Trade, weights: &ChartWeights) -> Vec<TeamDraftCapital> {
    trade
        .teams
        .iter()
        .map(|team| TeamDraftCapital {
            team: team.clone(),
            capital: aggregate(trade.picks_received_by(team), weights),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetKind, TradeAsset, TradeStatus};
    use rust_decimal_macros::dec;

    fn pick(
        legacy: Option<Decimal>,
        modern: Option<Decimal>,
        surplus: Option<Decimal>,
        academic: Option<Decimal>,
    ) -> DraftPickAsset {
        DraftPickAsset {
            year: 2027,
            round: 1,
            pick: Some(12),
            legacy_value: legacy,
            modern_value: modern,
            surplus_value: surplus,
            academic_value: academic,
            synthesized_value: None,
        }
    }

    #[test]
    fn test_synthesize_all_four() {
        let p = pick(Some(dec!(100)), Some(dec!(80)), Some(dec!(60)), Some(dec!(40)));
        // 0.2*100 + 0.3*80 + 0.3*60 + 0.2*40 = 20 + 24 + 18 + 8 = 70
        assert_eq!(synthesize(&p, &ChartWeights::default()), Some(dec!(70)));
    }

    #[test]
    fn test_synthesize_renormalizes_missing_charts() {
        let p = pick(Some(dec!(100)), None, Some(dec!(50)), None);
        // (0.2*100 + 0.3*50) / 0.5 = 35 / 0.5 = 70
        assert_eq!(synthesize(&p, &ChartWeights::default()), Some(dec!(70)));
    }

    #[test]
    fn test_synthesize_never_negative() {
        let p = pick(Some(dec!(-10)), Some(dec!(-5)), Some(dec!(-1)), Some(dec!(-20)));
        assert_eq!(synthesize(&p, &ChartWeights::default()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_missing_charts_are_unknown_not_zero() {
        let known = pick(Some(dec!(40)), Some(dec!(40)), Some(dec!(40)), Some(dec!(40)));
        let unknown = pick(None, None, None, None);

        let capital = aggregate([&known, &unknown], &ChartWeights::default());
        assert_eq!(capital.total_draft_capital, dec!(40));
        assert_eq!(capital.unknown_picks, 1);
        assert_eq!(capital.picks[1].synthesized_value, None);
        assert_eq!(capital.picks[1].charts_present, 0);
    }

    #[test]
    fn test_upstream_synthesized_value_wins() {
        let mut p = pick(Some(dec!(10)), Some(dec!(10)), Some(dec!(10)), Some(dec!(10)));
        p.synthesized_value = Some(dec!(55.5));
        let row = value_pick(&p, &ChartWeights::default());
        assert_eq!(row.synthesized_value, Some(dec!(55.5)));
        assert_eq!(row.charts_present, 4);
    }

    #[test]
    fn test_trade_draft_capital_per_team() {
        let trade = Trade {
            id: "t1".into(),
            user_id: "u1".into(),
            session_id: "s1".into(),
            sport: "nfl".into(),
            teams: vec!["KC".into(), "BUF".into()],
            assets: vec![
                TradeAsset {
                    from_team: "BUF".into(),
                    to_team: "KC".into(),
                    kind: AssetKind::DraftPick(pick(
                        Some(dec!(30)),
                        Some(dec!(30)),
                        Some(dec!(30)),
                        Some(dec!(30)),
                    )),
                },
                TradeAsset {
                    from_team: "KC".into(),
                    to_team: "BUF".into(),
                    kind: AssetKind::Player {
                        name: "RB1".into(),
                        position: Some("RB".into()),
                    },
                },
            ],
            grade: 70,
            status: TradeStatus::Accepted,
            created_at: "2026-01-01T00:00:00Z".into(),
        };

        let capital = trade_draft_capital(&trade, &ChartWeights::default());
        assert_eq!(capital.len(), 2);
        assert_eq!(capital[0].team, "KC");
        assert_eq!(capital[0].capital.total_draft_capital, dec!(30));
        assert!(capital[1].capital.picks.is_empty());
        assert_eq!(capital[1].capital.total_draft_capital, Decimal::ZERO);
    }

    #[test]
    fn test_round_zero_is_rejected() {
        let mut bad = pick(Some(dec!(10)), None, None, None);
        bad.round = 0;
        assert!(validate_picks(&[pick(None, None, None, None), bad]).is_err());
        assert!(validate_picks(&[]).is_ok());
    }
}
