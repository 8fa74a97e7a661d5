//! Monte Carlo fallback evaluator
//!
//! Samples how a graded trade's value could evolve under uncertainty:
//! Gaussian noise scaled by a volatility tier, an occasional injury shock,
//! and a slightly optimistic development drift. Pure and total over its
//! validated inputs; randomness is not seeded in production.

use crate::error::{EvalError, EvalResult};
use crate::types::{clamp_grade, round_half_up, round_one_decimal, MAX_GRADE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

pub const DEFAULT_NUM_SIMULATIONS: usize = 1000;
pub const MAX_NUM_SIMULATIONS: usize = 10_000;

const INJURY_PROBABILITY: f64 = 0.15;
const INJURY_MAX_PENALTY: f64 = 20.0;
/// Development drift is `(u - DEVELOPMENT_CENTER) * DEVELOPMENT_SCALE`, mean +0.8
const DEVELOPMENT_CENTER: f64 = 0.4;
const DEVELOPMENT_SCALE: f64 = 8.0;

const DOWNSIDE_THRESHOLD: u8 = 50;
const UPSIDE_THRESHOLD: u8 = 80;
const HISTOGRAM_BUCKETS: usize = 10;
pub const PERCENTILE_POINTS: [u8; 7] = [5, 10, 25, 50, 75, 90, 95];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Uncertainty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    #[default]
    Medium,
    High,
}

impl Volatility {
    /// Standard deviation of the per-sample Gaussian noise, in grade points
    pub fn sigma(&self) -> f64 {
        match self {
            Self::Low => 5.0,
            Self::Medium => 10.0,
            Self::High => 18.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Volatility {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(EvalError::Validation(format!("unknown volatility '{other}'"))),
        }
    }
}

/// Caller-facing `simulate_outcomes` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateOutcomesRequest {
    pub trade_id: String,
    pub original_grade: i64,
    #[serde(default)]
    pub num_simulations: Option<usize>,
    #[serde(default)]
    pub volatility: Option<Volatility>,
    #[serde(default)]
    pub injury_factor: Option<bool>,
    #[serde(default)]
    pub development_factor: Option<bool>,
}

impl SimulateOutcomesRequest {
    /// Validate and apply the named defaults
    pub fn params(&self) -> EvalResult<SimulationParams> {
        if self.trade_id.trim().is_empty() {
            return Err(EvalError::Validation("trade_id is required".into()));
        }
        let base_grade = validate_grade(self.original_grade)?;
        let num_simulations = self.num_simulations.unwrap_or(DEFAULT_NUM_SIMULATIONS);
        if num_simulations == 0 || num_simulations > MAX_NUM_SIMULATIONS {
            return Err(EvalError::Validation(format!(
                "num_simulations must be between 1 and {MAX_NUM_SIMULATIONS}, got {num_simulations}"
            )));
        }

        Ok(SimulationParams {
            base_grade,
            num_simulations,
            volatility: self.volatility.unwrap_or_default(),
            injury_factor: self.injury_factor.unwrap_or(true),
            development_factor: self.development_factor.unwrap_or(true),
        })
    }
}

/// Validated simulation inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulationParams {
    pub base_grade: u8,
    pub num_simulations: usize,
    pub volatility: Volatility,
    pub injury_factor: bool,
    pub development_factor: bool,
}

impl SimulationParams {
    pub fn new(base_grade: u8) -> Self {
        Self {
            base_grade,
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            volatility: Volatility::default(),
            injury_factor: true,
            development_factor: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: u8,
    pub p10: u8,
    pub p25: u8,
    pub p50: u8,
    pub p75: u8,
    pub p90: u8,
    pub p95: u8,
}

impl Percentiles {
    pub fn as_array(&self) -> [u8; 7] {
        [self.p5, self.p10, self.p25, self.p50, self.p75, self.p90, self.p95]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// "0-9", "10-19", ... "90-100"
    pub range: String,
    pub min: u8,
    pub max: u8,
    pub count: usize,
    /// Share of all samples, rounded integer percent
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Percent of samples graded below 50
    pub downside_risk: u32,
    /// Percent of samples graded 80 or above
    pub upside_potential: u32,
    /// [p5, p95]
    pub variance_band: [u8; 2],
}

/// Fixed explanatory copy; magnitudes describe the inputs, not the samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub factor: String,
    pub impact: String,
    pub magnitude: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub original_grade: u8,
    pub num_simulations: usize,
    pub volatility: Volatility,
    /// Every sampled grade, ascending
    #[serde(default)]
    pub outcomes: Vec<u8>,
    pub mean: f64,
    pub median: u8,
    pub std_dev: f64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBucket>,
    pub risk: RiskMetrics,
    #[serde(default)]
    pub key_factors: Vec<KeyFactor>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Run the simulation with the thread-local RNG
pub fn simulate_outcomes(params: &SimulationParams) -> SimulationResult {
    simulate_outcomes_with_rng(params, &mut rand::thread_rng())
}

/// Run the simulation with a caller-supplied RNG (seeded in tests)
pub fn simulate_outcomes_with_rng<R: Rng>(
    params: &SimulationParams,
    rng: &mut R,
) -> SimulationResult {
    let n = params.num_simulations.max(1);
    let sigma = params.volatility.sigma();
    let mut outcomes: Vec<u8> = Vec::with_capacity(n);
    let mut counts = [0usize; HISTOGRAM_BUCKETS];

    for _ in 0..n {
        let mut grade = params.base_grade as f64 + standard_normal(rng) * sigma;

        if params.injury_factor && rng.gen::<f64>() < INJURY_PROBABILITY {
            grade -= rng.gen::<f64>() * INJURY_MAX_PENALTY;
        }

        if params.development_factor {
            grade += (rng.gen::<f64>() - DEVELOPMENT_CENTER) * DEVELOPMENT_SCALE;
        }

        let grade = clamp_grade(grade);
        counts[bucket_index(grade)] += 1;
        outcomes.push(grade);
    }

    outcomes.sort_unstable();

    let mean = outcomes.iter().map(|&g| g as f64).sum::<f64>() / n as f64;
    let variance = outcomes
        .iter()
        .map(|&g| (g as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;

    let percentiles = Percentiles {
        p5: percentile(&outcomes, 5),
        p10: percentile(&outcomes, 10),
        p25: percentile(&outcomes, 25),
        p50: percentile(&outcomes, 50),
        p75: percentile(&outcomes, 75),
        p90: percentile(&outcomes, 90),
        p95: percentile(&outcomes, 95),
    };

    let downside = outcomes.iter().filter(|&&g| g < DOWNSIDE_THRESHOLD).count();
    let upside = outcomes.iter().filter(|&&g| g >= UPSIDE_THRESHOLD).count();

    SimulationResult {
        original_grade: params.base_grade,
        num_simulations: n,
        volatility: params.volatility,
        median: outcomes[n / 2],
        mean: round_one_decimal(mean),
        std_dev: round_one_decimal(variance.sqrt()),
        percentiles,
        histogram: build_histogram(&counts, n),
        risk: RiskMetrics {
            downside_risk: percent_of(downside, n),
            upside_potential: percent_of(upside, n),
            variance_band: [percentiles.p5, percentiles.p95],
        },
        key_factors: key_factors(params),
        outcomes,
    }
}

/// Box–Muller transform: one standard-normal variate from two uniforms
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // 1 - [0,1) is (0,1], keeps ln() finite
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Truncating index `floor(p/100 × N)` into sorted samples, no interpolation.
/// Biased slightly low for small N; clamped so p=100 stays in bounds.
pub fn percentile(sorted: &[u8], p: u8) -> u8 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = (p as usize * sorted.len()) / 100;
    sorted[idx.min(sorted.len() - 1)]
}

/// Grade 100 shares the top bucket with 90-99
fn bucket_index(grade: u8) -> usize {
    (grade as usize / 10).min(HISTOGRAM_BUCKETS - 1)
}

fn percent_of(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(count as f64 / total as f64 * 100.0) as u32
}

fn build_histogram(counts: &[usize; HISTOGRAM_BUCKETS], total: usize) -> Vec<HistogramBucket> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let min = (i * 10) as u8;
            let max = if i == HISTOGRAM_BUCKETS - 1 {
                MAX_GRADE as u8
            } else {
                min + 9
            };
            HistogramBucket {
                range: format!("{min}-{max}"),
                min,
                max,
                count,
                percentage: percent_of(count, total),
            }
        })
        .collect()
}

fn key_factors(params: &SimulationParams) -> Vec<KeyFactor> {
    vec![
        KeyFactor {
            factor: "Performance volatility".into(),
            impact: "variable".into(),
            magnitude: params.volatility.label().into(),
            description: "Output swings season to season; wider tiers spread outcomes".into(),
        },
        KeyFactor {
            factor: "Injury risk".into(),
            impact: "negative".into(),
            magnitude: if params.injury_factor { "moderate" } else { "none" }.into(),
            description: "Roughly one outcome in seven includes a significant injury to a key asset"
                .into(),
        },
        KeyFactor {
            factor: "Player development".into(),
            impact: "positive".into(),
            magnitude: if params.development_factor { "slight" } else { "none" }.into(),
            description: "Young players tend to improve, nudging projected value upward".into(),
        },
    ]
}

pub(crate) fn validate_grade(grade: i64) -> EvalResult<u8> {
    if !(0..=MAX_GRADE as i64).contains(&grade) {
        return Err(EvalError::Validation(format!(
            "original_grade must be between 0 and 100, got {grade}"
        )));
    }
    Ok(grade as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
