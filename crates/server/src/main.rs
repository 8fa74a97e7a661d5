//! Trade-Eval: trade grading and what-if analysis service
//!
//! Usage:
//!   trade-eval serve --port 3002                        Launch the HTTP API
//!   trade-eval simulate --grade 72 --volatility high    Local Monte Carlo outcomes
//!   trade-eval what-if --grade 75 --scenario injury_impact --params '{"severity":"major"}'
//!   trade-eval leaderboard --limit 10                   Print the GM leaderboard

mod error;
mod routes;

use clap::{Parser, Subcommand};
use engine::api::Credentials;
use engine::simulation::simulate_outcomes;
use engine::{
    EvalConfig, EvaluationOrchestrator, GradingServiceClient, LeaderboardParams, LeaderboardQuery,
    ScenarioParameters, SimulateOutcomesRequest, SqliteTradeStore, Volatility, WhatIfRequest,
};
use persistence::repository::TradeRepository;
use routes::{create_router, AppState};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "trade-eval")]
#[command(about = "Trade grading, outcome simulation, and what-if analysis", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the evaluation web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3002)]
        port: u16,
    },
    /// Run the local Monte Carlo outcome simulation for a grade
    Simulate {
        /// Grade the simulation starts from (0-100)
        #[arg(long)]
        grade: i64,
        #[arg(long, default_value = "cli")]
        trade_id: String,
        #[arg(short, long, alias = "samples")]
        num_simulations: Option<usize>,
        /// low, medium, high
        #[arg(long, default_value = "medium")]
        volatility: String,
        /// Disable injury shocks
        #[arg(long)]
        no_injury: bool,
        /// Disable development drift
        #[arg(long)]
        no_development: bool,
    },
    /// Apply a what-if scenario to a grade
    WhatIf {
        #[arg(long)]
        grade: i64,
        /// One of player_improvement, player_decline, injury_impact, add_pick,
        /// remove_player, age_progression
        #[arg(long)]
        scenario: String,
        /// Scenario parameters as JSON
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, default_value = "cli")]
        trade_id: String,
    },
    /// Print one page of the GM leaderboard
    Leaderboard {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long)]
        search: Option<String>,
        /// score, total_trades, average_grade, accepted_trades, last_trade
        #[arg(long)]
        sort_by: Option<String>,
        /// asc or desc
        #[arg(long)]
        sort_order: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,trade_eval=debug")
    } else {
        EnvFilter::new("info,engine=info,persistence=info,trade_eval=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    let config = EvalConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&config, &host, port).await?;
        }
        Commands::Simulate {
            grade,
            trade_id,
            num_simulations,
            volatility,
            no_injury,
            no_development,
        } => {
            let request = SimulateOutcomesRequest {
                trade_id,
                original_grade: grade,
                num_simulations,
                volatility: Some(volatility.parse::<Volatility>()?),
                injury_factor: Some(!no_injury),
                development_factor: Some(!no_development),
            };
            cmd_simulate(&request)?;
        }
        Commands::WhatIf {
            grade,
            scenario,
            params,
            trade_id,
        } => {
            let parameters: ScenarioParameters = serde_json::from_str(&params)
                .map_err(|e| anyhow::anyhow!("--params is not valid scenario JSON: {e}"))?;
            let request = WhatIfRequest {
                trade_id,
                original_grade: grade,
                scenario_type: scenario,
                parameters,
            };
            let orchestrator = build_orchestrator(&config).await?;
            print_json(&orchestrator.what_if(&request, None).await?)?;
        }
        Commands::Leaderboard {
            page,
            limit,
            search,
            sort_by,
            sort_order,
        } => {
            let query = LeaderboardQuery::try_from(LeaderboardParams {
                page: Some(page),
                limit: Some(limit),
                search,
                sort_by,
                sort_order,
            })?;
            let orchestrator = build_orchestrator(&config).await?;
            print_json(&orchestrator.leaderboard(&query).await?)?;
        }
    }

    Ok(())
}

/// Wire the trade store and the remote client into one orchestrator
async fn build_orchestrator(config: &EvalConfig) -> anyhow::Result<EvaluationOrchestrator> {
    let db = persistence::Database::new(&config.db_path).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    let trades = TradeRepository::new(db.pool())
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read trade store: {}", e))?;
    info!(trades, "Database initialized: {}", config.db_path);

    if !config.has_remote() {
        info!("GRADING_SERVICE_URL not set, every evaluation will use local fallback");
    }

    let remote = GradingServiceClient::new(
        config.grading_base_url.clone(),
        Credentials {
            service_role_key: config.service_role_key.clone(),
            anon_key: config.anon_key.clone(),
        },
        config.remote_timeout,
    )?;

    Ok(EvaluationOrchestrator::new(
        Arc::new(SqliteTradeStore::new(db.pool_clone())),
        Arc::new(remote),
    )
    .with_remote_timeout(config.remote_timeout)
    .with_gm_score_mode(config.gm_score_mode))
}

// ============================================================================
// Simulate command — local Monte Carlo, no database or remote
// ============================================================================

fn cmd_simulate(request: &SimulateOutcomesRequest) -> anyhow::Result<()> {
    let params = request.params()?;
    let result = simulate_outcomes(&params);

    println!("\n=== Trade-Eval v{} ===", APP_VERSION);
    println!(
        "Monte Carlo: {} samples from grade {} ({} volatility)",
        result.num_simulations,
        result.original_grade,
        result.volatility.label()
    );
    println!(
        "  mean {:.1}  median {}  std dev {:.1}",
        result.mean, result.median, result.std_dev
    );
    let p = result.percentiles;
    println!(
        "  p5 {}  p10 {}  p25 {}  p50 {}  p75 {}  p90 {}  p95 {}",
        p.p5, p.p10, p.p25, p.p50, p.p75, p.p90, p.p95
    );
    println!(
        "  downside risk {}%  upside potential {}%  band {}-{}",
        result.risk.downside_risk,
        result.risk.upside_potential,
        result.risk.variance_band[0],
        result.risk.variance_band[1]
    );
    println!("\nHistogram:");
    for bucket in &result.histogram {
        println!(
            "  {:>7} {:>5} ({:>3}%) {}",
            bucket.range,
            bucket.count,
            bucket.percentage,
            "#".repeat(bucket.percentage as usize / 2)
        );
    }
    println!("\nKey factors:");
    for factor in &result.key_factors {
        println!(
            "  [{}] {}: {}",
            factor.impact, factor.factor, factor.description
        );
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(config: &EvalConfig, host: &str, port: u16) -> anyhow::Result<()> {
    info!("Trade-Eval v{} starting...", APP_VERSION);

    let state = AppState {
        orchestrator: Arc::new(build_orchestrator(config).await?),
    };
    let app = create_router(state);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Trade-Eval v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health                   - Health check");
    println!("  POST /api/evaluate                 - Tagged evaluation request");
    println!("  POST /api/trades/grade             - Grade a stored trade");
    println!("  POST /api/trades/simulate-outcomes - Outcome distribution");
    println!("  POST /api/trades/simulate-season   - Season projection");
    println!("  POST /api/trades/what-if           - What-if scenario delta");
    println!("  GET  /api/leaderboard              - GM leaderboard (paginated)");
    println!("  POST /api/draft/valuation          - Draft pick valuation");
    println!("\n  Database: {}", config.db_path);
    println!(
        "  Grading service: {}",
        config.grading_base_url.as_deref().unwrap_or("(none, local fallback only)")
    );
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
