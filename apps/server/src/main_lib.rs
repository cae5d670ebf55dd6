use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use fundwatch_core::{
    ingestion::{FundDataClient, IngestionService},
    jobs::JobRunner,
    labels::{parse_labels_csv, FundLabelRepositoryTrait},
    performance::PerformanceService,
    risk::RiskScoringService,
};
use fundwatch_market_data::{FundDataProvider, TefasProvider};
use fundwatch_storage_sqlite::{
    db, FundLabelRepository, ObservationRepository, PerformanceRepository, PortfolioRepository,
    RiskScoreRepository,
};

use crate::config::Config;

pub struct AppState {
    pub runner: Arc<JobRunner>,
    pub risk_service: Arc<RiskScoringService>,
    pub performance_service: Arc<PerformanceService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Builds the state against the live TEFAS endpoints.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let provider = Arc::new(TefasProvider::with_options(
        config.tefas_base_url.clone(),
        config.fund_kind.clone(),
    ));
    build_state_with_provider(config, provider).await
}

pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn FundDataProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let observation_repo = Arc::new(ObservationRepository::new(pool.clone(), writer.clone()));
    let portfolio_repo = Arc::new(PortfolioRepository::new(pool.clone()));
    let label_repo = Arc::new(FundLabelRepository::new(pool.clone(), writer.clone()));
    let risk_repo = Arc::new(RiskScoreRepository::new(pool.clone(), writer.clone()));
    let performance_repo = Arc::new(PerformanceRepository::new(pool.clone(), writer.clone()));

    seed_labels(config, label_repo.as_ref()).await?;

    tracing::info!("Fund data provider: {}", provider.id());
    let client = FundDataClient::new(provider, config.ingestion.clone());
    let ingestion_service = Arc::new(IngestionService::new(observation_repo.clone(), client));
    let risk_service = Arc::new(RiskScoringService::new(
        portfolio_repo,
        observation_repo.clone(),
        risk_repo,
    ));
    let performance_service = Arc::new(PerformanceService::new(
        observation_repo,
        label_repo,
        performance_repo,
    ));

    let runner = Arc::new(JobRunner::new(
        ingestion_service,
        risk_service.clone(),
        performance_service.clone(),
        config.timezone,
    ));

    Ok(Arc::new(AppState {
        runner,
        risk_service,
        performance_service,
    }))
}

/// Loads `FW_LABELS_CSV` into an empty label table. An already populated
/// table is left alone so manual edits survive restarts.
async fn seed_labels(config: &Config, labels: &dyn FundLabelRepositoryTrait) -> anyhow::Result<()> {
    let Some(path) = &config.labels_csv else {
        return Ok(());
    };
    if labels.count_labels()? > 0 {
        tracing::debug!("Fund labels already present, skipping {}", path.display());
        return Ok(());
    }

    let file = File::open(path)?;
    let parsed = parse_labels_csv(file)?;
    let inserted = labels.replace_labels(parsed).await?;
    tracing::info!("Seeded {} fund labels from {}", inserted, path.display());
    Ok(())
}
