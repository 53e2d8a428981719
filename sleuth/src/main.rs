use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sleuth::analysis::AnalysisEngine;
use sleuth::api::{create_router, AppState};
use sleuth::cache::FingerprintCache;
use sleuth::config::Config;
use sleuth::history::{Database, HistoryStore, LibSqlHistoryStore};
use sleuth::llm::LlmProvider;
use sleuth::pipeline::ResearchPipeline;
use sleuth::report::{PdfReportRenderer, ReportService};
use sleuth::retry::{RetryExecutor, RetryPolicy};
use sleuth::search::{EvidenceSearch, TavilyProvider};

#[derive(Parser)]
#[command(name = "sleuth")]
#[command(about = "Self-hostable research agent with web evidence search and LLM synthesis")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Override SLEUTH_HOST
        #[arg(long)]
        host: Option<String>,
        /// Override SLEUTH_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a single research request and print the record as JSON
    Research {
        topic: String,
        /// Analysis depth 1-5
        #[arg(long)]
        depth: Option<u32>,
        /// Evidence results to gather (1-20)
        #[arg(long)]
        max_results: Option<u32>,
        /// Also render a PDF report for the completed research
        #[arg(long)]
        report: bool,
    },
}

struct Services {
    pipeline: Arc<ResearchPipeline>,
    reports: Arc<ReportService>,
    llm: LlmProvider,
    cache: Arc<FingerprintCache>,
    db: Database,
}

async fn build_services(config: &Config) -> anyhow::Result<Services> {
    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;
    let history: Arc<dyn HistoryStore> = Arc::new(LibSqlHistoryStore::new(db.clone()));

    if config.search.api_key.is_none() {
        tracing::warn!("TAVILY_API_KEY is not set - search requests will likely be rejected");
    }
    let provider = Arc::new(TavilyProvider::new(&config.search)?);
    let cache = Arc::new(FingerprintCache::new(config.cache.ttl()));
    let executor = RetryExecutor::new(RetryPolicy::from(&config.retry));

    let search = Arc::new(EvidenceSearch::new(
        provider,
        cache.clone(),
        executor.clone(),
        config.search.timeout(),
    ));

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - research runs will fail at the analysis stage");
    }

    let analysis = Arc::new(AnalysisEngine::new(
        Arc::new(llm.clone()),
        executor,
        config.analysis.clone(),
    ));

    let pipeline = Arc::new(ResearchPipeline::new(search, analysis, history.clone()));
    let renderer = Arc::new(PdfReportRenderer::new(&config.reports));
    let reports = Arc::new(ReportService::new(
        history,
        renderer,
        config.reports.path.clone(),
    ));

    Ok(Services {
        pipeline,
        reports,
        llm,
        cache,
        db,
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sleuth=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let mut config = Config::from_env();

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Research {
            topic,
            depth,
            max_results,
            report,
        } => research_once(config, topic, depth, max_results, report).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "SLEUTH_API_KEYS is not set - admin endpoints are locked. Set SLEUTH_API_KEYS to enable /admin/* routes."
        );
    }

    let services = build_services(&config).await?;
    let cancel_token = CancellationToken::new();

    if config.cache.sweep_interval_secs > 0 {
        tracing::info!(
            "Starting cache sweeper... (interval={}s, ttl={}s)",
            config.cache.sweep_interval_secs,
            config.cache.ttl_secs
        );
        let cache = services.cache.clone();
        let sweep_interval = Duration::from_secs(config.cache.sweep_interval_secs);
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Cache sweeper shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(sweep_interval) => {
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            tracing::debug!(purged, "Expired search cache entries purged");
                        }
                    }
                }
            }
        });
    }

    if config.database.local_path.is_some() {
        let db = services.db.clone();
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(60)) => {
                        if let Err(e) = db.sync().await {
                            tracing::error!("Replica sync error: {}", e);
                        }
                    }
                }
            }
        });
    }

    let state = AppState::new(
        config.clone(),
        services.pipeline,
        services.reports,
        services.llm,
        cancel_token.clone(),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Sleuth starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn research_once(
    config: Config,
    topic: String,
    depth: Option<u32>,
    max_results: Option<u32>,
    report: bool,
) -> anyhow::Result<()> {
    let services = build_services(&config).await?;
    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let record = services
        .pipeline
        .start_research(
            &topic,
            depth.unwrap_or(config.analysis.default_depth),
            max_results.unwrap_or(config.search.default_max_results),
            &cancel_token,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    if report {
        let generated = services.reports.generate(&record.id, true).await?;
        tracing::info!(path = %generated.path.display(), "Report written");
    }

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling in-flight research...");
    cancel_token.cancel();
}
