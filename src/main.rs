use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use exchange_claims::claims::{
    claim_router, claim_title, compare_by_request_byline, request_byline, Claim, ClaimService,
    MemoryClaimStore, MemoryReferenceData,
};
use exchange_claims::config::AppConfig;
use exchange_claims::demo;
use exchange_claims::error::AppError;
use exchange_claims::telemetry;

#[derive(Clone)]
struct HealthState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Exchange Claim Tracker",
    about = "Track and serve gift-exchange challenge claims from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a fulfillment report for the seeded demo exchange
    Report,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Report => run_report(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = demo::shared_service()?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = HealthState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(claim_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "claim tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_report() -> Result<(), AppError> {
    let exchange = demo::seed()?;
    render_report(&exchange)?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<HealthState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<HealthState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_report(exchange: &demo::DemoExchange) -> Result<(), AppError> {
    let service: &ClaimService<MemoryClaimStore, MemoryReferenceData> = &exchange.service;
    let refs = service.references();
    let queries = service.queries();

    println!("Exchange claim report");
    println!("Collection: {}", exchange.collection.0);

    let mut claims: Vec<Claim> = queries
        .in_collection(exchange.collection)
        .map_err(|err| AppError::Service(err.into()))?;
    claims.sort_by(|a, b| compare_by_request_byline(a, b, refs));

    println!("\nClaims by requester");
    for claim in &claims {
        let classification = service.classification(claim)?;
        let byline = request_byline(claim, refs).unwrap_or_else(|_| "(unknown)".to_string());
        let title = claim_title(claim, refs).unwrap_or_else(|_| "(untitled)".to_string());
        println!(
            "- #{} requested by {} | {} | {} | {} | {}",
            claim.id.0,
            byline,
            classification.progress.label(),
            classification.approval.label(),
            classification.publication.label(),
            title
        );
    }

    let unfulfilled = queries
        .unfulfilled_in(exchange.collection)
        .map_err(|err| AppError::Service(err.into()))?;
    let unposted = queries
        .unposted_in(exchange.collection)
        .map_err(|err| AppError::Service(err.into()))?;

    println!("\nOutstanding");
    println!("- unfulfilled: {}", unfulfilled.len());
    println!("- unposted: {}", unposted.len());

    Ok(())
}
