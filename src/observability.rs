//! Observability module for centralized metrics and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection and Prometheus export
//! - Liveness/readiness endpoints served next to the metrics
//! - Span and metric helpers used by handlers, providers and the scheduler

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

async fn start_metrics_server(metrics_handle: PrometheusHandle, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let metrics_handle = metrics_handle.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = hyper::service::service_fn(
                            move |req: hyper::Request<hyper::body::Incoming>| {
                                let metrics_handle = metrics_handle.clone();
                                async move {
                                    match (req.method(), req.uri().path()) {
                                        (&hyper::Method::GET, "/metrics") => {
                                            Ok::<_, std::convert::Infallible>(
                                                hyper::Response::new(metrics_handle.render()),
                                            )
                                        }
                                        (&hyper::Method::GET, "/health/live")
                                        | (&hyper::Method::GET, "/health/ready") => {
                                            Ok(hyper::Response::new("OK".to_string()))
                                        }
                                        _ => {
                                            let mut response =
                                                hyper::Response::new("Not Found".to_string());
                                            *response.status_mut() = hyper::StatusCode::NOT_FOUND;
                                            Ok(response)
                                        }
                                    }
                                }
                            },
                        );

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await
                        {
                            tracing::error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Error accepting connection: {}", e);
                }
            }
        }
    });

    Ok(())
}

/// Initialize logging, metrics and the metrics server
pub async fn init_observability(config: &ObservabilityConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;

    if config.enable_metrics_export {
        let metrics_handle = init_metrics_with_config(config)?;
        start_metrics_server(metrics_handle, config.metrics_port)
            .await?;
    }

    tracing::info!(
        environment = %config.environment,
        metrics_export = %config.enable_metrics_export,
        metrics_port = %config.metrics_port,
        "Observability stack initialized successfully"
    );
    Ok(())
}

/// Initialize structured logging with tracing and configuration
fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("assistant_bot={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("teloxide=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    if config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder
fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!(
        metrics_enabled = %config.enable_metrics_export,
        "Metrics collection initialized"
    );
    Ok(handle)
}

/// Create a span for a Telegram-facing operation
pub fn telegram_span(operation: &str, chat_id: Option<i64>) -> tracing::Span {
    tracing::info_span!(
        "telegram_operation",
        operation = operation,
        chat_id = chat_id,
        component = "telegram"
    )
}

/// Record an inbound event by kind (command, button, text, location)
pub fn record_bot_event(kind: &'static str) {
    metrics::counter!("bot_events_total", "kind" => kind).increment(1);
}

/// Record a dispatched command
pub fn record_command(command: &'static str) {
    metrics::counter!("bot_commands_total", "command" => command).increment(1);
}

/// Record an external provider call
pub fn record_external_request(provider: &'static str, success: bool, duration: Duration) {
    metrics::counter!(
        "external_requests_total",
        "provider" => provider,
        "result" => if success { "success" } else { "failure" }
    )
    .increment(1);
    metrics::histogram!("external_request_duration_seconds", "provider" => provider)
        .record(duration.as_secs_f64());
}

/// Record a scheduled job firing
pub fn record_scheduled_job(kind: &'static str) {
    metrics::counter!("scheduled_jobs_fired_total", "kind" => kind).increment(1);
}

/// Record error metrics
pub fn record_error_metrics(error_type: &'static str, component: &'static str) {
    metrics::counter!("errors_total", "type" => error_type, "component" => component).increment(1);
}
