use crate::config::AppConfig;
use crate::error::AppError;
use crate::routes::{router, AppState};
use crate::submission::delivery::SmtpMailer;
use crate::submission::pipeline::SubmissionPipeline;
use crate::telemetry;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub struct ServeOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub async fn run(overrides: ServeOverrides) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let mailer = SmtpMailer::from_config(&config.mail)?;
    let pipeline = Arc::new(SubmissionPipeline::new(Arc::new(mailer)));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        pipeline,
        upload: config.upload,
    };

    let app = router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, recipient = %config.mail.to, "registration intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
