// src/modules/tripwire/report.rs

use crate::common::log::{self, LogLevel};
use crate::modules::tripwire::error::{ConfigError, ReportError};
use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const ABUSEIPDB_REPORT_URL: &str = "https://api.abuseipdb.com/api/v2/report";
// 19: Bad Web Bot, 21: Web App Attack
pub const REPORT_CATEGORIES: &str = "19,21";
const API_KEY_HEADER: &str = "Key";
const APPLICATION_JSON: &str = "application/json";

// Body sent to AbuseIPDB.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AbuseReport {
    pub ip: String,
    pub categories: &'static str,
    pub comment: String,
}

// Snapshot of a flagged request, moved by value into the report task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJob {
    pub path: String,
    pub report: AbuseReport,
}

impl ReportJob {
    pub fn new(ip: &str, path: &str, comment: String) -> Self {
        Self {
            path: path.to_string(),
            report: AbuseReport {
                ip: ip.to_string(),
                categories: REPORT_CATEGORIES,
                comment,
            },
        }
    }
}

#[async_trait]
pub trait AbuseReporter: Send + Sync {
    // Returns the response status line on success.
    async fn report(&self, report: &AbuseReport) -> Result<String, ReportError>;
}

pub struct AbuseIpDbClient {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AbuseIpDbClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Self::with_endpoint(ABUSEIPDB_REPORT_URL, api_key, timeout)
    }

    pub(crate) fn with_endpoint(
        url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl AbuseReporter for AbuseIpDbClient {
    async fn report(&self, report: &AbuseReport) -> Result<String, ReportError> {
        let res = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, APPLICATION_JSON)
            .header(API_KEY_HEADER, &self.api_key)
            .json(report)
            .send()
            .await
            .map_err(|e| ReportError::Send(e.to_string()))?;

        let status = res.status();
        // Drain the body so the pooled connection can be reused.
        let body = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ReportError::Rejected(status, body));
        }
        log::log(LogLevel::Debug, &format!("▪ AbuseIPDB replied {}", body));
        Ok(status.to_string())
    }
}

// Used when DRY_RUN is set.
pub struct NoopReporter;

#[async_trait]
impl AbuseReporter for NoopReporter {
    async fn report(&self, report: &AbuseReport) -> Result<String, ReportError> {
        log::log(
            LogLevel::Warn,
            &format!("▲ Dry run, not reporting {} ({})", report.ip, report.comment),
        );
        Ok("dry run".to_string())
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    reporter: Arc<dyn AbuseReporter>,
}

// How a single report attempt ended.
#[derive(Debug)]
pub enum Delivery {
    Sent(String),
    Failed(ReportError),
    Panicked,
}

impl Dispatcher {
    pub fn new(reporter: Arc<dyn AbuseReporter>) -> Self {
        Self { reporter }
    }

    // Fire and forget. Errors and panics stay inside the spawned task; the
    // caller never waits on the network. Dropping the handle detaches it.
    pub fn dispatch(&self, job: ReportJob) -> JoinHandle<Delivery> {
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move { deliver(reporter.as_ref(), &job).await })
    }
}

async fn deliver(reporter: &dyn AbuseReporter, job: &ReportJob) -> Delivery {
    log::log(
        LogLevel::Info,
        &format!("➜ Reporting {} to AbuseIPDB ({})", job.report.ip, job.path),
    );
    let outcome = AssertUnwindSafe(reporter.report(&job.report))
        .catch_unwind()
        .await;
    match outcome {
        Ok(Ok(status)) => {
            log::log(
                LogLevel::Info,
                &format!("✓ Reported {} ({}) {}", job.report.ip, job.path, status),
            );
            Delivery::Sent(status)
        }
        Ok(Err(e)) => {
            log::log(
                LogLevel::Error,
                &format!("✗ Report for {} ({}) failed: {}", job.report.ip, job.path, e),
            );
            Delivery::Failed(e)
        }
        Err(_) => {
            log::log(
                LogLevel::Error,
                &format!("✗ Report for {} ({}) panicked", job.report.ip, job.path),
            );
            Delivery::Panicked
        }
    }
}
