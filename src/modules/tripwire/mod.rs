// src/modules/tripwire/mod.rs

pub mod config;
pub mod error;
pub mod matcher;
pub mod message;
pub mod report;

use crate::common::log::{self, LogLevel};
use crate::core::response;
use axum::{
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use config::Settings;
use error::ConfigError;
use matcher::PatternMatcher;
use message::{Attributes, MessageRenderer};
use percent_encoding::percent_decode_str;
use report::{AbuseIpDbClient, AbuseReporter, Dispatcher, NoopReporter, ReportJob};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

// The parts of a request the decision depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFacts {
    pub path: String,
    pub host: String,
    pub user_agent: String,
}

impl RequestFacts {
    pub fn new(path: &str, peer: SocketAddr, user_agent: &str) -> Self {
        Self {
            path: percent_decode_str(path).decode_utf8_lossy().into_owned(),
            host: peer.ip().to_canonical().to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn from_request(req: &Request<Body>, peer: SocketAddr) -> Self {
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        Self::new(req.uri().path(), peer, user_agent)
    }

    fn attributes(&self) -> Attributes<'_> {
        Attributes {
            path: &self.path,
            user_agent: &self.user_agent,
            ip: &self.host,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    // Not a banned path.
    Pass,
    // Banned path, but the caller matches the whitelist.
    Whitelisted,
    // Banned path from an unlisted caller: forbid and report.
    Flagged,
}

pub struct Tripwire {
    matcher: PatternMatcher,
    messages: MessageRenderer,
    dispatcher: Dispatcher,
}

impl Tripwire {
    pub fn new(settings: &Settings, reporter: Arc<dyn AbuseReporter>) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            matcher: PatternMatcher::new(&settings.banned_pattern, &settings.whitelist_pattern)?,
            messages: MessageRenderer::new(&settings.response_template, &settings.report_template),
            dispatcher: Dispatcher::new(reporter),
        })
    }

    // Builds the AbuseIPDB client, or the logging-only reporter on a dry run.
    pub fn from_settings(
        settings: &Settings,
        report_timeout: Duration,
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let reporter: Arc<dyn AbuseReporter> = if dry_run {
            Arc::new(NoopReporter)
        } else {
            Arc::new(AbuseIpDbClient::new(&settings.api_key, report_timeout)?)
        };
        Self::new(settings, reporter)
    }

    pub fn messages(&self) -> &MessageRenderer {
        &self.messages
    }

    pub fn classify(&self, facts: &RequestFacts) -> Disposition {
        if !self.matcher.is_banned(&facts.path) {
            Disposition::Pass
        } else if self.matcher.is_whitelisted(&facts.host) {
            Disposition::Whitelisted
        } else {
            Disposition::Flagged
        }
    }

    // `next` runs exactly once on pass-through and never for a flagged request.
    pub async fn handle(&self, facts: RequestFacts, req: Request<Body>, next: Next) -> Response {
        match self.classify(&facts) {
            Disposition::Pass => next.run(req).await,
            Disposition::Whitelisted => {
                log::log(LogLevel::Info, &self.bypass_message(&facts));
                next.run(req).await
            }
            Disposition::Flagged => self.forbid(&facts),
        }
    }

    fn bypass_message(&self, facts: &RequestFacts) -> String {
        format!(
            "▪ {} bypassed {} via whitelist {}",
            facts.host,
            facts.path,
            self.matcher.whitelist_pattern().unwrap_or_default()
        )
    }

    fn forbid(&self, facts: &RequestFacts) -> Response {
        let attrs = facts.attributes();
        let body = self.messages.response_body(&attrs);
        let comment = self.messages.report_comment(&attrs);
        self.dispatcher
            .dispatch(ReportJob::new(&facts.host, &facts.path, comment));
        response::banned(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::tripwire::report::tests::RecordingReporter;
    use tokio::sync::mpsc;

    fn settings(whitelist: &str) -> Settings {
        Settings {
            api_key: "k".to_string(),
            banned_pattern: "/admin".to_string(),
            whitelist_pattern: whitelist.to_string(),
            ..Settings::default()
        }
    }

    fn tripwire(whitelist: &str) -> Tripwire {
        let (tx, _rx) = mpsc::unbounded_channel();
        Tripwire::new(&settings(whitelist), Arc::new(RecordingReporter { tx })).unwrap()
    }

    fn facts(path: &str, peer: &str) -> RequestFacts {
        RequestFacts::new(path, peer.parse().unwrap(), "curl/8.4.0")
    }

    #[test]
    fn classifies_requests() {
        let tripwire = tripwire(r"^10\.");
        assert_eq!(tripwire.classify(&facts("/", "203.0.113.5:443")), Disposition::Pass);
        assert_eq!(
            tripwire.classify(&facts("/admin/login", "203.0.113.5:443")),
            Disposition::Flagged
        );
        assert_eq!(
            tripwire.classify(&facts("/admin/login", "10.0.0.8:51000")),
            Disposition::Whitelisted
        );
    }

    #[test]
    fn bypass_message_names_path_and_pattern() {
        let tripwire = tripwire(r"^10\.");
        let facts = facts("/admin/login", "10.0.0.8:51000");
        assert_eq!(tripwire.classify(&facts), Disposition::Whitelisted);
        assert_eq!(
            tripwire.bypass_message(&facts),
            r"▪ 10.0.0.8 bypassed /admin/login via whitelist ^10\."
        );
    }

    #[test]
    fn facts_strip_port_and_decode_path() {
        let facts = facts("/%61dmin/login", "[::ffff:203.0.113.5]:443");
        assert_eq!(facts.path, "/admin/login");
        assert_eq!(facts.host, "203.0.113.5");

        let v6 = RequestFacts::new("/", "[2001:db8::1]:8080".parse().unwrap(), "");
        assert_eq!(v6.host, "2001:db8::1");
    }

    #[test]
    fn encoded_paths_are_still_flagged() {
        let tripwire = tripwire("");
        assert_eq!(
            tripwire.classify(&facts("/%61dmin", "203.0.113.5:443")),
            Disposition::Flagged
        );
    }

    #[test]
    fn refuses_invalid_settings() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let reporter: Arc<dyn AbuseReporter> = Arc::new(RecordingReporter { tx });

        let mut bad = settings("");
        bad.api_key.clear();
        assert!(matches!(
            Tripwire::new(&bad, reporter.clone()),
            Err(ConfigError::MissingApiKey)
        ));

        let mut bad = settings("");
        bad.banned_pattern = "(".to_string();
        assert!(matches!(
            Tripwire::new(&bad, reporter),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn dry_run_needs_no_http_client() {
        let tripwire = Tripwire::from_settings(&settings(""), Duration::from_secs(1), true).unwrap();
        assert_eq!(
            tripwire.classify(&facts("/admin", "203.0.113.5:443")),
            Disposition::Flagged
        );
    }
}
