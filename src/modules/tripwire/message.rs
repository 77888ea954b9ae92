// src/modules/tripwire/message.rs

use crate::common::log::{self, LogLevel};
use crate::modules::tripwire::error::TemplateError;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

pub const PRODUCT_NAME: &str = "Tripwire";

// `{{.Path}}`, `{{ .UserAgent }}`, `{{- .IP -}}`
static GO_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(-?)\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*(-?)\}\}").expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Response,
    Report,
}

impl MessageKind {
    pub fn default_text(self, path: &str) -> String {
        match self {
            MessageKind::Response => format!("{} is a banned path. Powered by {}", path, PRODUCT_NAME),
            MessageKind::Report => format!("This IP accessed a banned path: {}. ({})", path, PRODUCT_NAME),
        }
    }

    fn label(self) -> &'static str {
        match self {
            MessageKind::Response => "response_template",
            MessageKind::Report => "report_template",
        }
    }
}

// Fields a template may reference.
#[derive(Debug, Clone, Serialize)]
pub struct Attributes<'a> {
    #[serde(rename = "Path")]
    pub path: &'a str,
    #[serde(rename = "UserAgent")]
    pub user_agent: &'a str,
    #[serde(rename = "IP")]
    pub ip: &'a str,
}

pub trait TemplateEngine: Send + Sync {
    fn render(&self, source: &str, attrs: &Attributes<'_>) -> Result<String, TemplateError>;
}

/// Sandboxed minijinja environment: no loader, so templates can't reach the
/// filesystem, and strict undefined handling so a misspelled field is an
/// error instead of an empty string.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaEngine {
    fn render(&self, source: &str, attrs: &Attributes<'_>) -> Result<String, TemplateError> {
        let source = rewrite_go_fields(source);
        self.env
            .render_str(&source, attrs)
            .map_err(|e| match e.kind() {
                ErrorKind::SyntaxError => TemplateError::Parse(e.to_string()),
                _ => TemplateError::Render(e.to_string()),
            })
    }
}

// Turns Go-style `{{.Field}}` references into plain `{{ Field }}` variables.
fn rewrite_go_fields(source: &str) -> String {
    GO_FIELD
        .replace_all(source, |caps: &Captures<'_>| {
            format!("{{{{{} {} {}}}}}", &caps[1], &caps[2], &caps[3])
        })
        .into_owned()
}

pub struct MessageRenderer {
    engine: Box<dyn TemplateEngine>,
    response_template: String,
    report_template: String,
}

impl MessageRenderer {
    pub fn new(response_template: &str, report_template: &str) -> Self {
        Self::with_engine(Box::new(JinjaEngine::new()), response_template, report_template)
    }

    pub fn with_engine(
        engine: Box<dyn TemplateEngine>,
        response_template: &str,
        report_template: &str,
    ) -> Self {
        Self {
            engine,
            response_template: response_template.to_string(),
            report_template: report_template.to_string(),
        }
    }

    pub fn response_body(&self, attrs: &Attributes<'_>) -> String {
        self.render(MessageKind::Response, &self.response_template, attrs)
    }

    pub fn report_comment(&self, attrs: &Attributes<'_>) -> String {
        self.render(MessageKind::Report, &self.report_template, attrs)
    }

    // Never fails: an empty or broken template yields the default text.
    pub fn render(&self, kind: MessageKind, source: &str, attrs: &Attributes<'_>) -> String {
        if source.is_empty() {
            return kind.default_text(attrs.path);
        }
        match self.engine.render(source, attrs) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::log(
                    LogLevel::Warn,
                    &format!("▲ {} fell back to default: {}", kind.label(), e),
                );
                kind.default_text(attrs.path)
            }
        }
    }

    // Renders both configured templates against sample values so broken ones
    // show up at startup rather than on the first flagged request.
    pub fn check(&self) -> Vec<(MessageKind, TemplateError)> {
        let sample = Attributes {
            path: "/check",
            user_agent: "tripwire-check",
            ip: "192.0.2.1",
        };
        [
            (MessageKind::Response, &self.response_template),
            (MessageKind::Report, &self.report_template),
        ]
        .into_iter()
        .filter(|(_, source)| !source.is_empty())
        .filter_map(|(kind, source)| self.engine.render(source, &sample).err().map(|e| (kind, e)))
        .collect()
    }
}
