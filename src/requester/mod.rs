use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub mod regions;
pub mod transport;
pub mod types;

use regions::{RegionKind, StatusRegion, StatusRegions};
use transport::{ReportTransport, TransportError};
use types::{ReportResponse, RequestSource};

pub const DEFAULT_ERROR_MESSAGE: &str =
    "Error generating the problem report. Please refresh the page and try again.";
pub const DEFAULT_ALREADY_RUNNING_MESSAGE: &str =
    "The report is already being generated, please wait.";

/// Literal strings rendered into the error and warning regions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Messages {
    pub error: String,
    pub already_running: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            error: DEFAULT_ERROR_MESSAGE.to_string(),
            already_running: DEFAULT_ALREADY_RUNNING_MESSAGE.to_string(),
        }
    }
}

impl Messages {
    /// REPORT_ERROR_MESSAGE / REPORT_ALREADY_RUNNING_MESSAGE override the defaults.
    pub fn from_env() -> Self {
        let mut m = Self::default();
        if let Ok(v) = std::env::var("REPORT_ERROR_MESSAGE") {
            if !v.is_empty() { m.error = v; }
        }
        if let Ok(v) = std::env::var("REPORT_ALREADY_RUNNING_MESSAGE") {
            if !v.is_empty() { m.already_running = v; }
        }
        m
    }
}

/// What a single `run` rendered. Exactly one per invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    TransportError { message: String },
    ApplicationError { message: String },
    AlreadyRunning { message: String },
    Success {
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        task_id: Option<String>,
    },
}

impl Outcome {
    pub fn region(&self) -> RegionKind {
        match self {
            Outcome::TransportError { .. } | Outcome::ApplicationError { .. } => RegionKind::Error,
            Outcome::AlreadyRunning { .. } => RegionKind::Warning,
            Outcome::Success { .. } => RegionKind::Success,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Outcome::TransportError { message }
            | Outcome::ApplicationError { message }
            | Outcome::AlreadyRunning { message } => message,
            Outcome::Success { status, .. } => status,
        }
    }
}

pub struct ReportRequester<T: ReportTransport> {
    transport: T,
    messages: Messages,
}

impl<T: ReportTransport> ReportRequester<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, messages: Messages::default() }
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn transport(&self) -> &T { &self.transport }

    /// Send one GET to `source.endpoint` and render the result into `regions`.
    /// Failures are rendered, never returned as `Err`.
    pub async fn run<R: StatusRegion>(&self, source: &RequestSource, regions: &mut StatusRegions<R>) -> Outcome {
        let outcome = match self.transport.get_report(&source.endpoint).await {
            Ok(resp) => self.classify(resp),
            Err(err) => self.transport_failure(&err),
        };
        regions.show(outcome.region(), outcome.text());
        outcome
    }

    fn classify(&self, resp: ReportResponse) -> Outcome {
        if resp.is_error() {
            // Server detail is logged only; the region always gets the generic text.
            warn!(detail = ?resp.error, "report endpoint flagged an application error");
            return Outcome::ApplicationError { message: self.messages.error.clone() };
        }
        if resp.is_already_running() {
            debug!(detail = ?resp.error_task, "report already running");
            return Outcome::AlreadyRunning { message: self.messages.already_running.clone() };
        }
        Outcome::Success {
            status: resp.status.unwrap_or_default(),
            task_id: resp.task_id,
        }
    }

    /// Only a non-2xx body may carry a display message; undecodable 2xx bodies
    /// always get the default.
    fn transport_failure(&self, err: &TransportError) -> Outcome {
        warn!(error = %err, "report request failed");
        let parsed = match err {
            TransportError::Status { body: Some(b), .. } => serde_json::from_str::<Value>(b).ok(),
            _ => None,
        };
        let message = match parsed {
            Some(Value::String(s)) => s,
            Some(other) => {
                debug!(body = %other, "error body is not a plain message");
                self.messages.error.clone()
            }
            None => self.messages.error.clone(),
        };
        Outcome::TransportError { message }
    }
}
