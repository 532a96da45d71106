use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

/// Where a report request goes. Borrowed per call, never retained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestSource {
    pub endpoint: String,
}

impl RequestSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    /// Build `<base>?course=<id>&format=<resumen|all>`, keeping any query the base already has.
    pub fn for_course(base: &str, course: &str, format: ReportFormat) -> Result<Self> {
        let course = course.trim();
        if course.is_empty() { bail!("Course id must not be empty"); }
        let mut url = match Url::parse(base) {
            Ok(u) => u,
            Err(_) => bail!("Invalid URL: {}", base),
        };
        url.query_pairs_mut()
            .append_pair("course", course)
            .append_pair("format", format.as_wire_str());
        Ok(Self { endpoint: url.into() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// One row per student and problem: attempts and score
    #[value(name = "resumen")]
    Summary,
    /// Full student answers per problem
    All,
}

impl ReportFormat {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            ReportFormat::Summary => "resumen",
            ReportFormat::All => "all",
        }
    }
}

/// Body returned by the report endpoint. `error` and `error_task` are kept raw
/// because the server sends strings there, not booleans. `status` and
/// `task_id` take any scalar; other shapes read as absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ReportResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub error_task: Option<Value>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub task_id: Option<String>,
}

impl ReportResponse {
    pub fn is_error(&self) -> bool { self.error.as_ref().is_some_and(is_truthy) }
    pub fn is_already_running(&self) -> bool { self.error_task.as_ref().is_some_and(is_truthy) }
}

fn scalar_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Script-style truthiness: null, false, zero and "" are falsy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
