use std::env;

use crate::telemetry::config::json_mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    /// REPORT_OUTPUT_FORMAT / REPORT_OUTPUT_PRETTY; `--json` overrides the format.
    pub fn from_env() -> Self {
        let format = match env::var("REPORT_OUTPUT_FORMAT").ok().as_deref() {
            _ if json_mode() => OutputFormat::Json,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };
        let pretty = match env::var("REPORT_OUTPUT_PRETTY").ok().as_deref() {
            Some(v) => parse_flag(v),
            None => false,
        };
        OutputConfig { format, pretty }
    }
}

fn parse_flag(v: &str) -> bool {
    v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
    }
}
