use anyhow::{bail, Result};
use clap::Args;
use std::time::Instant;
use tracing::Instrument;

use crate::output::types::Meta;
use crate::requester::regions::{MemoryRegion, StatusRegions};
use crate::requester::transport::{HttpTransport, HttpTransportConfig, ReportTransport};
use crate::requester::types::{ReportFormat, RequestSource};
use crate::requester::{Messages, ReportRequester};
use crate::telemetry::{self};
use crate::telemetry::ops::generate::Phase as GeneratePhase;

pub mod types;

/// report generate: ask the server to build a problem report
#[derive(Args, Debug)]
pub struct GenerateCmd {
    /// Full report endpoint; falls back to REPORT_ENDPOINT
    #[arg(conflicts_with_all = ["base_url", "course"])]
    pub endpoint: Option<String>,
    /// Endpoint without query; combined with --course and --format
    #[arg(long, requires = "course")]
    pub base_url: Option<String>,
    #[arg(long, requires = "base_url")]
    pub course: Option<String>,
    #[arg(long, value_enum, default_value_t = ReportFormat::All)]
    pub format: ReportFormat,
    /// Print the request that would be sent and stop
    #[arg(long, default_value_t = false)]
    pub plan: bool,
}

pub async fn run(args: GenerateCmd) -> Result<()> {
    let source = resolve_source(&args, std::env::var("REPORT_ENDPOINT").ok())?;
    let transport = HttpTransport::new(HttpTransportConfig::from_env())?;
    let requester = ReportRequester::new(transport).with_messages(Messages::from_env());
    execute(&requester, &source, args.plan).await
}

fn resolve_source(args: &GenerateCmd, env_endpoint: Option<String>) -> Result<RequestSource> {
    if let Some(ep) = &args.endpoint {
        return Ok(RequestSource::new(ep.clone()));
    }
    if let (Some(base), Some(course)) = (&args.base_url, &args.course) {
        return RequestSource::for_course(base, course, args.format);
    }
    match env_endpoint {
        Some(ep) if !ep.trim().is_empty() => Ok(RequestSource::new(ep)),
        _ => bail!("Please provide an endpoint, --base-url with --course, or set REPORT_ENDPOINT"),
    }
}

async fn execute<T: ReportTransport>(requester: &ReportRequester<T>, source: &RequestSource, plan: bool) -> Result<()> {
    let log = telemetry::generate();
    let _g = log.root_span_kv([
        ("mode", if plan { "plan".to_string() } else { "apply".to_string() }),
        ("endpoint", source.endpoint.clone()),
    ]).entered();

    if plan {
        let _s = log.span(&GeneratePhase::Plan).entered();
        log.info(format!("📝 Generate plan: GET {}", source.endpoint));
        let plan = types::GeneratePlan { action: "generate", method: "GET", endpoint: source.endpoint.clone() };
        log.plan(&plan)?;
        return Ok(());
    }

    let t0 = Instant::now();
    let mut regions = StatusRegions::<MemoryRegion>::default();
    let outcome = requester
        .run(source, &mut regions)
        .instrument(log.span_kv(&GeneratePhase::Request, [("endpoint", source.endpoint.clone())]))
        .await;
    let elapsed = t0.elapsed().as_millis();

    let _s = log.span(&GeneratePhase::Render).entered();
    log.outcome(&outcome);
    match regions.visible() {
        Some((kind, text)) => log.info_kv("region rendered", [("region", kind.name().to_string()), ("text", text.to_string())]),
        None => log.warn_kv("no region visible", [("endpoint", source.endpoint.clone())]),
    }
    let result = types::GenerateResult::new(source.endpoint.clone(), outcome);
    log.result(&result, Some(Meta::timed(elapsed)))?;
    Ok(())
}
