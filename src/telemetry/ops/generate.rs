use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Generate;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Request, Render }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Plan => "plan", Phase::Request => "request", Phase::Render => "render" } }
    fn span(&self) -> Span { match self { Phase::Plan => info_span!("plan"), Phase::Request => info_span!("request"), Phase::Render => info_span!("render") } }
}

impl OpMarker for Generate {
    const NAME: &'static str = "generate";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("generate") }
}
