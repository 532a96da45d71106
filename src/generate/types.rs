use serde::Serialize;

use crate::requester::regions::RegionKind;
use crate::requester::Outcome;

#[derive(Serialize)]
pub struct GeneratePlan {
    pub action: &'static str,
    pub method: &'static str,
    pub endpoint: String,
}

/// `region`/`text` mirror what the page would show; `outcome` carries the detail.
#[derive(Serialize)]
pub struct GenerateResult {
    pub endpoint: String,
    pub region: RegionKind,
    pub text: String,
    pub outcome: Outcome,
}

impl GenerateResult {
    pub fn new(endpoint: String, outcome: Outcome) -> Self {
        Self {
            endpoint,
            region: outcome.region(),
            text: outcome.text().to_string(),
            outcome,
        }
    }
}
