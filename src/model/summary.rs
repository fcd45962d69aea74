use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emission and sequestration totals for one company or one branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionSummary {
    pub total_emissions: f64,
    pub total_sequestrations: f64,
}

/// Per-company totals across the whole fleet, keyed by company name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub footprints: BTreeMap<String, f64>,
    pub sequestrations: BTreeMap<String, f64>,
}
