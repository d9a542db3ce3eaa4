//! False-positive verdict for a single finding

use super::finding::Severity;
use serde::{Deserialize, Serialize};

/// The model's judgement on one finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingVerdict {
    pub is_false_positive: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, deserialize_with = "lenient_severity")]
    pub updated_severity: Option<Severity>,
}

impl FindingVerdict {
    /// Decode a verdict from parsed model output, clamping confidence to 0..=1.
    pub fn from_model_output(value: &serde_json::Value) -> Option<Self> {
        let mut verdict: FindingVerdict = serde_json::from_value(value.clone()).ok()?;
        verdict.confidence = verdict.confidence.clamp(0.0, 1.0);
        Some(verdict)
    }
}

/// Models sometimes answer `"N/A"` or `null` here; treat those as absent.
fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
