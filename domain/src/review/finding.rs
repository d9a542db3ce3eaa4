//! Security findings and the report they form

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One reported vulnerability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    pub severity: Severity,
    #[serde(default)]
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub exploit_scenario: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub confidence: f64,
}

impl Finding {
    /// Decode one finding as the model wrote it.
    ///
    /// Numbers may arrive as strings (`"line": "15"`, `"confidence": "0.9"`),
    /// an unknown or missing severity becomes `MEDIUM`, and text fields
    /// default to empty. Only entries that are not objects, or that carry
    /// neither a file nor a description, are rejected.
    pub fn from_model_value(value: &Value) -> Result<Self, String> {
        let Some(object) = value.as_object() else {
            return Err(format!("expected an object, got {}", json_kind(value)));
        };

        let text = |key: &str| match object.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let file = text("file");
        let description = text("description");
        if file.is_empty() && description.is_empty() {
            return Err("finding has neither a file nor a description".to_string());
        }

        let severity = match object.get("severity") {
            Some(Value::String(s)) => s.parse().unwrap_or(Severity::Medium),
            _ => Severity::Medium,
        };

        Ok(Self {
            file,
            line: object.get("line").and_then(lenient_line),
            severity,
            category: text("category"),
            description,
            exploit_scenario: text("exploit_scenario"),
            recommendation: text("recommendation"),
            confidence: object
                .get("confidence")
                .and_then(lenient_number)
                .unwrap_or(0.0),
        })
    }
}

/// `15`, `15.0`, `"15"` or `"15-20"` (first line of a range)
fn lenient_line(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Counters reported alongside the findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSummary {
    pub files_reviewed: u32,
    pub high_severity: u32,
    pub medium_severity: u32,
    pub low_severity: u32,
    pub review_completed: bool,
}

/// Structured result of a security audit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub analysis_summary: AnalysisSummary,
}

/// A `findings` entry that could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFinding {
    /// Position in the model's `findings` array
    pub index: usize,
    pub reason: String,
    pub raw: Value,
}

/// Report plus the entries that were dropped while decoding it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedReport {
    pub report: SecurityReport,
    pub rejected: Vec<RejectedFinding>,
}

impl SecurityReport {
    /// Report returned when the model reply contained no findings structure
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a report from a parsed model reply.
    ///
    /// Only a JSON object with a `findings` key counts; anything else yields
    /// the empty report. See [`SecurityReport::decode_model_output`].
    pub fn from_model_output(value: &Value) -> Self {
        Self::decode_model_output(value).report
    }

    /// Build a report from a parsed model reply, keeping every finding that
    /// can be read at all.
    ///
    /// Findings are decoded leniently (see [`Finding::from_model_value`]);
    /// entries that still cannot be read are returned in `rejected`.
    pub fn decode_model_output(value: &Value) -> DecodedReport {
        let Some(object) = value.as_object() else {
            return DecodedReport::default();
        };
        let Some(raw_findings) = object.get("findings").and_then(Value::as_array) else {
            return DecodedReport::default();
        };

        let mut findings = Vec::with_capacity(raw_findings.len());
        let mut rejected = Vec::new();
        for (index, raw) in raw_findings.iter().enumerate() {
            match Finding::from_model_value(raw) {
                Ok(finding) => findings.push(finding),
                Err(reason) => rejected.push(RejectedFinding {
                    index,
                    reason,
                    raw: raw.clone(),
                }),
            }
        }

        let analysis_summary = object
            .get("analysis_summary")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
            .unwrap_or_default();

        DecodedReport {
            report: Self {
                findings,
                analysis_summary,
            },
            rejected,
        }
    }

    /// Recompute the severity counters from the current findings.
    ///
    /// Critical findings count towards `high_severity`.
    pub fn recount(&mut self) {
        let count = |pred: fn(&Severity) -> bool| {
            self.findings.iter().filter(|f| pred(&f.severity)).count() as u32
        };
        let high = count(|s| matches!(s, Severity::High | Severity::Critical));
        let medium = count(|s| matches!(s, Severity::Medium));
        let low = count(|s| matches!(s, Severity::Low));
        self.analysis_summary.high_severity = high;
        self.analysis_summary.medium_severity = medium;
        self.analysis_summary.low_severity = low;
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }

}
