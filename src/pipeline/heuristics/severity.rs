use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(label)
    }
}

const HIGH_KEYWORDS: &[&str] = &[
    "structural",
    "crack",
    "seepage",
    "leakage",
    "collapse",
    "severe",
    "major",
    "critical",
    "dangerous",
    "unstable",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "dampness",
    "stain",
    "minor crack",
    "peeling",
    "discoloration",
    "moderate",
    "wear",
];

/// Severity backed by a keyword in the text, if any. High keywords are
/// checked first, so "minor crack" grades High through "crack".
pub fn severity_indicator(observation: &str) -> Option<Severity> {
    let lower = observation.to_lowercase();

    if HIGH_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(Severity::High)
    } else if MEDIUM_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Keyword severity for one observation. Defaults to `Low`.
pub fn classify_severity(observation: &str) -> Severity {
    severity_indicator(observation).unwrap_or(Severity::Low)
}

/// Highest severity over a set of observations; `Low` for none.
pub fn overall_severity<S: AsRef<str>>(observations: &[S]) -> Severity {
    observations
        .iter()
        .map(|o| classify_severity(o.as_ref()))
        .max()
        .unwrap_or(Severity::Low)
}
