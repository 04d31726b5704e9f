pub mod extraction;
pub mod inspection; // Deterministic area segmentation + description
pub mod thermal;
pub mod validation; // Structural validation before any generation
pub mod generation; // Entity-locked report generation + verification
pub mod llm;
pub mod vision; // Image fallback (unwired by default)
pub mod heuristics;
pub mod processor;

/// Placeholder for any absent field. Never replaced by `null`.
pub const NOT_AVAILABLE: &str = "Not Available";

/// Root-cause placeholder when no causal phrase is found.
pub const REQUIRES_INVESTIGATION: &str = "Requires further investigation";

/// `true` when a field carries no information (blank or the sentinel).
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == NOT_AVAILABLE
}
