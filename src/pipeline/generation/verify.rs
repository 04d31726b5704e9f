use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::contract::EntityLockContract;

static AREA_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Area\s+\d+:").expect("valid regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "ENTITY LOCK VIOLATION: Expected {expected} areas, found {actual} in output. \
     The model {}.",
    direction(.expected, .actual)
)]
pub struct EntityLockViolation {
    pub expected: usize,
    pub actual: usize,
}

fn direction(expected: &usize, actual: &usize) -> &'static str {
    if actual > expected {
        "added areas (hallucination detected)"
    } else {
        "dropped or merged areas"
    }
}

/// Count "Area <n>:" headings in generated text.
pub fn count_area_headings(text: &str) -> usize {
    AREA_HEADING.find_iter(text).count()
}

/// Reject output whose heading count differs from the locked area count.
pub fn verify_entity_lock(text: &str, contract: &EntityLockContract) -> Result<(), EntityLockViolation> {
    let expected = contract.expected_area_count();
    let actual = count_area_headings(text);

    if actual != expected {
        tracing::warn!(expected, actual, "Entity lock violated");
        return Err(EntityLockViolation { expected, actual });
    }

    tracing::info!(expected, actual, "Entity lock verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(k: usize) -> String {
        let mut text = String::from("# Detailed Diagnostic Report\n\n## 2. Area-wise Inspection Findings\n\n");
        for n in 1..=k {
            text.push_str(&format!("**Area {n}: Room {n}**\n\n**Observations:**\nDampness\n\n---\n\n"));
        }
        text
    }

    #[test]
    fn counts_headings_case_insensitively() {
        assert_eq!(count_area_headings("**Area 1: Hall**\n**AREA 2: Kitchen**\narea  3:"), 3);
        assert_eq!(count_area_headings("Impacted Area 1 and Area 2 without colons"), 0);
        assert_eq!(count_area_headings(""), 0);
    }

    #[test]
    fn exact_count_passes() {
        let contract = EntityLockContract::new(5, 0);
        assert!(verify_entity_lock(&report_with(5), &contract).is_ok());
    }

    #[test]
    fn one_more_fails_with_both_numbers() {
        let contract = EntityLockContract::new(5, 0);
        let err = verify_entity_lock(&report_with(6), &contract).unwrap_err();
        assert_eq!(err, EntityLockViolation { expected: 5, actual: 6 });
        let msg = err.to_string();
        assert!(msg.contains("Expected 5 areas, found 6"));
        assert!(msg.contains("added areas"));
    }

    #[test]
    fn one_fewer_fails_with_both_numbers() {
        let contract = EntityLockContract::new(5, 0);
        let err = verify_entity_lock(&report_with(4), &contract).unwrap_err();
        assert_eq!(err, EntityLockViolation { expected: 5, actual: 4 });
        assert!(err.to_string().contains("dropped or merged"));
    }

    #[test]
    fn two_headings_against_three_expected() {
        let text = "**Area 1: Hall**\nDampness\n**Area 2: Kitchen**\nCrack";
        let err = verify_entity_lock(text, &EntityLockContract::new(3, 2)).unwrap_err();
        assert_eq!((err.expected, err.actual), (3, 2));
    }

    #[test]
    fn zero_expected_zero_found() {
        assert!(verify_entity_lock("No areas.", &EntityLockContract::new(0, 0)).is_ok());
    }
}
