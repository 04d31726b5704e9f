use super::parser::parse_thermal_response;
use super::prompt::build_thermal_prompt;
use super::types::ThermalRecord;
use super::ThermalError;
use crate::pipeline::llm::{generate_gated, LlmClient, RateGate};

/// Model-assisted extraction of thermal readings from report text.
pub struct ThermalExtractor<'a> {
    llm: &'a dyn LlmClient,
    text_limit: usize,
}

impl<'a> ThermalExtractor<'a> {
    pub fn new(llm: &'a dyn LlmClient, text_limit: usize) -> Self {
        Self { llm, text_limit }
    }

    pub fn extract(&self, gate: &mut RateGate, text: &str) -> Result<Vec<ThermalRecord>, ThermalError> {
        tracing::info!(chars = text.len(), "Extracting thermal readings from text");
        let prompt = build_thermal_prompt(text, self.text_limit);
        let response = generate_gated(self.llm, gate, &prompt, &[])?;
        let records = parse_thermal_response(&response)?;
        tracing::info!(count = records.len(), "Thermal records extracted");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::{LlmError, ManualClock, MockLlmClient};

    fn gate() -> RateGate {
        RateGate::with_clock(5, 20, Box::new(ManualClock::new()))
    }

    #[test]
    fn extracts_through_gate() {
        let llm = MockLlmClient::new(r#"{"thermal_readings": [{"image_id": "RB1.JPG"}]}"#);
        let mut gate = gate();
        let records = ThermalExtractor::new(&llm, 100_000)
            .extract(&mut gate, "--- Page 1 ---\nRB1.JPG")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(gate.calls_made(), 1);
        assert!(llm.prompts()[0].contains("RB1.JPG"));
    }

    #[test]
    fn llm_failure_propagates() {
        let llm = MockLlmClient::failing(503);
        let err = ThermalExtractor::new(&llm, 100)
            .extract(&mut gate(), "text")
            .unwrap_err();
        assert!(matches!(err, ThermalError::Llm(LlmError::Api { status: 503, .. })));
    }

    #[test]
    fn unparseable_reply_is_error() {
        let llm = MockLlmClient::new("sorry, no data");
        let err = ThermalExtractor::new(&llm, 100)
            .extract(&mut gate(), "text")
            .unwrap_err();
        assert!(matches!(err, ThermalError::JsonParsing(_)));
    }
}
