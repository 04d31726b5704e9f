/// Instruction for turning thermal report text into readings.
/// `{text}` is replaced with the (possibly truncated) report text.
pub const THERMAL_EXTRACTION_PROMPT: &str = r#"You are a structured data extractor.

The input text is extracted from a thermal inspection report.

Each page typically contains:
- Hotspot temperature
- Coldspot temperature
- Thermal image filename
- Date
- Emissivity
- Reflected temperature

Your task:
Extract structured thermal readings.

Rules:
1. Do NOT create area names
2. Do NOT infer leakage or dampness
3. Calculate temperature difference = hotspot - coldspot
4. If difference > 4°C → interpretation = "Significant temperature variation"
5. Else → interpretation = "Normal range"
6. If data missing → return "Not Available"
7. Ignore serial numbers and device model lines

Return STRICT JSON:
{
  "thermal_readings": [
    {
      "image_id": "",
      "hotspot": "",
      "coldspot": "",
      "temperature_difference": "",
      "interpretation": ""
    }
  ]
}

Input Text:
{text}

Return ONLY the JSON, nothing else.
"#;

/// Cut `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_thermal_prompt(text: &str, max_chars: usize) -> String {
    let input = truncate_chars(text, max_chars);
    if input.len() < text.len() {
        tracing::warn!(
            original_chars = text.chars().count(),
            kept_chars = max_chars,
            "Thermal report text truncated for extraction"
        );
    }
    THERMAL_EXTRACTION_PROMPT.replace("{text}", input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_and_rules() {
        let prompt = build_thermal_prompt("--- Page 1 ---\nRB02380X.JPG Hotspot 28.4", 1000);
        assert!(prompt.contains("RB02380X.JPG Hotspot 28.4"));
        assert!(prompt.contains("Do NOT create area names"));
        assert!(prompt.contains("\"thermal_readings\""));
        assert!(!prompt.contains("{text}"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("°C°C", 3), "°C°");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn long_text_truncated_in_prompt() {
        let text = "x".repeat(50);
        let prompt = build_thermal_prompt(&text, 10);
        assert!(prompt.contains(&"x".repeat(10)));
        assert!(!prompt.contains(&"x".repeat(11)));
    }
}
