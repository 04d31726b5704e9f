use serde::Deserialize;

/// Remove markdown code-fence lines (```` ``` ```` / ```` ```json ````) around a model reply.
pub fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let body = trimmed
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    // A bare "json" language tag left on its own line.
    let body = body.trim();
    body.strip_prefix("json").unwrap_or(body).trim().to_string()
}

/// Parse a model reply as JSON, tolerating code fences and leading/trailing prose.
pub fn parse_json_reply(response: &str) -> Result<serde_json::Value, serde_json::Error> {
    let cleaned = strip_code_fences(response);
    match serde_json::from_str(&cleaned) {
        Ok(value) => Ok(value),
        Err(e) => match outermost_json(&cleaned) {
            Some(inner) => serde_json::from_str(inner),
            None => Err(e),
        },
    }
}

/// Slice from the first `{`/`[` to the last matching closer.
fn outermost_json(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

/// Deserialize array items leniently, skipping items that do not fit `T`.
pub fn parse_array_lenient<T: for<'de> Deserialize<'de>>(items: &[serde_json::Value]) -> Vec<T> {
    items
        .iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect()
}
