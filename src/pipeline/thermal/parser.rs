use super::types::ThermalRecord;
use super::ThermalError;
use crate::pipeline::llm::{parse_array_lenient, parse_json_reply};

/// Parse the model's thermal reply into raw records.
///
/// Accepts `{"thermal_readings": [...]}` or a bare array. Entries that are not
/// objects are skipped.
pub fn parse_thermal_response(response: &str) -> Result<Vec<ThermalRecord>, ThermalError> {
    if response.trim().is_empty() {
        return Err(ThermalError::MalformedResponse("empty reply".into()));
    }

    let value =
        parse_json_reply(response).map_err(|e| ThermalError::JsonParsing(e.to_string()))?;

    let items: &[serde_json::Value] = match &value {
        serde_json::Value::Array(items) => items.as_slice(),
        serde_json::Value::Object(map) => match map.get("thermal_readings") {
            Some(serde_json::Value::Array(items)) => items.as_slice(),
            Some(serde_json::Value::Null) | None => &[],
            Some(_) => {
                return Err(ThermalError::MalformedResponse(
                    "\"thermal_readings\" is not an array".into(),
                ))
            }
        },
        _ => {
            return Err(ThermalError::MalformedResponse(
                "expected a JSON object or array".into(),
            ))
        }
    };

    let objects: Vec<serde_json::Value> =
        items.iter().filter(|v| v.is_object()).cloned().collect();
    let skipped = items.len() - objects.len();
    if skipped > 0 {
        tracing::warn!(skipped, "Non-object thermal entries ignored");
    }

    Ok(parse_array_lenient(&objects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_readings() {
        let reply = r#"```json
{
  "thermal_readings": [
    {"image_id": "RB02380X.JPG", "hotspot": "28.4", "coldspot": "22.1", "temperature_difference": "6.3", "interpretation": "Significant temperature variation"},
    {"image_id": "RB02381X.JPG", "hotspot": 25.0, "coldspot": 23.5}
  ]
}
```"#;
        let records = parse_thermal_response(reply).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_id_value(), Some("RB02380X.JPG"));
        assert_eq!(records[1].hotspot.as_deref(), Some("25.0"));
    }

    #[test]
    fn parses_bare_array_and_skips_non_objects() {
        let records =
            parse_thermal_response(r#"[{"image_id": "A.JPG"}, "noise", 3, {"area": "Hall"}]"#)
                .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].has_area_key());
        assert!(!records[1].has_image_id_key());
    }

    #[test]
    fn missing_key_means_no_readings() {
        assert!(parse_thermal_response(r#"{"other": 1}"#).unwrap().is_empty());
    }

    #[test]
    fn wrong_shape_rejected() {
        assert!(matches!(
            parse_thermal_response(r#"{"thermal_readings": "none"}"#),
            Err(ThermalError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_thermal_response("42"),
            Err(ThermalError::MalformedResponse(_))
        ));
    }

    #[test]
    fn invalid_json_rejected() {
        assert!(matches!(
            parse_thermal_response("I could not find readings."),
            Err(ThermalError::JsonParsing(_))
        ));
        assert!(matches!(
            parse_thermal_response("   "),
            Err(ThermalError::MalformedResponse(_))
        ));
    }
}
