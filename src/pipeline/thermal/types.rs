use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::pipeline::NOT_AVAILABLE;

/// Thermal record as returned by the model, before validation.
///
/// `image_id` and `area` keep key presence: `None` means the key was absent,
/// `Some(None)` means it was present but null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThermalRecord {
    #[serde(default, deserialize_with = "present_lenient")]
    pub image_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_lenient")]
    pub area: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hotspot: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub coldspot: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub temperature_difference: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interpretation: Option<String>,
}

impl ThermalRecord {
    pub fn with_image_id(image_id: &str) -> Self {
        Self {
            image_id: Some(Some(image_id.to_string())),
            ..Self::default()
        }
    }

    pub fn has_image_id_key(&self) -> bool {
        self.image_id.is_some()
    }

    pub fn has_area_key(&self) -> bool {
        self.area.is_some()
    }

    pub fn image_id_value(&self) -> Option<&str> {
        self.image_id.as_ref().and_then(|v| v.as_deref())
    }
}

/// Strings stay strings; numbers and booleans are rendered; null and
/// structured values become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn present_lenient<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Some)
}

/// Normalized thermal reading. Never carries an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalReading {
    pub image_id: String,
    pub hotspot: String,
    pub coldspot: String,
    pub temperature_difference: String,
    pub interpretation: String,
}

fn field_or_sentinel(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Blank or absent fields become the sentinel. Any `area` key is discarded.
impl From<&ThermalRecord> for ThermalReading {
    fn from(record: &ThermalRecord) -> Self {
        Self {
            image_id: field_or_sentinel(record.image_id_value()),
            hotspot: field_or_sentinel(record.hotspot.as_deref()),
            coldspot: field_or_sentinel(record.coldspot.as_deref()),
            temperature_difference: field_or_sentinel(record.temperature_difference.as_deref()),
            interpretation: field_or_sentinel(record.interpretation.as_deref()),
        }
    }
}

/// Keep the first reading per `image_id`. Returns the kept readings and the
/// ids of dropped duplicates, in encounter order.
pub fn dedup_by_image_id(readings: Vec<ThermalReading>) -> (Vec<ThermalReading>, Vec<String>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(readings.len());
    let mut dropped = Vec::new();

    for reading in readings {
        if seen.insert(reading.image_id.clone()) {
            kept.push(reading);
        } else {
            dropped.push(reading.image_id);
        }
    }

    (kept, dropped)
}

/// Number of distinct image ids.
pub fn distinct_image_ids(readings: &[ThermalReading]) -> usize {
    readings
        .iter()
        .map(|r| r.image_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, hot: &str) -> ThermalReading {
        ThermalReading {
            image_id: id.into(),
            hotspot: hot.into(),
            coldspot: "22.1".into(),
            temperature_difference: "Not Available".into(),
            interpretation: "Not Available".into(),
        }
    }

    #[test]
    fn reading_from_record_fills_sentinel() {
        let record: ThermalRecord =
            serde_json::from_str(r#"{"image_id": " IR_07.JPG ", "area": "Hall", "hotspot": "", "coldspot": 21}"#)
                .unwrap();
        let reading = ThermalReading::from(&record);
        assert_eq!(reading.image_id, "IR_07.JPG");
        assert_eq!(reading.hotspot, NOT_AVAILABLE);
        assert_eq!(reading.coldspot, "21");
        assert_eq!(reading.interpretation, NOT_AVAILABLE);
    }

    #[test]
    fn record_keeps_key_presence() {
        let absent: ThermalRecord = serde_json::from_str(r#"{"area": "Hall"}"#).unwrap();
        assert!(!absent.has_image_id_key());
        assert!(absent.has_area_key());

        let null: ThermalRecord = serde_json::from_str(r#"{"image_id": null}"#).unwrap();
        assert!(null.has_image_id_key());
        assert_eq!(null.image_id_value(), None);
        assert!(!null.has_area_key());
    }

    #[test]
    fn numeric_values_accepted() {
        let record: ThermalRecord = serde_json::from_str(
            r#"{"image_id": "RB02380X.JPG", "hotspot": 28.4, "coldspot": "22.1 °C", "temperature_difference": 6}"#,
        )
        .unwrap();
        assert_eq!(record.image_id_value(), Some("RB02380X.JPG"));
        assert_eq!(record.hotspot.as_deref(), Some("28.4"));
        assert_eq!(record.coldspot.as_deref(), Some("22.1 °C"));
        assert_eq!(record.temperature_difference.as_deref(), Some("6"));
        assert_eq!(record.interpretation, None);
    }

    #[test]
    fn structured_values_become_none() {
        let record: ThermalRecord =
            serde_json::from_str(r#"{"image_id": ["a"], "hotspot": {"v": 1}}"#).unwrap();
        assert!(record.has_image_id_key());
        assert_eq!(record.image_id_value(), None);
        assert_eq!(record.hotspot, None);
    }

    #[test]
    fn dedup_first_wins() {
        let (kept, dropped) = dedup_by_image_id(vec![
            reading("A.JPG", "30"),
            reading("B.JPG", "31"),
            reading("A.JPG", "99"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].hotspot, "30");
        assert_eq!(dropped, vec!["A.JPG"]);
        assert_eq!(kept.len(), distinct_image_ids(&kept));
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let (kept, _) = dedup_by_image_id(vec![reading("a.jpg", "1"), reading("A.JPG", "2")]);
        assert_eq!(kept.len(), 2);
    }
}
