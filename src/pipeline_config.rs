//! Pipeline configuration.
//!
//! Defaults match the quotas of the free Gemini tier (5 requests/minute,
//! 20 requests/day) and the area ceiling used by both the segmenter and the
//! structural validator. Every value can be overridden from the environment
//! (`DDR_*` variables) and, in the CLI, from flags.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::config;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Whether the image-based extraction fallback may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFallback {
    /// Never render pages for the model, even when text extraction looks thin.
    Disabled,
    /// Render pages and ask the model for observations from the photographs.
    Enabled,
}

impl FromStr for ImageFallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "false" | "0" => Ok(Self::Disabled),
            "enabled" | "on" | "true" | "1" => Ok(Self::Enabled),
            other => Err(ConfigError::Invalid {
                key: config::ENV_IMAGE_FALLBACK,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

/// Everything a single pipeline run needs to know besides its inputs.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Area-count ceiling (segmenter overflow + validator bound).
    pub max_areas: usize,
    /// Generation model name.
    pub model: String,
    /// Base URL of the generation API.
    pub api_base_url: String,
    /// HTTP timeout for a single generation call.
    pub request_timeout_secs: u64,
    /// Per-minute quota; drives the minimum interval between calls.
    pub requests_per_minute: u32,
    /// Hard daily ceiling.
    pub requests_per_day: u32,
    /// Maximum characters of thermal report text sent to the model.
    pub thermal_text_limit: usize,
    pub image_fallback: ImageFallback,
    pub images_per_batch: usize,
    pub max_image_pages: usize,
    pub render_dpi: u32,
    pub jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_areas: 20,
            model: "gemini-2.5-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com".into(),
            request_timeout_secs: 300,
            requests_per_minute: 5,
            requests_per_day: 20,
            thermal_text_limit: 100_000,
            image_fallback: ImageFallback::Disabled,
            images_per_batch: 5,
            max_image_pages: 15,
            render_dpi: 150,
            jpeg_quality: 85,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Derivation
// ═══════════════════════════════════════════════════════════

impl PipelineConfig {
    /// Defaults overridden by `DDR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(model) = lookup(config::ENV_MODEL).filter(|m| !m.trim().is_empty()) {
            cfg.model = model.trim().to_string();
        }
        if let Some(url) = lookup(config::ENV_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            cfg.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup(config::ENV_TIMEOUT_SECS) {
            cfg.request_timeout_secs = parse_positive(config::ENV_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(config::ENV_RPM) {
            cfg.requests_per_minute = parse_positive(config::ENV_RPM, &v)?;
        }
        if let Some(v) = lookup(config::ENV_RPD) {
            cfg.requests_per_day = parse_positive(config::ENV_RPD, &v)?;
        }
        if let Some(v) = lookup(config::ENV_MAX_AREAS) {
            cfg.max_areas = parse_positive(config::ENV_MAX_AREAS, &v)?;
        }
        if let Some(v) = lookup(config::ENV_IMAGE_FALLBACK) {
            cfg.image_fallback = v.parse()?;
        }

        Ok(cfg)
    }
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let value: T = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })?;
    if value == T::default() {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_free_tier() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.max_areas, 20);
        assert_eq!(cfg.requests_per_minute, 5);
        assert_eq!(cfg.requests_per_day, 20);
        assert_eq!(cfg.image_fallback, ImageFallback::Disabled);
        assert_eq!(cfg.model, "gemini-2.5-flash");
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.max_areas, PipelineConfig::default().max_areas);
        assert_eq!(cfg.thermal_text_limit, 100_000);
    }

    #[test]
    fn environment_overrides_values() {
        let cfg = PipelineConfig::from_lookup(lookup_from(&[
            ("DDR_MODEL", "gemini-2.0-pro"),
            ("DDR_RPM", "10"),
            ("DDR_RPD", "100"),
            ("DDR_MAX_AREAS", "12"),
            ("DDR_IMAGE_FALLBACK", "enabled"),
            ("DDR_API_BASE_URL", "http://localhost:8080/"),
        ]))
        .unwrap();
        assert_eq!(cfg.model, "gemini-2.0-pro");
        assert_eq!(cfg.requests_per_minute, 10);
        assert_eq!(cfg.requests_per_day, 100);
        assert_eq!(cfg.max_areas, 12);
        assert_eq!(cfg.image_fallback, ImageFallback::Enabled);
        assert_eq!(cfg.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn unparsable_value_is_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("DDR_RPM", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "DDR_RPM",
                value: "fast".into()
            }
        );
    }

    #[test]
    fn zero_quota_is_rejected() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("DDR_RPD", "0")])).unwrap_err();
        assert_eq!(err, ConfigError::Zero { key: "DDR_RPD" });
    }

    #[test]
    fn image_fallback_parses_aliases() {
        assert_eq!("off".parse::<ImageFallback>().unwrap(), ImageFallback::Disabled);
        assert_eq!("ON".parse::<ImageFallback>().unwrap(), ImageFallback::Enabled);
        assert!("sometimes".parse::<ImageFallback>().is_err());
    }

    #[test]
    fn image_fallback_serializes() {
        let json = serde_json::to_string(&ImageFallback::Disabled).unwrap();
        assert_eq!(json, "\"disabled\"");
    }

    #[test]
    fn pipeline_config_serializes() {
        let json = serde_json::to_string(&PipelineConfig::default()).unwrap();
        assert!(json.contains("\"max_areas\":20"));
        assert!(json.contains("\"image_fallback\":\"disabled\""));
    }
}
