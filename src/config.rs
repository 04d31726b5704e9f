use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ddrgen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the Gemini API key.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Overrides the generation model name.
pub const ENV_MODEL: &str = "DDR_MODEL";
/// Overrides the Gemini API base URL (useful for proxies).
pub const ENV_API_BASE_URL: &str = "DDR_API_BASE_URL";
/// Overrides the HTTP request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "DDR_TIMEOUT_SECS";
/// Requests-per-minute quota for the rate gate.
pub const ENV_RPM: &str = "DDR_RPM";
/// Requests-per-day ceiling for the rate gate.
pub const ENV_RPD: &str = "DDR_RPD";
/// Area-count ceiling shared by the segmenter and the validator.
pub const ENV_MAX_AREAS: &str = "DDR_MAX_AREAS";
/// `enabled` / `disabled` switch for the image-based fallback.
pub const ENV_IMAGE_FALLBACK: &str = "DDR_IMAGE_FALLBACK";

/// File name used when the operator does not pass `--output`.
pub const DEFAULT_REPORT_FILE: &str = "DDR_Report.md";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("{APP_NAME}=info,{APP_NAME}_lib=info")
}

/// Directory where generated reports land when no output path is given.
/// ~/DDR-Reports/ on all platforms, falling back to the current directory.
pub fn reports_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("DDR-Reports"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default output path for a generated report.
pub fn default_report_path() -> PathBuf {
    reports_dir().join(DEFAULT_REPORT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_dir_under_home() {
        let dir = reports_dir();
        if let Some(home) = dirs::home_dir() {
            assert!(dir.starts_with(home));
        }
        assert!(dir.ends_with("DDR-Reports"));
    }

    #[test]
    fn default_report_path_uses_markdown_file() {
        let path = default_report_path();
        assert!(path.starts_with(reports_dir()));
        assert_eq!(path.file_name().unwrap(), DEFAULT_REPORT_FILE);
    }

    #[test]
    fn app_name_is_ddrgen() {
        assert_eq!(APP_NAME, "ddrgen");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert_eq!(default_log_filter(), "ddrgen=info,ddrgen_lib=info");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
