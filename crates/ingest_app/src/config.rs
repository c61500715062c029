use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ingest_engine::{BrowserProfile, FetchSettings, OcrSettings};
use ingest_logging::ingest_info;
use serde::{Deserialize, Serialize};

/// Everything the binary can be configured with, as read from a RON file.
///
/// Missing fields keep their defaults, so a file only needs the values it
/// changes:
///
/// ```ron
/// (
///     request_timeout_secs: 60,
///     ocr: (language: "deu"),
///     output_dir: "exports",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub profile: BrowserProfile,
    pub ocr: OcrConfig,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub program: PathBuf,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            redirect_limit: fetch.redirect_limit,
            max_bytes: fetch.max_bytes,
            allowed_content_types: fetch.allowed_content_types,
            profile: fetch.profile,
            ocr: OcrConfig::default(),
            output_dir: PathBuf::from("ingest_output"),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        let ocr = OcrSettings::default();
        Self {
            program: ocr.program,
            language: ocr.language,
            timeout_secs: ocr.timeout.as_secs(),
        }
    }
}

impl IngestConfig {
    /// Read `path`, or fall back to the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = Self::from_ron(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        ingest_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            allowed_content_types: self.allowed_content_types.clone(),
            profile: self.profile.clone(),
        }
    }

    pub fn ocr_settings(&self) -> OcrSettings {
        OcrSettings {
            program: self.ocr.program.clone(),
            language: self.ocr.language.clone(),
            timeout: Duration::from_secs(self.ocr.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::IngestConfig;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = IngestConfig::from_ron(
            r#"(
                request_timeout_secs: 60,
                ocr: (language: "deu"),
                output_dir: "exports",
            )"#,
        )
        .unwrap();

        let defaults = IngestConfig::default();
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.connect_timeout_secs, defaults.connect_timeout_secs);
        assert_eq!(config.ocr.language, "deu");
        assert_eq!(config.ocr.program, defaults.ocr.program);
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.profile, defaults.profile);
    }

    #[test]
    fn settings_carry_the_configured_values() {
        let mut config = IngestConfig::default();
        config.request_timeout_secs = 5;
        config.allowed_content_types.clear();
        config.ocr.timeout_secs = 9;

        let fetch = config.fetch_settings();
        assert_eq!(fetch.request_timeout, Duration::from_secs(5));
        assert!(fetch.allowed_content_types.is_empty());
        assert_eq!(config.ocr_settings().timeout, Duration::from_secs(9));
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(IngestConfig::load(None).unwrap(), IngestConfig::default());
    }

    #[test]
    fn load_reports_unreadable_and_malformed_files() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.ron");
        let err = IngestConfig::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().starts_with("reading config file"));

        let broken = temp.path().join("broken.ron");
        std::fs::write(&broken, "(redirect_limit: \"many\")").unwrap();
        let err = IngestConfig::load(Some(Path::new(&broken))).unwrap_err();
        assert!(err.to_string().starts_with("parsing config file"));
    }

    #[test]
    fn default_config_survives_a_ron_round_trip() {
        let defaults = IngestConfig::default();
        let text = ron::ser::to_string_pretty(&defaults, ron::ser::PrettyConfig::new()).unwrap();
        assert_eq!(IngestConfig::from_ron(&text).unwrap(), defaults);
    }
}
