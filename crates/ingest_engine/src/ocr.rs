use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use ingest_core::clean_text;
use tokio::process::Command;

use crate::{ExtractError, FileExtractor, SourceFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    /// Tesseract executable; resolved through `PATH` when relative.
    pub program: PathBuf,
    /// Traineddata language code for the dominant script.
    pub language: String,
    pub timeout: Duration,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Runs one recognition engine process per call.
///
/// The process is killed if the call times out or its future is dropped, so
/// nothing outlives the extraction.
#[derive(Debug, Clone, Default)]
pub struct OcrExtractor {
    settings: OcrSettings,
}

impl OcrExtractor {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl FileExtractor for OcrExtractor {
    fn format(&self) -> SourceFormat {
        SourceFormat::Image
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| ExtractError::read(SourceFormat::Image, err))?;
        if !metadata.is_file() {
            return Err(ExtractError::read(SourceFormat::Image, "not a regular file"));
        }

        let program = self.settings.program.display().to_string();
        let mut command = Command::new(&self.settings.program);
        command
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.settings.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.settings.timeout, command.output())
            .await
            .map_err(|_| {
                ExtractError::Recognition(format!(
                    "{program} timed out after {:?}",
                    self.settings.timeout
                ))
            })?
            .map_err(|err| ExtractError::Recognition(format!("could not run {program}: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Recognition(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(clean_text(&String::from_utf8_lossy(&output.stdout)))
    }
}
