use std::path::{Path, PathBuf};

use ingest_logging::ingest_info;
use serde::Serialize;

use crate::filename::page_filename;
use crate::persist::{ExportDir, PersistError};
use crate::SiteIngest;

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub page_count: usize,
    pub failure_count: usize,
    pub page_paths: Vec<PathBuf>,
    pub manifest_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Manifest<'a> {
    seed: &'a str,
    page_count: usize,
    failure_count: usize,
    pages: Vec<ManifestPage<'a>>,
    failures: Vec<ManifestFailure<'a>>,
}

#[derive(Serialize)]
struct ManifestPage<'a> {
    url: &'a str,
    title: &'a str,
    filename: String,
    chars: usize,
}

#[derive(Serialize)]
struct ManifestFailure<'a> {
    url: &'a str,
    reason: &'a str,
}

/// Write one text document per page plus a `manifest.json` describing the run.
pub fn export_site(
    output_dir: &Path,
    seed: &str,
    ingest: &SiteIngest,
) -> Result<ExportSummary, ExportError> {
    let dir = ExportDir::open(output_dir)?;

    let mut page_paths = Vec::with_capacity(ingest.pages.len());
    let mut pages = Vec::with_capacity(ingest.pages.len());
    for page in &ingest.pages {
        let filename = page_filename(&page.url);
        page_paths.push(dir.write_document(&filename, &page.data)?);
        pages.push(ManifestPage {
            url: &page.url,
            title: &page.title,
            filename,
            chars: page.data.chars().count(),
        });
    }

    let manifest = Manifest {
        seed,
        page_count: ingest.pages.len(),
        failure_count: ingest.failures.len(),
        pages,
        failures: ingest
            .failures
            .iter()
            .map(|f| ManifestFailure {
                url: &f.url,
                reason: &f.reason,
            })
            .collect(),
    };
    let manifest_path =
        dir.write_document(MANIFEST_FILENAME, &serde_json::to_string_pretty(&manifest)?)?;

    ingest_info!(
        "exported {} pages ({} failures) to {:?}",
        ingest.pages.len(),
        ingest.failures.len(),
        dir.root()
    );
    Ok(ExportSummary {
        page_count: ingest.pages.len(),
        failure_count: ingest.failures.len(),
        page_paths,
        manifest_path,
    })
}
