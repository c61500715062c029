use std::fs;

use ingest_engine::{
    export_site, page_filename, ExportDir, ExportError, PageFailure, PageRecord, PersistError,
    SiteIngest, MANIFEST_FILENAME,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn record(url: &str, title: &str) -> PageRecord {
    let toc = "Table of Contents\n. ".to_string();
    let text = format!("{toc}\nbody of {title}");
    PageRecord {
        url: url.to_string(),
        title: title.to_string(),
        hostname: "docs.example.com".to_string(),
        path: url.trim_start_matches("https://docs.example.com").to_string(),
        data: format!("URL: {url}\nTitle: {title}\nExtracted Data: {text}"),
        toc,
        text,
    }
}

#[test]
fn opening_creates_missing_output_dirs() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("site");
    assert!(!new_dir.exists());
    let dir = ExportDir::open(&new_dir).unwrap();
    assert!(new_dir.is_dir());
    assert_eq!(dir.root(), new_dir.as_path());
}

#[test]
fn writing_a_document_replaces_the_previous_one() {
    let temp = TempDir::new().unwrap();
    let dir = ExportDir::open(temp.path()).unwrap();

    let first = dir.write_document("page.txt", "hello").unwrap();
    assert_eq!(first, temp.path().join("page.txt"));
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = dir.write_document("page.txt", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = ExportDir::open(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory { path } if path == file_path));
}

#[test]
fn document_names_cannot_leave_the_directory() {
    let temp = TempDir::new().unwrap();
    let dir = ExportDir::open(temp.path().join("out")).unwrap();

    for name in ["../escape.txt", "nested/page.txt", "", "/abs.txt"] {
        let err = dir.write_document(name, "data").unwrap_err();
        assert!(matches!(err, PersistError::InvalidName { .. }), "{name}: {err}");
    }
    assert!(!temp.path().join("escape.txt").exists());
}

#[test]
fn export_into_a_file_path_fails_before_writing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("export");
    fs::write(&file_path, "x").unwrap();
    let ingest = SiteIngest {
        pages: vec![record("https://docs.example.com/intro", "Intro")],
        failures: Vec::new(),
    };

    let err = export_site(&file_path, "https://docs.example.com/", &ingest).unwrap_err();
    assert!(matches!(
        err,
        ExportError::Persist(PersistError::NotADirectory { .. })
    ));
}

#[test]
fn export_writes_pages_and_manifest() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("export");
    let ingest = SiteIngest {
        pages: vec![
            record("https://docs.example.com/intro", "Intro"),
            record("https://docs.example.com/setup", "Setup"),
        ],
        failures: vec![PageFailure {
            url: "https://docs.example.com/gone".to_string(),
            reason: "Failed to fetch the URL: http status 404: Not Found".to_string(),
        }],
    };

    let summary = export_site(&out, "https://docs.example.com/sitemap.xml", &ingest).unwrap();

    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.manifest_path, out.join(MANIFEST_FILENAME));
    assert_eq!(
        summary.page_paths,
        vec![
            out.join(page_filename("https://docs.example.com/intro")),
            out.join(page_filename("https://docs.example.com/setup")),
        ]
    );
    assert_eq!(
        fs::read_to_string(&summary.page_paths[0]).unwrap(),
        ingest.pages[0].data
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["seed"], "https://docs.example.com/sitemap.xml");
    assert_eq!(manifest["page_count"], 2);
    assert_eq!(manifest["failure_count"], 1);
    assert_eq!(manifest["pages"][1]["title"], "Setup");
    assert_eq!(
        manifest["pages"][1]["filename"],
        page_filename("https://docs.example.com/setup").as_str()
    );
    assert_eq!(
        manifest["pages"][0]["chars"],
        ingest.pages[0].data.chars().count()
    );
    assert_eq!(manifest["failures"][0]["url"], "https://docs.example.com/gone");
}
