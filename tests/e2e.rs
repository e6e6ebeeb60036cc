//! End-to-end tests that run a real external converter.
//!
//! The `markitdown` tests need the tool on `PATH` and are gated behind the
//! `E2E_ENABLED` environment variable so they do not run in CI unless
//! explicitly requested. The `cat` tests only need a Unix userland.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use mdbatch::{
    build_archive, convert_directory, convert_directory_to_dir, CommandConverter,
    ConversionConfig, FileError, MdBatchError, ERRORS_ENTRY_NAME,
};
use std::io::Cursor;
use std::path::Path;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set and `markitdown` can be spawned.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if std::process::Command::new("markitdown")
            .arg("--help")
            .output()
            .is_err()
        {
            println!("SKIP: markitdown not found on PATH");
            println!("      Run: pip install 'markitdown[all]'");
            return;
        }
    }};
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn zip_names(bytes: Vec<u8>) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

fn cat_config() -> ConversionConfig {
    ConversionConfig::builder()
        .converter_program("cat")
        .build()
        .expect("valid config")
}

// ── Shell converter (no markitdown needed) ───────────────────────────────────

#[cfg(unix)]
#[test]
fn cat_converter_writes_one_file_per_input() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(input.path(), "a.txt", "alpha\n");
    write(input.path(), "sub/a.csv", "x,y\n1,2\n");
    write(input.path(), "b.html", "<p>beta</p>\n");

    let config = cat_config();
    let converter = CommandConverter::from_config(&config);
    let out_dir = output.path().join("converted");

    let result = tokio_test::block_on(convert_directory_to_dir(
        input.path(),
        &out_dir,
        &converter,
        &config,
    ))
    .expect("conversion should succeed");

    assert_eq!(result.stats.total_files, 3);
    assert_eq!(result.stats.converted_files, 3);

    let mut written: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["a-2.md", "a.md", "b.md"]);
    assert_eq!(
        std::fs::read_to_string(out_dir.join("b.md")).unwrap(),
        "<p>beta</p>\n"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn failing_converter_is_recorded_in_the_archive() {
    let input = tempfile::tempdir().unwrap();
    write(input.path(), "good.txt", "fine\n");
    write(input.path(), "bad.txt", "ignored\n");

    // Fails for bad.txt, echoes the file otherwise.
    let config = ConversionConfig::builder()
        .converter_program("sh")
        .converter_args(vec![
            "-c".to_string(),
            r#"case "$1" in */bad.txt) echo "cannot parse $1" >&2; exit 1;; *) cat "$1";; esac"#
                .to_string(),
            "sh".to_string(),
        ])
        .build()
        .unwrap();
    let converter = CommandConverter::from_config(&config);

    let output = convert_directory(input.path(), &converter, &config)
        .await
        .unwrap();
    assert_eq!(output.stats.converted_files, 1);
    assert_eq!(output.stats.failed_files, 1);

    let failure = output.failures().next().unwrap();
    match failure.error.as_ref().unwrap() {
        FileError::ConverterFailed { stderr, .. } => {
            assert!(stderr.contains("cannot parse"), "stderr: {stderr}")
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let bytes = build_archive(&output.results).unwrap().unwrap();
    assert_eq!(zip_names(bytes), vec![ERRORS_ENTRY_NAME, "good.md"]);
}

#[tokio::test]
async fn missing_input_directory_is_an_input_error() {
    let output = tempfile::tempdir().unwrap();
    let config = ConversionConfig::default();
    let converter = CommandConverter::from_config(&config);

    let err = convert_directory_to_dir(
        "/definitely/not/a/real/folder",
        output.path(),
        &converter,
        &config,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MdBatchError::DirectoryNotFound { .. }));
    assert!(err.is_input_error());
}

// ── markitdown (needs E2E_ENABLED) ───────────────────────────────────────────

#[tokio::test]
async fn markitdown_converts_html_and_csv() {
    e2e_skip_unless_ready!();

    let input = tempfile::tempdir().unwrap();
    write(
        input.path(),
        "page.html",
        "<html><body><h1>Quarterly report</h1><p>Revenue grew.</p></body></html>",
    );
    write(input.path(), "table.csv", "region,revenue\nnorth,10\nsouth,20\n");

    let config = ConversionConfig::default();
    let converter = CommandConverter::from_config(&config);
    let output = convert_directory(input.path(), &converter, &config)
        .await
        .expect("scan should succeed");

    assert_eq!(output.stats.failed_files, 0, "failures: {:?}", output.results);
    for result in output.successes() {
        let md = &result.markdown;
        assert!(!md.trim().is_empty(), "[{}] Markdown is empty", result.name);
        println!("[{}] ✓  {} bytes", result.name, md.len());
    }

    let page = output
        .successes()
        .find(|r| r.name == "page.html")
        .map(|r| r.markdown.clone())
        .unwrap();
    assert!(
        page.lines().any(|l| l.starts_with('#')),
        "Expected at least one heading (#)"
    );

    let bytes = build_archive(&output.results).unwrap().unwrap();
    assert_eq!(zip_names(bytes), vec!["page.md", "table.md"]);
}

#[tokio::test]
async fn markitdown_failure_does_not_stop_the_batch() {
    e2e_skip_unless_ready!();

    let input = tempfile::tempdir().unwrap();
    write(input.path(), "ok.html", "<h2>Fine</h2>");
    // Claims to be a workbook but is plain text.
    write(input.path(), "broken.xlsx", "this is not a spreadsheet");

    let config = ConversionConfig::default();
    let converter = CommandConverter::from_config(&config);
    let output = convert_directory(input.path(), &converter, &config)
        .await
        .unwrap();

    assert_eq!(output.stats.total_files, 2);
    assert_eq!(output.stats.converted_files, 1);
    assert_eq!(output.stats.failed_files, 1);
    assert_eq!(output.failures().next().unwrap().name, "broken.xlsx");
}
