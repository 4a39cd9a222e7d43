//! Batch processing tests: worker pool, outcome records, atomic output.

mod common;

use std::path::PathBuf;

use common::{build_pdf, intro_conclusion_pdf};
use pdfstruct::{BatchOptions, BatchProcessor, JsonFormat, OutcomeStatus, ParseOptions};

fn write_fixture(dir: &std::path::Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn batch_writes_one_json_per_input_named_by_stem() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let inputs = vec![
        write_fixture(dir.path(), "alpha.pdf", &intro_conclusion_pdf()),
        write_fixture(
            dir.path(),
            "beta.pdf",
            &build_pdf(&[vec![("Beta body text only.", 72.0, 700.0, 12.0)]]),
        ),
    ];

    let processor = BatchProcessor::new(BatchOptions::new());
    let summary = processor.run(&inputs, &out).unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 0);
    assert!(out.join("alpha.json").is_file());
    assert!(out.join("beta.json").is_file());

    // No stray temp files survive the atomic rename.
    let stray: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x != "json").unwrap_or(true))
        .collect();
    assert!(stray.is_empty(), "unexpected files: {:?}", stray);
}

#[test]
fn batch_output_is_valid_canonical_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let inputs = vec![write_fixture(
        dir.path(),
        "paper.pdf",
        &intro_conclusion_pdf(),
    )];

    let processor = BatchProcessor::new(BatchOptions::new().with_format(JsonFormat::Compact));
    processor.run(&inputs, &out).unwrap();

    let json = std::fs::read_to_string(out.join("paper.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Title falls back to the file stem when the Info dictionary has none.
    assert_eq!(value["title"], "paper");
    assert_eq!(value["page_count"], 3);
    assert_eq!(value["sections"].as_array().unwrap().len(), 2);
    assert_eq!(value["sections"][0]["heading"], "Introduction");
}

#[test]
fn bad_document_fails_without_poisoning_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let inputs = vec![
        write_fixture(dir.path(), "good.pdf", &intro_conclusion_pdf()),
        write_fixture(dir.path(), "bad.pdf", b"not a pdf at all"),
    ];

    let processor = BatchProcessor::new(BatchOptions::new());
    let summary = processor.run(&inputs, &out).unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 1);
    assert!(out.join("good.json").is_file());
    assert!(!out.join("bad.json").exists());

    // Outcomes stay in input order regardless of completion order.
    assert!(summary.outcomes[0].is_success());
    match &summary.outcomes[1].status {
        OutcomeStatus::Failed { error } => assert!(!error.is_empty()),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[test]
fn skipped_pages_surface_in_the_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let inputs = vec![write_fixture(
        dir.path(),
        "gappy.pdf",
        &intro_conclusion_pdf(),
    )];

    let processor = BatchProcessor::new(BatchOptions::new());
    let summary = processor.run(&inputs, &out).unwrap();

    assert_eq!(summary.outcomes[0].skipped_pages, vec![2]);
}

#[test]
fn bounded_worker_pool_processes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let inputs: Vec<PathBuf> = (0..6)
        .map(|i| {
            write_fixture(
                dir.path(),
                &format!("doc-{}.pdf", i),
                &build_pdf(&[vec![("Some body text for this doc.", 72.0, 700.0, 12.0)]]),
            )
        })
        .collect();

    let processor = BatchProcessor::new(BatchOptions::new().with_jobs(2));
    let summary = processor.run(&inputs, &out).unwrap();

    assert_eq!(summary.succeeded(), 6);
    for i in 0..6 {
        assert!(out.join(format!("doc-{}.json", i)).is_file());
    }
}

#[test]
fn generous_timeout_does_not_fail_fast_documents() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let inputs = vec![write_fixture(
        dir.path(),
        "quick.pdf",
        &intro_conclusion_pdf(),
    )];

    let options = BatchOptions::new().with_parse_options(
        ParseOptions::new().with_timeout(std::time::Duration::from_secs(60)),
    );
    let summary = BatchProcessor::new(options).run(&inputs, &out).unwrap();

    assert_eq!(summary.succeeded(), 1);
}
