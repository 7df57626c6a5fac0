//! End-to-end runs over the real backends: a local HTTP object server and a
//! directory tree. Checks on-disk layout, classification and the report.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pullsum_core::checksum::{md5_hex, md5_path};
use pullsum_core::report::{self, ResultSummary};
use pullsum_core::retry::RetryPolicy;
use pullsum_core::store::{HttpStore, LocalStore, ObjectStore};
use pullsum_core::{Catalog, RunOptions, TransferEngine, VerifyResult, VerifyStatus};
use tempfile::tempdir;

fn status_of<'a>(results: &'a [VerifyResult], key: &str) -> &'a VerifyResult {
    results
        .iter()
        .find(|r| r.relative_key == key)
        .unwrap_or_else(|| panic!("no result for {}", key))
}

fn fast_retry() -> RunOptions {
    RunOptions {
        concurrency: 2,
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
        progress_capacity: 16,
    }
}

#[tokio::test]
async fn http_run_classifies_every_file() {
    let good: Vec<u8> = (0u8..=250).cycle().take(300 * 1024).collect();
    let bad = b"tampered".to_vec();
    let extra = b"not in any manifest".to_vec();
    let manifest = format!(
        "# generated\n{}  good.bin\nMD5 (a/bad.bin) = {}\n",
        md5_hex(&good),
        md5_hex(b"original")
    );
    let url = common::object_server::ObjectServer::new()
        .object("bucket/PROJ/md5sum.txt", manifest.clone())
        .object("bucket/PROJ/a/good.bin", good.clone())
        .object("bucket/PROJ/a/bad.bin", bad.clone())
        .object("bucket/PROJ/extra.dat", extra.clone())
        .fail("bucket/PROJ/flaky.bin", 503)
        .start();

    let catalog = Catalog::from_keys(
        "PROJ",
        [
            ("PROJ/md5sum.txt", manifest.len() as u64),
            ("PROJ/a/good.bin", good.len() as u64),
            ("PROJ/a/bad.bin", bad.len() as u64),
            ("PROJ/extra.dat", extra.len() as u64),
            ("PROJ/gone.bin", 10),
            ("PROJ/flaky.bin", 10),
        ],
    );
    let store: Arc<dyn ObjectStore> = Arc::new(HttpStore::new(&url).unwrap());
    let dest = tempdir().unwrap();
    let engine = TransferEngine::new(store, fast_retry());

    let results = engine.run("bucket", &catalog, dest.path(), None).await.unwrap();
    assert_eq!(results.len(), 5);

    let good_r = status_of(&results, "a/good.bin");
    assert_eq!(good_r.status, VerifyStatus::Match);
    assert_eq!(good_r.computed_digest.as_deref(), Some(md5_hex(&good).as_str()));
    assert_eq!(std::fs::read(dest.path().join("a/good.bin")).unwrap(), good);

    let bad_r = status_of(&results, "a/bad.bin");
    assert_eq!(bad_r.status, VerifyStatus::Mismatch);
    assert_eq!(bad_r.expected_digest.as_deref(), Some(md5_hex(b"original").as_str()));

    assert_eq!(status_of(&results, "extra.dat").status, VerifyStatus::NoManifest);

    let gone = status_of(&results, "gone.bin");
    assert_eq!(gone.status, VerifyStatus::Error);
    assert!(gone.error.as_deref().unwrap().contains("404"));
    assert!(!dest.path().join("gone.bin").exists());

    let flaky = status_of(&results, "flaky.bin");
    assert_eq!(flaky.status, VerifyStatus::Error);
    assert!(flaky.error.as_deref().unwrap().contains("503"));

    // Manifests are read, never written to the destination.
    assert!(!dest.path().join("md5sum.txt").exists());

    let report_path = report::default_report_path(dest.path());
    report::save(&report_path, &results).unwrap();
    let loaded = report::load(&report_path).unwrap();
    let summary = ResultSummary::from_results(&loaded);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.mismatched, 1);
    assert_eq!(summary.no_manifest, 1);
    assert_eq!(summary.errors, 2);
}

#[tokio::test]
async fn local_store_mirror_and_verify() {
    let src = tempdir().unwrap();
    let project = src.path().join("bucket/PROJ");
    std::fs::create_dir_all(project.join("lane1")).unwrap();
    std::fs::write(project.join("lane1/r1.fq"), b"@read1\nACGT\n+\nIIII\n").unwrap();
    std::fs::write(project.join("lane1/r2.fq"), b"@read2\nTTGA\n+\nIIII\n").unwrap();
    std::fs::write(project.join("empty.bin"), b"").unwrap();
    std::fs::write(
        project.join("checksums.md5"),
        format!(
            "{}  lane1/r1.fq\n{} *r2.fq\nd41d8cd98f00b204e9800998ecf8427e  empty.bin\n",
            md5_hex(b"@read1\nACGT\n+\nIIII\n"),
            md5_hex(b"@read2\nTTGA\n+\nIIII\n").to_uppercase()
        ),
    )
    .unwrap();

    let catalog = Catalog::from_keys(
        "PROJ",
        [
            ("PROJ/checksums.md5", 0),
            ("PROJ/lane1/", 0),
            ("PROJ/lane1/r1.fq", 19),
            ("PROJ/lane1/r2.fq", 19),
            ("PROJ/empty.bin", 0),
        ],
    );
    let store = LocalStore::open(src.path()).unwrap().with_chunk_size(5);
    let dest = tempdir().unwrap();
    let engine = TransferEngine::new(Arc::new(store), RunOptions::default());

    let results = engine.run("bucket", &catalog, dest.path(), None).await.unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.status == VerifyStatus::Match), "{:?}", results);

    let copied = dest.path().join("lane1/r2.fq");
    assert_eq!(md5_path(&copied).unwrap(), md5_hex(b"@read2\nTTGA\n+\nIIII\n"));
    assert_eq!(std::fs::metadata(dest.path().join("empty.bin")).unwrap().len(), 0);
}
