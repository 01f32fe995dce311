//! Integration tests for resolving and materializing an application tree.
//!
//! These tests drive `ApplicationNode` end to end against an in-memory
//! vendor serving real `.tar.xz` payloads named by their SHA-1:
//! - population happens once per collection
//! - vacuous packages leave the filesystem untouched
//! - recursive download and extraction cover the whole tree
//!
//! Run with: `cargo test --test tree_integration`

mod common;

use std::fs;
use std::path::Path;

use appstreamer::ApplicationNode;
use tempfile::TempDir;

use common::*;

fn payload_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tar.xz"))
        .collect();
    names.sort();
    names
}

fn subdirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_populate_packages_twice_issues_no_new_requests() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["p1", "p2", "p3"], &[]);
    vendor.add_package("p1", "bin", 1);
    vendor.add_package("p2", "lib", 2);
    vendor.add_vacuous_package("p3");

    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();
    assert_eq!(app.populate_packages().unwrap().len(), 3);

    vendor.client.clear();
    assert_eq!(app.populate_packages().unwrap().len(), 3);
    assert!(vendor.client.requests().is_empty());
}

#[test]
fn test_package_info_reflects_manifests() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["p1", "p2"], &[]);
    vendor.add_package("p1", "bin", 1);
    vendor.add_vacuous_package("p2");

    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();
    let infos = app.packages_info().unwrap();

    assert_eq!(infos[0].source_id, "p1");
    assert_eq!(infos[0].size, Some(1024));
    assert_eq!(infos[0].destination, "bin");
    assert_eq!(infos[0].config_source, "Unknown");

    assert_eq!(infos[1].size, None);
    assert_eq!(infos[1].destination, "Unknown");
}

#[test]
fn test_sub_applications_info_in_declaration_order() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &[], &["zeta", "alpha"]);
    vendor.add_app("zeta", "2.0", &[], &[]);
    vendor.add_app("alpha", "3.0", &[], &[]);

    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();
    let subs = app.sub_applications_info().unwrap();

    let ids: Vec<&str> = subs.iter().map(|s| s.app_id.as_str()).collect();
    assert_eq!(ids, vec!["zeta", "alpha"]);
    assert_eq!(subs[1].build_version, "3.0");
}

// ============================================================================
// Vacuous packages
// ============================================================================

#[test]
fn test_vacuous_package_download_and_extract_create_nothing() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["empty"], &[]);
    vendor.add_vacuous_package("empty");

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();

    let summary = app.download(&out, false).unwrap();
    assert_eq!(summary.downloaded, 0);
    assert_eq!(app.extract(&out, false).unwrap(), 0);

    assert!(!out.exists());
    assert_eq!(vendor.client.payload_requests(), 0);
}

// ============================================================================
// Recursive materialization
// ============================================================================

#[test]
fn test_recursive_download_and_extract_cover_every_node() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["r1", "r2"], &["sub-a", "sub-b"]);
    vendor.add_app("sub-a", "1.1", &["a1", "a2"], &[]);
    vendor.add_app("sub-b", "1.2", &["b1", "b2"], &[]);
    for (checksum, destination) in [
        ("r1", "root/bin"),
        ("r2", "root/lib"),
        ("a1", "sub-a"),
        ("a2", "sub-a/data"),
        ("b1", "sub-b"),
        ("b2", "sub-b"),
    ] {
        vendor.add_package(checksum, destination, 1);
    }

    let temp = TempDir::new().unwrap();
    let out = temp.path().join("data");
    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();

    let summary = app.download(&out, true).unwrap();
    assert_eq!(summary.downloaded, 6);
    assert_eq!(summary.skipped, 0);
    assert_eq!(payload_files(&out).len(), 6);
    assert_eq!(vendor.client.payload_requests(), 6);

    let entries = app.extract(&out, true).unwrap();
    assert_eq!(entries, 6);

    let extracted = out.join("extracted");
    assert_eq!(subdirs(&extracted), vec!["root", "sub-a", "sub-b"]);
    assert_eq!(
        fs::read_to_string(extracted.join("root/bin/r1-0.txt")).unwrap(),
        "payload 0 of r1"
    );
    assert!(extracted.join("sub-a/data/a2-0.txt").is_file());
    assert!(extracted.join("sub-b/b2-0.txt").is_file());
}

#[test]
fn test_download_without_recurse_stays_on_root() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["r1"], &["sub-a"]);
    vendor.add_app("sub-a", "1.1", &["a1"], &[]);
    vendor.add_package("r1", "root", 1);
    vendor.add_package("a1", "sub-a", 1);

    let temp = TempDir::new().unwrap();
    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();
    let summary = app.download(temp.path(), false).unwrap();

    assert_eq!(summary.downloaded, 1);
    assert_eq!(vendor.client.count(&manifest_url("sub-a")), 0);
    assert!(app.sub_applications().is_none());
}

#[test]
fn test_cyclic_sub_application_is_visited_once() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "1.0", &["r1"], &["child"]);
    vendor.add_app("child", "1.1", &["c1"], &["root"]);
    vendor.add_package("r1", "root", 1);
    vendor.add_package("c1", "child", 1);

    let temp = TempDir::new().unwrap();
    let mut app = ApplicationNode::new(vendor.session(), "root", OS).unwrap();
    let summary = app.download(temp.path(), true).unwrap();

    assert_eq!(summary.downloaded, 2);
    assert_eq!(payload_files(temp.path()).len(), 2);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshot_tree_is_fetched_through_the_archive() {
    let vendor = FakeVendor::new();
    let ts = "20210304050607";
    let archive = tar_xz(&[("old.txt", &b"old build"[..])]);
    let hash = sha1_hex(&archive);

    vendor.client.serve_json(
        retrieval_url(ts, &manifest_url("root")),
        &app_doc("0.9", &["p1"], &["child"]),
    );
    vendor.client.serve_json(
        retrieval_url(ts, &manifest_url("child")),
        &app_doc("0.9.1", &[], &[]),
    );
    vendor.client.serve_json(
        retrieval_url(ts, &package_url("p1")),
        &serde_json::json!({"properties": {"destination": "old"}, "non-patched": [hash]}),
    );
    vendor
        .client
        .serve(retrieval_url(ts, &payload_url(&hash)), archive);

    let temp = TempDir::new().unwrap();
    let mut app = ApplicationNode::at_snapshot(vendor.session(), "root", OS, ts).unwrap();
    assert_eq!(app.build_version(), "0.9");

    app.download(temp.path(), true).unwrap();
    app.extract(temp.path(), true).unwrap();

    let children = app.sub_applications().unwrap();
    assert_eq!(children[0].snapshot_timestamp(), Some(ts));
    assert_eq!(
        fs::read_to_string(temp.path().join("extracted/old/old.txt")).unwrap(),
        "old build"
    );
    assert_eq!(vendor.client.count_prefix(DL), 0);
}

#[test]
fn test_at_build_version_finds_archived_capture() {
    let vendor = FakeVendor::new();
    vendor.add_app("root", "3.0", &[], &[]);
    vendor.add_history(
        "root",
        &[("20200101000000", "1.0"), ("20200601000000", "2.0")],
        &[20],
    );

    let app =
        ApplicationNode::at_build_version(vendor.session(), "root", OS, "2.0", 20).unwrap();
    assert_eq!(app.build_version(), "2.0");
    assert_eq!(app.snapshot_timestamp(), Some("20200601000000"));

    let live =
        ApplicationNode::at_build_version(vendor.session(), "root", OS, "3.0", 20).unwrap();
    assert!(live.snapshot_timestamp().is_none());

    let missing = ApplicationNode::at_build_version(vendor.session(), "root", OS, "9.9", 20);
    assert!(matches!(
        missing,
        Err(appstreamer::StreamerError::VersionNotFound { .. })
    ));
}
