//! Shared fixtures for integration tests.
//!
//! `FakeVendor` serves a small manifest tree, its payload archives and the
//! archive service from memory, and records every URL requested.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use appstreamer::{Endpoints, HttpClient, Session, StreamerError, StreamerResult};
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use xz2::write::XzEncoder;

pub const DL: &str = "https://dl.test/production";
pub const AR: &str = "https://archive.test";
pub const OS: &str = "os-test";

/// In-memory HTTP client. Unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct FakeClient {
    routes: Mutex<HashMap<String, Vec<u8>>>,
    log: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn serve(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.routes.lock().unwrap().insert(url.into(), body.into());
    }

    pub fn serve_json(&self, url: impl Into<String>, value: &Value) {
        self.serve(url, value.to_string().into_bytes());
    }

    /// Body served for `url`, without recording a request.
    pub fn get_body(&self, url: &str) -> Vec<u8> {
        self.routes.lock().unwrap()[url].clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.starts_with(prefix))
            .count()
    }

    /// Number of payload archive requests, live or archived.
    pub fn payload_requests(&self) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.ends_with(".tar.xz"))
            .count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl HttpClient for FakeClient {
    fn get(&self, url: &str) -> StreamerResult<Vec<u8>> {
        self.log.lock().unwrap().push(url.to_string());
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| StreamerError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub fn session(client: &Arc<FakeClient>) -> Session {
    Session::new(Arc::clone(client) as Arc<dyn HttpClient>, Endpoints::new(DL, AR))
}

pub fn sha1_hex(data: &[u8]) -> String {
    format!("{:x}", Sha1::digest(data))
}

/// Build a `.tar.xz` archive in memory.
pub fn tar_xz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = XzEncoder::new(Vec::new(), 6);
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

pub fn manifest_url(app_id: &str) -> String {
    format!("{}/{}/{}/full.json", DL, OS, app_id)
}

pub fn package_url(checksum: &str) -> String {
    format!("{}/packages/{}.json", DL, checksum)
}

pub fn payload_url(hash: &str) -> String {
    format!("{}/packages/{}.tar.xz", DL, hash)
}

pub fn retrieval_url(ts: &str, url: &str) -> String {
    format!("{}/web/{}id_/{}", AR, ts, url)
}

pub fn save_url(url: &str) -> String {
    format!("{}/save/{}", AR, url)
}

pub fn search_url(url: &str, limit: i64) -> String {
    format!(
        "{}/cdx/search?limit={}&filter=statuscode:200&output=json&url={}",
        AR, limit, url
    )
}

pub fn app_doc(version: &str, packages: &[&str], subs: &[&str]) -> Value {
    json!({
        "build-version": version,
        "patches_build_version": format!("{}.0", version),
        "properties": {
            "display-name": format!("App {}", version),
            "sub-applications": subs
        },
        "packages": packages.iter().map(|c| json!({"checksum": c})).collect::<Vec<_>>()
    })
}

/// Fake vendor and archive service on top of a [`FakeClient`].
pub struct FakeVendor {
    pub client: Arc<FakeClient>,
}

impl FakeVendor {
    pub fn new() -> Self {
        Self {
            client: Arc::new(FakeClient::default()),
        }
    }

    pub fn session(&self) -> Session {
        session(&self.client)
    }

    /// Serve a live application manifest.
    pub fn add_app(&self, app_id: &str, version: &str, packages: &[&str], subs: &[&str]) {
        self.client
            .serve_json(manifest_url(app_id), &app_doc(version, packages, subs));
    }

    /// Serve a package whose payloads are real archives named by their SHA-1.
    ///
    /// Each payload holds one file, `<checksum>-<n>.txt`. Returns the payload hashes.
    pub fn add_package(&self, checksum: &str, destination: &str, payloads: usize) -> Vec<String> {
        let hashes: Vec<String> = (0..payloads)
            .map(|n| {
                let name = format!("{}-{}.txt", checksum, n);
                let body = format!("payload {} of {}", n, checksum);
                let archive = tar_xz(&[(name.as_str(), body.as_bytes())]);
                let hash = sha1_hex(&archive);
                self.client.serve(payload_url(&hash), archive);
                hash
            })
            .collect();

        self.client.serve_json(
            package_url(checksum),
            &json!({
                "properties": {
                    "source-id": checksum,
                    "size": 1024,
                    "destination": destination
                },
                "non-patched": hashes
            }),
        );
        hashes
    }

    /// Serve a package manifest with no payload references.
    pub fn add_vacuous_package(&self, checksum: &str) {
        self.client.serve_json(
            package_url(checksum),
            &json!({"properties": {"source-id": checksum}}),
        );
    }

    /// Serve archive captures of `app_id`, one per `(timestamp, version)`.
    ///
    /// The capture table is served for `limits`, and each capture's manifest
    /// through its retrieval URL.
    pub fn add_history(&self, app_id: &str, captures: &[(&str, &str)], limits: &[i64]) {
        let url = manifest_url(app_id);
        let mut table = vec![json!(["urlkey", "timestamp", "original", "statuscode"])];
        for (ts, version) in captures {
            table.push(json!(["key", ts, url, "200"]));
            self.client
                .serve_json(retrieval_url(ts, &url), &app_doc(version, &[], &[]));
        }
        for limit in limits {
            self.client
                .serve_json(search_url(&url, *limit), &Value::Array(table.clone()));
        }
    }
}
