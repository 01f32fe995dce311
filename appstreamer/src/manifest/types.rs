//! Typed manifest documents, decoded once at the HTTP boundary.
//!
//! Fields whose absence is anticipated are `Option`s; everything else is
//! required, so an unexpected shape fails at decode time.

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel shown for package fields the manifest does not carry.
pub const UNKNOWN: &str = "Unknown";

/// Root manifest of one application (`full.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "build-version", deserialize_with = "version_string")]
    pub build_version: String,

    #[serde(
        rename = "major-update-version",
        default,
        deserialize_with = "optional_version_string"
    )]
    pub major_update_version: Option<String>,

    #[serde(deserialize_with = "version_string")]
    pub patches_build_version: String,

    pub properties: ManifestProperties,

    pub packages: Vec<PackageRef>,
}

/// The `properties` object of a root manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestProperties {
    #[serde(rename = "display-name")]
    pub display_name: String,

    #[serde(rename = "required-os", default)]
    pub required_os: Option<RequiredOs>,

    /// Child application ids, in declaration order.
    #[serde(rename = "sub-applications", default)]
    pub sub_applications: Option<Vec<String>>,
}

/// Minimum operating system requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredOs {
    #[serde(rename = "friendly-version")]
    pub friendly_version: String,
}

/// Reference from a root manifest to one package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub checksum: String,
}

/// Manifest of a single package (`packages/<checksum>.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub properties: PackageProperties,

    /// Content hashes of the payload archives. Absent for patch-only packages.
    #[serde(rename = "non-patched", default)]
    pub payload_refs: Option<Vec<String>>,
}

/// The `properties` object of a package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageProperties {
    #[serde(rename = "source-id", default)]
    pub source_id: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default)]
    pub destination: Option<String>,

    #[serde(rename = "_cfg-src", default)]
    pub config_source: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// Build numbers are published both as strings and as bare numbers.
fn version_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn optional_version_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(d).map(|v| v.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_manifest() {
        let doc = json!({
            "build-version": "2.0.1234",
            "major-update-version": "2.0",
            "patches_build_version": "2.0.1234.1",
            "properties": {
                "display-name": "Studio",
                "required-os": {"friendly-version": "10.0"},
                "sub-applications": ["child-a", "child-b"]
            },
            "packages": [{"checksum": "p1"}, {"checksum": "p2"}]
        });

        let manifest: Manifest = serde_json::from_value(doc).unwrap();
        assert_eq!(manifest.build_version, "2.0.1234");
        assert_eq!(manifest.major_update_version.as_deref(), Some("2.0"));
        assert_eq!(manifest.properties.display_name, "Studio");
        assert_eq!(
            manifest.properties.required_os.unwrap().friendly_version,
            "10.0"
        );
        assert_eq!(
            manifest.properties.sub_applications.unwrap(),
            vec!["child-a", "child-b"]
        );
        assert_eq!(manifest.packages.len(), 2);
    }

    #[test]
    fn test_parse_minimal_manifest() {
        let doc = json!({
            "build-version": 17,
            "patches_build_version": "17.0",
            "properties": {"display-name": "Minimal"},
            "packages": []
        });

        let manifest: Manifest = serde_json::from_value(doc).unwrap();
        assert_eq!(manifest.build_version, "17");
        assert!(manifest.major_update_version.is_none());
        assert!(manifest.properties.required_os.is_none());
        assert!(manifest.properties.sub_applications.is_none());
        assert!(manifest.packages.is_empty());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let doc = json!({
            "properties": {"display-name": "Broken"},
            "packages": []
        });
        assert!(serde_json::from_value::<Manifest>(doc).is_err());
    }

    #[test]
    fn test_parse_package_manifest() {
        let doc = json!({
            "properties": {
                "source-id": "core",
                "size": 1024,
                "destination": "bin",
                "_cfg-src": "cfg.xml"
            },
            "non-patched": ["aa", "bb"]
        });

        let pkg: PackageManifest = serde_json::from_value(doc).unwrap();
        assert_eq!(pkg.properties.source_id.as_deref(), Some("core"));
        assert_eq!(pkg.properties.size, Some(1024));
        assert_eq!(pkg.payload_refs.unwrap(), vec!["aa", "bb"]);
    }

    #[test]
    fn test_parse_patch_only_package() {
        let doc = json!({"properties": {}});
        let pkg: PackageManifest = serde_json::from_value(doc).unwrap();
        assert!(pkg.payload_refs.is_none());
        assert_eq!(pkg.properties, PackageProperties::default());
    }
}
