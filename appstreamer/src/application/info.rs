//! Read-only projection of an application manifest.

use std::fmt;

use crate::manifest::Manifest;

/// Manifest fields of one application node, without network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub app_id: String,
    pub os_id: String,
    pub display_name: String,
    pub required_os: Option<String>,
    pub build_version: String,
    pub major_update_version: Option<String>,
    pub patches_build_version: String,
    /// Declared sub-application ids, `None` when the manifest has no such field.
    pub sub_applications: Option<Vec<String>>,
}

impl ApplicationInfo {
    pub fn from_manifest(app_id: &str, os_id: &str, manifest: &Manifest) -> Self {
        Self {
            app_id: app_id.to_string(),
            os_id: os_id.to_string(),
            display_name: manifest.properties.display_name.clone(),
            required_os: manifest
                .properties
                .required_os
                .as_ref()
                .map(|os| os.friendly_version.clone()),
            build_version: manifest.build_version.clone(),
            major_update_version: manifest.major_update_version.clone(),
            patches_build_version: manifest.patches_build_version.clone(),
            sub_applications: manifest.properties.sub_applications.clone(),
        }
    }
}

impl fmt::Display for ApplicationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application: {} ({})", self.app_id, self.os_id)?;
        writeln!(f, "\tDisplay name: {}", self.display_name)?;
        if let Some(os) = &self.required_os {
            writeln!(f, "\tRequired OS: {}", os)?;
        }
        writeln!(f, "\tBuild version: {}", self.build_version)?;
        if let Some(major) = &self.major_update_version {
            writeln!(f, "\tMajor update version: {}", major)?;
        }
        write!(f, "\tPatches build version: {}", self.patches_build_version)?;
        if let Some(ids) = &self.sub_applications {
            write!(f, "\n\tSub-applications: {}", ids.join(", "))?;
        }
        Ok(())
    }
}
