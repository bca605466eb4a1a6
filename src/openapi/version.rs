//! OpenAPI version detection
//!
//! Maps a document's declared `openapi` version onto one of the versions a
//! validator schema is available for.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LensError, Result};

/// Declared version and the validator version chosen for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedVersion {
    pub version: String,
    pub schema_version: String,
}

/// Display-oriented version summary; never an error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    pub schema_version: Option<String>,
    pub is_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub available_versions: Vec<String>,
}

/// Available versions, highest first (unparseable entries dropped)
fn sorted_available(available: &[String]) -> Vec<Version> {
    let mut versions: Vec<Version> = available.iter().filter_map(|v| Version::parse(v).ok()).collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
}

/// Exact match, else the highest available version with the same major and
/// a minor no greater than requested
pub fn find_best_match(requested: &Version, available: &[String]) -> Option<String> {
    let candidates = sorted_available(available);

    if let Some(exact) = candidates.iter().find(|v| *v == requested) {
        return Some(exact.to_string());
    }

    candidates
        .into_iter()
        .find(|v| v.major == requested.major && v.minor <= requested.minor)
        .map(|v| v.to_string())
}

/// Detect the validator version for an OpenAPI 3.x document
pub fn detect_version(spec: &Value, available: &[String]) -> Result<DetectedVersion> {
    let declared = spec.get("openapi").and_then(Value::as_str).ok_or(LensError::MissingVersion)?;

    let version = Version::parse(declared)
        .ok()
        .filter(|v| v.pre.is_empty() && v.build.is_empty())
        .ok_or_else(|| LensError::InvalidVersion(declared.to_string()))?;

    let schema_version = find_best_match(&version, available).ok_or_else(|| LensError::UnsupportedVersion {
        version: declared.to_string(),
        available: sorted_available(available)
            .iter()
            .map(Version::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    Ok(DetectedVersion {
        version: declared.to_string(),
        schema_version,
    })
}

/// Non-failing variant of [`detect_version`]
pub fn version_info(spec: &Value, available: &[String]) -> VersionInfo {
    let available_versions: Vec<String> = sorted_available(available).iter().map(Version::to_string).collect();

    match detect_version(spec, available) {
        Ok(detected) => VersionInfo {
            version: detected.version,
            schema_version: Some(detected.schema_version),
            is_supported: true,
            error: None,
            available_versions,
        },
        Err(e) => VersionInfo {
            version: spec
                .get("openapi")
                .or_else(|| spec.get("swagger"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            schema_version: None,
            is_supported: false,
            error: Some(e.to_string()),
            available_versions,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn available() -> Vec<String> {
        vec!["3.0.3".into(), "3.1.0".into(), "3.2.0".into()]
    }

    #[test]
    fn test_exact_and_nearest_match() {
        let exact = detect_version(&json!({ "openapi": "3.1.0" }), &available()).unwrap();
        assert_eq!(exact.schema_version, "3.1.0");

        let patch = detect_version(&json!({ "openapi": "3.1.1" }), &available()).unwrap();
        assert_eq!(patch.schema_version, "3.1.0");

        let newer_minor = detect_version(&json!({ "openapi": "3.4.0" }), &available()).unwrap();
        assert_eq!(newer_minor.schema_version, "3.2.0");

        let older = detect_version(&json!({ "openapi": "3.0.0" }), &available()).unwrap();
        assert_eq!(older.schema_version, "3.0.3");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(detect_version(&json!({ "swagger": "2.0" }), &available()), Err(LensError::MissingVersion)));
        assert!(matches!(detect_version(&json!({ "openapi": "3.1" }), &available()), Err(LensError::InvalidVersion(_))));
        assert!(matches!(
            detect_version(&json!({ "openapi": "4.0.0" }), &available()),
            Err(LensError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_version_info_never_fails() {
        let info = version_info(&json!({ "swagger": "2.0" }), &available());
        assert!(!info.is_supported);
        assert_eq!(info.version, "2.0");
        assert_eq!(info.available_versions, vec!["3.2.0", "3.1.0", "3.0.3"]);
        assert!(info.error.unwrap().contains("missing"));
    }
}
