use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FlowError, Result};

pub const PACKAGE_FILE: &str = "package.json";
pub const COMPONENT_FILE: &str = ".componentrc";

/// `package.json`, kept as an order-preserving JSON object so rewrites only
/// touch the fields we change.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl PackageManifest {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(PACKAGE_FILE);
        if !path.exists() {
            return Err(FlowError::manifest(&path, "package.json not found"));
        }

        let content = std::fs::read_to_string(&path)?;
        let doc = match serde_json::from_str::<Value>(&content)? {
            Value::Object(doc) => doc,
            _ => return Err(FlowError::manifest(&path, "expected a JSON object")),
        };

        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.doc.get("version").and_then(Value::as_str)
    }

    /// Entries of the `files` array, the set npm will publish
    pub fn files(&self) -> Vec<&str> {
        self.doc
            .get("files")
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn set_version(&mut self, version: &str) {
        self.doc
            .insert("version".to_string(), Value::String(version.to_string()));
    }

    /// Write back with two-space indentation and a trailing newline
    pub fn save(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.doc)?;
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Presence of `.componentrc` marks the project as a publishable component
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    pub build_path: String,
}

impl ComponentManifest {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Option<Self>> {
        let path = dir.as_ref().join(COMPONENT_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let manifest = serde_json::from_str(&content)
            .map_err(|e| FlowError::manifest(&path, format!("invalid component file: {e}")))?;
        Ok(Some(manifest))
    }
}

/// Flatten scoped package names: `@scope/name` becomes `scope_name`
pub fn normalize_name(name: &str) -> String {
    match name.strip_prefix('@') {
        Some(scoped) if scoped.contains('/') => scoped.split('/').collect::<Vec<_>>().join("_"),
        _ => name.to_string(),
    }
}
