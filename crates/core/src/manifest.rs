//! `fonts-manifest.json`, listing the fonts of a build.

use std::{fs::write, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "fonts-manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontManifest {
    pub family_name: String,
    pub version: String,
    pub fonts: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub style: String,
    pub display_name: String,
    pub filename: String,
}

impl FontManifest {
    pub fn new(family_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { family_name: family_name.into(), version: version.into(), fonts: Vec::new() }
    }

    /// Write the manifest into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        write(&path, json + "\n")
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_write_manifest() {
        let dir = tempdir().unwrap();
        let mut manifest = FontManifest::new("Twincell Mono", "1.0");
        manifest.fonts.push(ManifestEntry {
            style: "MediumItalic".into(),
            display_name: "Medium Italic".into(),
            filename: "TwincellMono-MediumItalic.ttf".into(),
        });

        let path = manifest.write_to(dir.path()).unwrap();
        let text = read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["family_name"], "Twincell Mono");
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["fonts"][0]["display_name"], "Medium Italic");
        assert_eq!(json["fonts"][0]["filename"], "TwincellMono-MediumItalic.ttf");
        assert_eq!(serde_json::from_str::<FontManifest>(&text).unwrap(), manifest);
    }
}
