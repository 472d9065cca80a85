//! Resolution of configured styles into buildable variants.

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::config::{BuildConfig, StyleSource};

/// One output font: a style and its pair of source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Style key, e.g. "MediumItalic".
    pub key: String,
    /// Human readable style, e.g. "Medium Italic".
    pub display_name: String,
    pub en_path: PathBuf,
    pub cn_path: PathBuf,
}

/// Display name with a space before "Italic" (e.g., "LightItalic" -> "Light Italic").
/// "Italic" alone stays as "Italic".
pub fn display_name(key: &str) -> String {
    match key.strip_suffix("Italic") {
        Some(base) if !base.is_empty() => format!("{base} Italic"),
        _ => key.to_string(),
    }
}

impl Variant {
    pub fn new(key: &str, source: &StyleSource, config: &BuildConfig) -> Self {
        Self {
            key: key.to_string(),
            display_name: source.display_name.clone().unwrap_or_else(|| display_name(key)),
            en_path: config.fonts_dir.join(&source.en_font),
            cn_path: config.fonts_dir.join(&source.cn_font),
        }
    }

    /// Fail if either source file is missing.
    pub fn check_sources(&self) -> Result<()> {
        if !self.en_path.exists() {
            bail!("Base font not found for {}: {}", self.key, self.en_path.display());
        }
        if !self.cn_path.exists() {
            bail!("Donor font not found for {}: {}", self.key, self.cn_path.display());
        }
        Ok(())
    }
}

/// Validate the config and resolve the selected styles.
pub fn resolve_variants(config: &BuildConfig) -> Result<Vec<Variant>> {
    config.validate()?;

    config
        .selected_styles()
        .iter()
        .map(|key| {
            // validate() checked every selected key
            let Some(source) = config.styles.get(key) else {
                bail!("Invalid style '{key}'");
            };
            let variant = Variant::new(key, source, config);
            variant.check_sources()?;
            Ok(variant)
        })
        .collect()
}
