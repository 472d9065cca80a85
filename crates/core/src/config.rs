//! Build configuration: a TOML file, overridden by command-line flags.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use twincell_font_merger::CellConfig;
use twincell_font_metadata::FontMetadata;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "twincell.toml";

/// Default family name.
pub const DEFAULT_FAMILY_NAME: &str = "Twincell Mono";

/// Whole build configuration, as read from the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the style source font names are relative to.
    pub fonts_dir: PathBuf,
    pub font: FontSection,
    pub width: WidthSection,
    pub tuning: TuningSection,
    pub build: BuildSection,
    /// Source fonts per style key, in file order.
    pub styles: IndexMap<String, StyleSource>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fonts_dir: PathBuf::from("fonts"),
            font: FontSection::default(),
            width: WidthSection::default(),
            tuning: TuningSection::default(),
            build: BuildSection::default(),
            styles: IndexMap::new(),
        }
    }
}

/// `[font]`: naming and metadata of the output family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSection {
    pub family_name: String,
    pub version: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub url: String,
    pub license: String,
    pub license_url: String,
}

impl Default for FontSection {
    fn default() -> Self {
        Self {
            family_name: DEFAULT_FAMILY_NAME.to_string(),
            version: "1.0".to_string(),
            author: String::new(),
            copyright: String::new(),
            description: String::new(),
            url: String::new(),
            license: String::new(),
            license_url: String::new(),
        }
    }
}

impl FontSection {
    pub fn metadata(&self) -> FontMetadata {
        FontMetadata {
            author: self.author.clone(),
            copyright: self.copyright.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            license: self.license.clone(),
            license_url: self.license_url.clone(),
        }
    }
}

/// `[width]`: the two cell widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthSection {
    pub en_width: u16,
    pub cn_width: u16,
}

impl Default for WidthSection {
    fn default() -> Self {
        Self { en_width: 600, cn_width: 1200 }
    }
}

/// `[tuning]`: per font pair visual factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSection {
    pub fill_factor: f64,
    pub icon_scale: f64,
    pub icon_center_y: f64,
}

impl Default for TuningSection {
    fn default() -> Self {
        let cell = CellConfig::default();
        Self {
            fill_factor: cell.fill_factor,
            icon_scale: cell.icon_scale,
            icon_center_y: cell.icon_center_y,
        }
    }
}

/// `[build]`: what to build and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Style keys to build; empty means every configured style.
    pub styles: Vec<String>,
    pub output_dir: PathBuf,
    /// Number of variants built at once.
    pub parallel: usize,
    /// Fail a variant that has width violations.
    pub strict: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            styles: Vec::new(),
            output_dir: PathBuf::from("output/fonts"),
            parallel: 1,
            strict: false,
        }
    }
}

/// `[styles.<Key>]`: source fonts of one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSource {
    /// Base (Latin and icons) font file name.
    pub en_font: String,
    /// Donor (CJK) font file name.
    pub cn_font: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub styles: Option<Vec<String>>,
    pub fonts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub parallel: Option<usize>,
    pub strict: bool,
}

impl BuildConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid build config")
    }

    /// Load a config file; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In {}", path.display()))
    }

    pub fn with_overrides(mut self, overrides: BuildOverrides) -> Self {
        if let Some(styles) = overrides.styles {
            self.build.styles = styles;
        }
        if let Some(fonts_dir) = overrides.fonts_dir {
            self.fonts_dir = fonts_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.build.output_dir = output_dir;
        }
        if let Some(parallel) = overrides.parallel {
            self.build.parallel = parallel;
        }
        self.build.strict |= overrides.strict;
        self
    }

    /// Style keys to build: the requested ones, or all configured styles.
    pub fn selected_styles(&self) -> Vec<String> {
        if self.build.styles.is_empty() {
            self.styles.keys().cloned().collect()
        } else {
            self.build.styles.clone()
        }
    }

    /// Check everything that does not need the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.styles.is_empty() {
            bail!("No styles defined in config");
        }
        for style in &self.build.styles {
            if !self.styles.contains_key(style) {
                let valid: Vec<&str> = self.styles.keys().map(String::as_str).collect();
                bail!("Invalid style '{style}'. Valid styles: {}", valid.join(", "));
            }
        }

        let WidthSection { en_width, cn_width } = self.width;
        ensure!(en_width > 0, "en_width must be positive");
        ensure!(
            u32::from(cn_width) == 2 * u32::from(en_width),
            "cn_width ({cn_width}) must be twice en_width ({en_width})"
        );

        let tuning = self.tuning;
        ensure!(tuning.fill_factor > 0.0, "fill_factor must be positive");
        ensure!(tuning.icon_scale > 0.0, "icon_scale must be positive");
        ensure!(!self.font.family_name.trim().is_empty(), "family_name must not be empty");
        Ok(())
    }

    /// Engine configuration for this build.
    pub fn cell_config(&self) -> CellConfig {
        CellConfig::new()
            .en_width(self.width.en_width)
            .cn_width(self.width.cn_width)
            .fill_factor(self.tuning.fill_factor)
            .icon_scale(self.tuning.icon_scale)
            .icon_center_y(self.tuning.icon_center_y)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    const SAMPLE: &str = r#"
fonts_dir = "sources"

[font]
family_name = "Twincell Mono"
version = "2.1"
author = "Someone"

[width]
en_width = 500
cn_width = 1000

[tuning]
fill_factor = 1.0

[build]
output_dir = "dist"
parallel = 4

[styles.Regular]
en_font = "Base-Regular.ttf"
cn_font = "Donor-Regular.ttf"

[styles.MediumItalic]
en_font = "Base-MediumItalic.ttf"
cn_font = "Donor-Medium.ttf"
display_name = "Medium Italic"
"#;

    #[test]
    fn test_parse_sample() {
        let config = BuildConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.fonts_dir, PathBuf::from("sources"));
        assert_eq!(config.font.version, "2.1");
        assert_eq!(config.font.metadata().author, "Someone");
        assert_eq!(config.width, WidthSection { en_width: 500, cn_width: 1000 });
        assert_eq!(config.tuning.fill_factor, 1.0);
        assert_eq!(config.tuning.icon_scale, 1.4);
        assert_eq!(config.build.parallel, 4);
        assert!(!config.build.strict);

        let keys: Vec<&str> = config.styles.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Regular", "MediumItalic"]);
        assert_eq!(config.styles["MediumItalic"].display_name.as_deref(), Some("Medium Italic"));
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = BuildConfig::from_toml("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.build.output_dir, PathBuf::from("output/fonts"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = BuildConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, BuildConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        write(&path, SAMPLE).unwrap();

        let config = BuildConfig::load(&path).unwrap();
        assert_eq!(config.styles.len(), 2);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(BuildConfig::from_toml("[width]\nen_width = \"wide\"").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = BuildConfig::from_toml(SAMPLE).unwrap().with_overrides(BuildOverrides {
            styles: Some(vec!["Regular".into()]),
            output_dir: Some(PathBuf::from("out")),
            parallel: Some(1),
            strict: true,
            ..Default::default()
        });

        assert_eq!(config.selected_styles(), ["Regular"]);
        assert_eq!(config.build.output_dir, PathBuf::from("out"));
        assert_eq!(config.build.parallel, 1);
        assert!(config.build.strict);
        // Not overridden
        assert_eq!(config.fonts_dir, PathBuf::from("sources"));
    }

    #[test]
    fn test_all_styles_by_default() {
        let config = BuildConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.selected_styles(), ["Regular", "MediumItalic"]);
    }

    #[test]
    fn test_ratio_validated() {
        let mut config = BuildConfig::from_toml(SAMPLE).unwrap();
        config.width.cn_width = 1100;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn test_unknown_style_rejected() {
        let config = BuildConfig::from_toml(SAMPLE).unwrap().with_overrides(BuildOverrides {
            styles: Some(vec!["Black".into()]),
            ..Default::default()
        });

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid style 'Black'"));
    }

    #[test]
    fn test_no_styles_rejected() {
        assert!(BuildConfig::default().validate().is_err());
    }

    #[test]
    fn test_cell_config() {
        let cell = BuildConfig::from_toml(SAMPLE).unwrap().cell_config();
        assert_eq!(cell.allowed_widths(), [0, 500, 1000]);
        assert_eq!(cell.fill_factor, 1.0);
    }
}
