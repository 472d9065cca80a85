//! Build pipeline: one merged, named font per configured style.

use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use twincell_font_merger::{
    CellConfig, Font, MergeOutput, Merger, WidthClass, WidthViolation, verify_widths,
};
use twincell_font_metadata::{FontNaming, MonospaceSettings};

use crate::{
    config::BuildConfig,
    io::{read_font, write_font},
    manifest::{FontManifest, ManifestEntry},
    parallel::process_parallel,
    styles::{Variant, resolve_variants},
};

/// Violations listed in a log message or error
const VIOLATION_SAMPLE: usize = 10;

/// A variant that was built and written.
#[derive(Debug, Clone)]
pub struct VariantOutput {
    pub variant: Variant,
    pub path: PathBuf,
    pub file_name: String,
    pub imported: usize,
    pub violations: usize,
}

/// Result of [`build_all`].
#[derive(Debug)]
pub struct BuildSummary {
    pub outputs: Vec<VariantOutput>,
    pub manifest_path: PathBuf,
}

/// Build one variant: merge, name, write.
pub fn build_variant(config: &BuildConfig, variant: &Variant) -> Result<VariantOutput> {
    let start = Instant::now();
    info!("Building {} ({})", variant.key, variant.display_name);

    let merged = {
        let base = read_font(&variant.en_path)?;
        let donor = read_font(&variant.cn_path)?;
        Merger::new(config.cell_config())
            .build(&base, &donor)
            .with_context(|| format!("Failed to merge {}", variant.key))?
    };

    check_violations(&variant.key, &merged.violations, config.build.strict)?;

    let metadata = config.font.metadata();
    let naming = FontNaming {
        family: &config.font.family_name,
        style_key: &variant.key,
        display_name: &variant.display_name,
        version: &config.font.version,
        metadata: &metadata,
    };
    let data = naming
        .apply(&merged.data)
        .with_context(|| format!("Failed to name {}", variant.key))?;
    let data = MonospaceSettings::new(config.width.en_width).apply(&data)?;

    let file_name = naming.file_name();
    let path = config.build.output_dir.join(&file_name);
    write_font(&path, &data)?;

    info!(
        "Saved {} ({:.2} MB, {:.2}s)",
        path.display(),
        data.len() as f64 / 1024.0 / 1024.0,
        start.elapsed().as_secs_f64()
    );

    Ok(VariantOutput {
        variant: variant.clone(),
        path,
        file_name,
        imported: merged.merge.import.imported_count(),
        violations: merged.violations.len(),
    })
}

/// Build every selected style and write the manifest.
///
/// Variants are built independently; the manifest lists the ones that
/// succeeded, and the build fails afterwards if any variant failed.
pub fn build_all(config: &BuildConfig) -> Result<BuildSummary> {
    let variants = resolve_variants(config)?;
    let output_dir = &config.build.output_dir;
    create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let (en, cn) = (config.width.en_width, config.width.cn_width);
    println!("Building {} v{}", config.font.family_name, config.font.version);
    println!("Styles: {}", variants.iter().map(|v| v.key.as_str()).collect::<Vec<_>>().join(", "));
    println!("Source: {}", config.fonts_dir.display());
    println!("Output: {}", output_dir.display());
    println!("Width ratio: {cn}:{en} (2:1)");

    let batch = process_parallel("Build", variants, config.build.parallel, |variant| {
        build_variant(config, &variant)
            .with_context(|| format!("Error building {}", variant.key))
    })?;

    let mut manifest = FontManifest::new(&config.font.family_name, &config.font.version);
    manifest.fonts = batch
        .succeeded
        .iter()
        .map(|output| ManifestEntry {
            style: output.variant.key.clone(),
            display_name: output.variant.display_name.clone(),
            filename: output.file_name.clone(),
        })
        .collect();
    let manifest_path = manifest.write_to(output_dir)?;
    println!("Generated manifest: {}", manifest_path.display());

    batch.ok_or_bail("Build")?;
    println!("Build complete! Fonts saved to: {}", output_dir.display());

    Ok(BuildSummary { outputs: batch.succeeded, manifest_path })
}

/// Merge a single pair of fonts without naming.
pub fn merge_pair(base: &Path, donor: &Path, output: &Path, cell: CellConfig) -> Result<MergeOutput> {
    let base_data = read_font(base)?;
    let donor_data = read_font(donor)?;

    let merged = Merger::new(cell)
        .build(&base_data, &donor_data)
        .with_context(|| format!("Failed to merge {} into {}", donor.display(), base.display()))?;
    write_font(output, &merged.data)?;

    Ok(merged)
}

/// Advance widths of a font, by class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidthCensus {
    pub zero: usize,
    pub en: usize,
    pub cn: usize,
    pub violations: Vec<WidthViolation>,
}

/// Classify every glyph width of a font file.
pub fn verify_file(path: &Path, en_width: u16, cn_width: u16) -> Result<WidthCensus> {
    let data = read_font(path)?;
    let font = Font::from_bytes(&data)
        .with_context(|| format!("Failed to parse font: {}", path.display()))?;

    let mut census = WidthCensus {
        violations: verify_widths(&font, &[en_width, cn_width]),
        ..Default::default()
    };
    for name in font.glyph_order().iter() {
        let advance = font.metric(name).map_or(0, |m| m.advance);
        match WidthClass::of(advance, en_width, cn_width) {
            Some(WidthClass::Zero) => census.zero += 1,
            Some(WidthClass::En) => census.en += 1,
            Some(WidthClass::Cn) => census.cn += 1,
            None => {}
        }
    }

    Ok(census)
}

/// Log violations, or fail with them in strict mode.
fn check_violations(label: &str, violations: &[WidthViolation], strict: bool) -> Result<()> {
    if violations.is_empty() {
        info!("{label}: all glyph widths verified");
        return Ok(());
    }

    let sample = violations
        .iter()
        .take(VIOLATION_SAMPLE)
        .map(|v| format!("  {v}"))
        .collect::<Vec<_>>()
        .join("\n");
    let message = format!("{label}: {} glyphs with unexpected widths:\n{sample}", violations.len());

    if strict {
        bail!(message);
    }
    warn!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};

    use tempfile::tempdir;
    use twincell_font_merger::GlyphName;

    use super::*;

    fn violation(name: &str, width: u16) -> WidthViolation {
        WidthViolation { name: GlyphName::new(name), width }
    }

    #[test]
    fn test_violations_warn_by_default() {
        assert!(check_violations("Regular", &[violation("glyphX", 601)], false).is_ok());
        assert!(check_violations("Regular", &[], true).is_ok());
    }

    #[test]
    fn test_violations_fatal_when_strict() {
        let violations: Vec<_> = (0..12).map(|i| violation(&format!("g{i}"), 601)).collect();

        let err = check_violations("Regular", &violations, true).unwrap_err().to_string();

        assert!(err.contains("12 glyphs"));
        assert!(err.contains("g9: width 601"));
        assert!(!err.contains("g10"));
    }

    #[test]
    fn test_failed_variants_reported() {
        let dir = tempdir().unwrap();
        let fonts = dir.path().join("fonts");
        create_dir_all(&fonts).unwrap();
        write(fonts.join("base.ttf"), b"not a font").unwrap();
        write(fonts.join("donor.ttf"), b"not a font").unwrap();

        let mut config = BuildConfig::from_toml(
            r#"
[build]
parallel = 2

[styles.Regular]
en_font = "base.ttf"
cn_font = "donor.ttf"

[styles.Bold]
en_font = "base.ttf"
cn_font = "donor.ttf"
"#,
        )
        .unwrap();
        config.fonts_dir = fonts;
        config.build.output_dir = dir.path().join("out");

        let err = build_all(&config).unwrap_err();
        assert!(err.to_string().contains("0 succeeded, 2 failed"));

        // The manifest is still written, without the failed variants
        let manifest: FontManifest =
            serde_json::from_str(&read_to_string(dir.path().join("out/fonts-manifest.json")).unwrap())
                .unwrap();
        assert!(manifest.fonts.is_empty());
    }

    #[test]
    fn test_verify_file_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        write(&path, b"nope").unwrap();

        assert!(verify_file(&path, 600, 1200).is_err());
    }
}
