//! Main merger implementation

use std::collections::HashSet;

use log::{info, warn};

use crate::{
    MergeError, Result,
    center::{IconReport, center_glyphs, scale_icons},
    classify::select_glyphs,
    config::CellConfig,
    font::Font,
    glyph_order::GlyphName,
    import::{ImportReport, SkipReason, import_glyphs},
    ranges::reconcile_ranges,
    scale::UnitScale,
    tables::cmap::merge_cmap,
    verify::{WidthViolation, verify_widths},
};

/// What [`Merger::merge`] did to the base font
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    /// Number of CJK glyphs the donor offered
    pub candidates: usize,
    pub scale: UnitScale,
    pub import: ImportReport,
    /// cmap entries added from the donor
    pub cmap_added: usize,
    /// Whether OS/2 capability bits were merged
    pub ranges_reconciled: bool,
}

/// What [`Merger::finalize`] did to the font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    pub icons: IconReport,
    /// CJK glyphs whose metrics were set by centering
    pub centered: usize,
}

/// Result of a whole engine run
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The serialized merged font
    pub data: Vec<u8>,
    pub merge: MergeReport,
    pub finalize: FinalizeReport,
    pub violations: Vec<WidthViolation>,
}

/// Merges CJK glyphs of a donor font into a base font under a two-cell
/// width doctrine
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: CellConfig,
}

impl Merger {
    pub fn new(config: CellConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CellConfig {
        &self.config
    }

    /// Import the donor's CJK glyphs and their cmap entries into the base
    ///
    /// The donor is only read. Glyphs and codepoints the base already has
    /// are left as they are.
    pub fn merge(&self, base: &mut Font, donor: &Font) -> MergeReport {
        let candidates = select_glyphs(donor.cmap(), &self.config.cjk_ranges);
        let scale =
            UnitScale::new(base.units_per_em(), donor.units_per_em(), self.config.fill_factor);

        info!(
            "Found {} CJK glyphs in donor, scaling by {:.4} (upem {} -> {}, fill {:.2})",
            candidates.len(),
            scale.combined,
            donor.units_per_em(),
            base.units_per_em(),
            self.config.fill_factor
        );

        let import = import_glyphs(base, donor, &candidates, scale.combined, self.config.cn_width);
        info!(
            "Imported {} glyphs ({} already in base, {} without outlines)",
            import.imported_count(),
            import.skipped_with(SkipReason::NameCollision),
            import.skipped_with(SkipReason::MissingOutlineData),
        );

        let imported: HashSet<GlyphName> = import.imported.iter().cloned().collect();
        let cmap_added = merge_cmap(base.cmap_mut(), donor.cmap(), &imported);
        let ranges_reconciled = reconcile_ranges(base, donor);

        MergeReport { candidates: candidates.len(), scale, import, cmap_added, ranges_reconciled }
    }

    /// Enlarge icons, then center every CJK glyph in the wide cell
    pub fn finalize(&self, font: &mut Font) -> FinalizeReport {
        let icons = scale_icons(font, &self.config);
        info!(
            "Icons: {} powerline symbols, {} scaled by {}",
            icons.powerline, icons.scaled, self.config.icon_scale
        );

        let cjk: Vec<GlyphName> =
            select_glyphs(font.cmap(), &self.config.cjk_ranges).into_iter().collect();
        let centered = center_glyphs(font, &cjk, self.config.cn_width);
        info!("Centered {centered} CJK glyphs");

        FinalizeReport { icons, centered }
    }

    /// Glyphs whose advance is not 0, the narrow or the wide width
    pub fn verify(&self, font: &Font) -> Vec<WidthViolation> {
        verify_widths(font, &self.config.allowed_widths())
    }

    /// Run the whole engine on two font files
    ///
    /// Width violations are returned, not raised; what to do with them is up
    /// to the caller.
    pub fn build(&self, base_data: &[u8], donor_data: &[u8]) -> Result<MergeOutput> {
        let mut base = Font::from_bytes(base_data)?;
        // Fail before any work on a base that could not be written back
        base.check_writable()?;
        if let Some(tag) = base.variation_table() {
            return Err(MergeError::VariableFont(tag));
        }

        let merge = {
            let donor = Font::from_bytes(donor_data)?;
            self.merge(&mut base, &donor)
        };

        let finalize = self.finalize(&mut base);

        let violations = self.verify(&base);
        if !violations.is_empty() {
            warn!(
                "{} glyphs have a width outside {:?}",
                violations.len(),
                self.config.allowed_widths()
            );
        }

        let data = base.to_bytes()?;
        info!("Merged font: {} glyphs, {} bytes", base.num_glyphs(), data.len());

        Ok(MergeOutput { data, merge, finalize, violations })
    }
}
