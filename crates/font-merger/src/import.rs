//! Copying donor glyphs into the base font

use std::fmt::{Display, Formatter};

use indexmap::IndexSet;
use log::debug;

use crate::{
    font::{Font, Metric},
    glyph_order::GlyphName,
    outline::Outline,
};

/// Why a candidate glyph was not imported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The base already has a glyph with this name
    NameCollision,
    /// The donor has no usable outline for this name
    MissingOutlineData,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NameCollision => f.write_str("name already in base"),
            SkipReason::MissingOutlineData => f.write_str("no outline data in donor"),
        }
    }
}

/// Outcome of one import pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Imported names, in donor glyph order
    pub imported: Vec<GlyphName>,
    pub skipped: Vec<(GlyphName, SkipReason)>,
}

impl ImportReport {
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn skipped_with(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|(_, r)| *r == reason).count()
    }
}

/// Copy candidate glyphs from the donor into the base
///
/// Each imported outline is an owned copy, flattened to plain contours,
/// stripped of hinting and scaled by `scale` about the origin. Imported glyphs
/// get `target_width` as advance and a provisional left side bearing of 0;
/// centering fixes the bearing later. Names already in the base are never
/// overwritten, so running the import twice changes nothing the second time.
pub fn import_glyphs(
    base: &mut Font,
    donor: &Font,
    candidates: &IndexSet<GlyphName>,
    scale: f64,
    target_width: u16,
) -> ImportReport {
    let mut report = ImportReport::default();

    // Candidates the donor does not know are reported after the rest
    let unknown = candidates.iter().filter(|name| !donor.contains(name));
    let ordered = donor.glyph_order().iter().filter(|name| candidates.contains(*name));

    for name in ordered.chain(unknown) {
        if base.contains(name) {
            debug!("{name}: already in base, skipping");
            report.skipped.push((name.clone(), SkipReason::NameCollision));
            continue;
        }

        let Some(mut outline) = copy_outline(donor, name) else {
            debug!("{name}: no outline data in donor, skipping");
            report.skipped.push((name.clone(), SkipReason::MissingOutlineData));
            continue;
        };

        if let Some(simple) = outline.contours_mut() {
            simple.ensure_bounds();
            simple.scale(scale);
        }

        base.add_glyph(name.clone(), outline, Metric::new(target_width, 0));
        report.imported.push(name.clone());
    }

    report
}

/// Deep-copy a donor outline, expanding composites and dropping hinting
fn copy_outline(donor: &Font, name: &str) -> Option<Outline> {
    match donor.outline(name)? {
        Outline::Empty => Some(Outline::Empty),
        Outline::Simple(simple) => {
            let mut copy = simple.clone();
            copy.clear_instructions();
            Some(Outline::Simple(copy))
        }
        Outline::Composite(_) => donor.flattened_outline(name).map(Outline::Simple),
    }
}

#[cfg(test)]
mod tests {
    use write_fonts::tables::glyf::{Anchor, Bbox, ComponentFlags, Transform};

    use super::*;
    use crate::outline::{ComponentRef, CompositeOutline, SimpleOutline};

    fn glyph(font: &mut Font, name: &str, cp: u32, rect: (i16, i16, i16, i16), advance: u16) {
        let (x0, y0, x1, y1) = rect;
        let outline = Outline::Simple(SimpleOutline::rect(x0, y0, x1, y1));
        font.add_glyph(name, outline, Metric::new(advance, x0));
        font.map_codepoint(cp, name);
    }

    fn candidates(names: &[&str]) -> IndexSet<GlyphName> {
        names.iter().map(|n| GlyphName::new(*n)).collect()
    }

    #[test]
    fn test_disjoint_donor() {
        let mut base = Font::new(1000);
        glyph(&mut base, "A", 0x41, (50, 0, 550, 700), 600);

        let mut donor = Font::new(1000);
        glyph(&mut donor, "uni4F60", 0x4F60, (100, -100, 900, 800), 1000);
        glyph(&mut donor, "uni597D", 0x597D, (100, -100, 900, 800), 1000);

        let report =
            import_glyphs(&mut base, &donor, &candidates(&["uni4F60", "uni597D"]), 1.0, 1200);

        assert_eq!(report.imported_count(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(base.num_glyphs(), 3);
        assert_eq!(base.glyph_order().id_of("uni4F60"), Some(1));
        assert_eq!(base.metric("uni597D"), Some(Metric::new(1200, 0)));
        assert_eq!(base.metric("A"), Some(Metric::new(600, 50)));
    }

    #[test]
    fn test_collision_keeps_base_glyph() {
        let mut base = Font::new(1000);
        glyph(&mut base, "uni4E00", 0x4E00, (0, 0, 10, 10), 600);

        let mut donor = Font::new(1000);
        glyph(&mut donor, "uni4E00", 0x4E00, (100, 100, 900, 900), 1000);

        let report = import_glyphs(&mut base, &donor, &candidates(&["uni4E00"]), 1.0, 1200);

        assert!(report.imported.is_empty());
        assert_eq!(report.skipped, vec![(GlyphName::new("uni4E00"), SkipReason::NameCollision)]);
        assert_eq!(base.metric("uni4E00"), Some(Metric::new(600, 0)));
        assert_eq!(
            base.outline("uni4E00").and_then(Outline::bounds),
            Some(Bbox { x_min: 0, y_min: 0, x_max: 10, y_max: 10 })
        );
    }

    #[test]
    fn test_missing_outline_data() {
        let mut base = Font::new(1000);
        let donor = Font::new(1000);

        let report = import_glyphs(&mut base, &donor, &candidates(&["uni4E00"]), 1.0, 1200);

        assert_eq!(report.skipped_with(SkipReason::MissingOutlineData), 1);
        assert_eq!(base.num_glyphs(), 0);
    }

    #[test]
    fn test_import_scales_outlines() {
        let mut base = Font::new(1000);
        let mut donor = Font::new(2000);
        glyph(&mut donor, "uni4E00", 0x4E00, (0, -200, 2000, 1800), 2000);

        import_glyphs(&mut base, &donor, &candidates(&["uni4E00"]), 0.5, 1200);

        assert_eq!(
            base.outline("uni4E00").and_then(Outline::bounds),
            Some(Bbox { x_min: 0, y_min: -100, x_max: 1000, y_max: 900 })
        );
        // Donor is untouched
        assert_eq!(
            donor.outline("uni4E00").and_then(Outline::bounds),
            Some(Bbox { x_min: 0, y_min: -200, x_max: 2000, y_max: 1800 })
        );
    }

    #[test]
    fn test_import_is_idempotent() {
        let mut base = Font::new(1000);
        let mut donor = Font::new(1000);
        glyph(&mut donor, "uni4E00", 0x4E00, (0, 0, 900, 900), 1000);
        let names = candidates(&["uni4E00"]);

        import_glyphs(&mut base, &donor, &names, 1.0, 1200);
        let second = import_glyphs(&mut base, &donor, &names, 1.0, 1200);

        assert!(second.imported.is_empty());
        assert_eq!(base.num_glyphs(), 1);
    }

    #[test]
    fn test_imports_follow_donor_order() {
        let mut base = Font::new(1000);
        let mut donor = Font::new(1000);
        glyph(&mut donor, "uni597D", 0x597D, (0, 0, 10, 10), 1000);
        glyph(&mut donor, "uni4F60", 0x4F60, (0, 0, 10, 10), 1000);

        let report =
            import_glyphs(&mut base, &donor, &candidates(&["uni4F60", "uni597D"]), 1.0, 1200);

        let names: Vec<&str> = report.imported.iter().map(GlyphName::as_str).collect();
        assert_eq!(names, ["uni597D", "uni4F60"]);
    }

    #[test]
    fn test_composites_are_flattened() {
        let mut donor = Font::new(1000);
        glyph(&mut donor, "dot", 0x2E, (0, 0, 100, 100), 500);
        donor.add_glyph(
            "uni2025",
            Outline::Composite(CompositeOutline {
                bbox: Bbox { x_min: 0, y_min: 0, x_max: 400, y_max: 100 },
                components: vec![
                    ComponentRef {
                        glyph: GlyphName::new("dot"),
                        anchor: Anchor::Offset { x: 0, y: 0 },
                        flags: ComponentFlags::default(),
                        transform: Transform::default(),
                    },
                    ComponentRef {
                        glyph: GlyphName::new("dot"),
                        anchor: Anchor::Offset { x: 300, y: 0 },
                        flags: ComponentFlags::default(),
                        transform: Transform::default(),
                    },
                ],
            }),
            Metric::new(1000, 0),
        );

        let mut base = Font::new(1000);
        let report = import_glyphs(&mut base, &donor, &candidates(&["uni2025"]), 1.0, 1200);

        assert_eq!(report.imported_count(), 1);
        let outline = base.outline("uni2025").unwrap();
        assert!(matches!(outline, Outline::Simple(_)));
        assert_eq!(outline.contour_count(), 2);
        assert_eq!(outline.bounds(), Some(Bbox { x_min: 0, y_min: 0, x_max: 400, y_max: 100 }));
        // The component glyph itself was not imported
        assert!(!base.contains("dot"));
    }
}
