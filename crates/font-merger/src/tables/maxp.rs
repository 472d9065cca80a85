//! maxp table

use std::collections::HashMap;

use read_fonts::{FontRef, TableProvider};
use write_fonts::{from_obj::ToOwnedTable, tables::maxp::Maxp};

use crate::{
    Result,
    glyph_order::{GlyphName, GlyphOrder},
    outline::Outline,
};

/// Rebuild maxp with the new glyph count
///
/// For version 1.0 tables the point and contour maxima are raised to cover
/// every simple glyph; the other fields are kept from the source.
pub(crate) fn build_maxp(
    font: &FontRef,
    order: &GlyphOrder,
    outlines: &HashMap<GlyphName, Outline>,
) -> Result<Maxp> {
    let mut maxp: Maxp = font.maxp()?.to_owned_table();
    maxp.num_glyphs = order.len() as u16;

    if maxp.max_points.is_some() {
        let (points, contours) = outlines
            .values()
            .filter_map(|outline| match outline {
                Outline::Simple(simple) => Some((simple.point_count(), simple.contours().len())),
                _ => None,
            })
            .fold((0usize, 0usize), |(p, c), (sp, sc)| (p.max(sp), c.max(sc)));

        let clamp = |v: usize| v.min(u16::MAX as usize) as u16;
        maxp.max_points = maxp.max_points.map(|v| v.max(clamp(points)));
        maxp.max_contours = maxp.max_contours.map(|v| v.max(clamp(contours)));
    }

    Ok(maxp)
}
