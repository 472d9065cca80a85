//! head table

use std::collections::HashMap;

use read_fonts::{FontRef, TableProvider};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{glyf::Bbox, head::Head, loca::LocaFormat},
};

use crate::{
    Result,
    glyph_order::{GlyphName, GlyphOrder},
    outline::Outline,
};

/// Rebuild head with the font bounding box and loca format
pub(crate) fn build_head(
    font: &FontRef,
    order: &GlyphOrder,
    outlines: &HashMap<GlyphName, Outline>,
    loca_format: LocaFormat,
) -> Result<Head> {
    let mut head: Head = font.head()?.to_owned_table();

    let bbox = order
        .iter()
        .filter_map(|name| outlines.get(name).and_then(Outline::bounds))
        .reduce(|a, b| Bbox {
            x_min: a.x_min.min(b.x_min),
            y_min: a.y_min.min(b.y_min),
            x_max: a.x_max.max(b.x_max),
            y_max: a.y_max.max(b.y_max),
        });

    if let Some(bbox) = bbox {
        head.x_min = bbox.x_min;
        head.y_min = bbox.y_min;
        head.x_max = bbox.x_max;
        head.y_max = bbox.y_max;
    }

    head.index_to_loc_format = match loca_format {
        LocaFormat::Short => 0,
        LocaFormat::Long => 1,
    };
    // Recomputed by the font builder
    head.checksum_adjustment = 0;

    Ok(head)
}
