//! post table: glyph names

use std::collections::HashMap;

use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId16, Version16Dot16},
};
use write_fonts::tables::post::Post;

use crate::{Result, glyph_order::GlyphOrder, types::Codepoint};

/// Read the glyph order of a font
///
/// Names come from the post table. Glyphs without a post name get a
/// synthesized one: `.notdef` for glyph 0, `uniXXXX`/`uXXXXX` for glyphs the
/// cmap maps, `glyphNNNNN` otherwise.
pub(crate) fn read_glyph_order(font: &FontRef, cmap_ids: &[(Codepoint, u32)]) -> Result<GlyphOrder> {
    let num_glyphs = font.maxp()?.num_glyphs() as usize;
    let post = font.post().ok();

    // Lowest codepoint wins when a glyph is mapped more than once
    let mut first_codepoint: HashMap<u32, Codepoint> = HashMap::new();
    for (cp, gid) in cmap_ids {
        first_codepoint
            .entry(*gid)
            .and_modify(|existing| *existing = (*existing).min(*cp))
            .or_insert(*cp);
    }

    let names = (0..num_glyphs).map(|gid| {
        post.as_ref()
            .and_then(|p| p.glyph_name(GlyphId16::new(gid as u16)))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| synthesize_name(gid, first_codepoint.get(&(gid as u32)).copied()))
    });

    Ok(GlyphOrder::from_names(names))
}

fn synthesize_name(gid: usize, codepoint: Option<Codepoint>) -> String {
    match codepoint {
        _ if gid == 0 => ".notdef".to_string(),
        Some(cp) if cp.is_bmp() => format!("uni{:04X}", cp.to_u32()),
        Some(cp) => format!("u{:05X}", cp.to_u32()),
        None => format!("glyph{gid:05}"),
    }
}

/// Build the post table for the final glyph order
///
/// A version 3.0 source stays version 3.0 (no glyph names); anything else
/// becomes version 2.0 carrying the full glyph order. Metric fields are kept
/// from the source table when there is one.
pub(crate) fn build_post(font: &FontRef, order: &GlyphOrder) -> Post {
    let Ok(source) = font.post() else {
        return Post::new_v2(order.iter().map(|n| n.as_str()));
    };

    if source.version() == Version16Dot16::VERSION_3_0 {
        let mut post = Post::new(
            source.italic_angle(),
            source.underline_position(),
            source.underline_thickness(),
            source.is_fixed_pitch(),
            source.min_mem_type42(),
            source.max_mem_type42(),
            source.min_mem_type1(),
            source.max_mem_type1(),
        );
        post.version = Version16Dot16::VERSION_3_0;
        return post;
    }

    let mut post = Post::new_v2(order.iter().map(|n| n.as_str()));
    post.italic_angle = source.italic_angle();
    post.underline_position = source.underline_position();
    post.underline_thickness = source.underline_thickness();
    post.is_fixed_pitch = source.is_fixed_pitch();
    post.min_mem_type42 = source.min_mem_type42();
    post.max_mem_type42 = source.max_mem_type42();
    post.min_mem_type1 = source.min_mem_type1();
    post.max_mem_type1 = source.max_mem_type1();

    post
}
