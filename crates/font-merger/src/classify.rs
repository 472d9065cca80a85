//! Codepoint classification by block tables

use indexmap::IndexSet;

use crate::{
    glyph_order::GlyphName,
    tables::cmap::CharMap,
    types::{Codepoint, CodepointRange},
};

const fn range(start: u32, end: u32) -> CodepointRange {
    CodepointRange::new(start, end)
}

/// Blocks whose characters occupy a full-width cell
pub const CJK_RANGES: &[CodepointRange] = &[
    range(0x4E00, 0x9FFF),   // CJK Unified Ideographs
    range(0x3400, 0x4DBF),   // Extension A
    range(0x20000, 0x2A6DF), // Extension B
    range(0x2A700, 0x2B73F), // Extension C
    range(0x2B740, 0x2B81F), // Extension D
    range(0x2B820, 0x2CEAF), // Extension E
    range(0x2CEB0, 0x2EBEF), // Extension F
    range(0x30000, 0x3134F), // Extension G
    range(0x3000, 0x303F),   // CJK Symbols and Punctuation
    range(0xFF00, 0xFFEF),   // Halfwidth and Fullwidth Forms
    range(0x2E80, 0x2EFF),   // Radicals Supplement
    range(0x2F00, 0x2FDF),   // Kangxi Radicals
    range(0x3100, 0x312F),   // Bopomofo
    range(0x31A0, 0x31BF),   // Bopomofo Extended
    range(0x31C0, 0x31EF),   // CJK Strokes
    range(0x3200, 0x32FF),   // Enclosed CJK Letters and Months
    range(0x3300, 0x33FF),   // CJK Compatibility
    range(0xFE30, 0xFE4F),   // CJK Compatibility Forms
];

/// Private use areas where icon fonts place their glyphs
pub const ICON_RANGES: &[CodepointRange] = &[
    range(0xE000, 0xF8FF),   // Private Use Area
    range(0xF0000, 0xFFFFD), // Supplementary Private Use Area-A
];

/// Powerline symbols, a sub-range of the private use area
pub const POWERLINE_RANGE: CodepointRange = range(0xE0A0, 0xE0DF);

/// Whether the codepoint lies in any of the ranges
pub fn classify(cp: Codepoint, ranges: &[CodepointRange]) -> bool {
    ranges.iter().any(|r| r.contains(cp))
}

/// Names of the glyphs the cmap maps from codepoints in the ranges
///
/// Each name appears once, in the order of its lowest codepoint.
pub fn select_glyphs(cmap: &CharMap, ranges: &[CodepointRange]) -> IndexSet<GlyphName> {
    cmap.iter()
        .filter(|(cp, _)| classify(**cp, ranges))
        .map(|(_, name)| name.clone())
        .collect()
}

/// The (codepoint, glyph) entries of the cmap that fall in the ranges
pub fn select_entries<'a>(
    cmap: &'a CharMap,
    ranges: &'a [CodepointRange],
) -> impl Iterator<Item = (Codepoint, &'a GlyphName)> + 'a {
    cmap.iter().filter(|(cp, _)| classify(**cp, ranges)).map(|(cp, name)| (*cp, name))
}
