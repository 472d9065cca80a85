//! Advance width check of a merged font

use std::fmt::{Display, Formatter, Result};

use crate::{font::Font, glyph_order::GlyphName};

/// A glyph whose advance is not one of the allowed widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidthViolation {
    pub name: GlyphName,
    pub width: u16,
}

impl Display for WidthViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: width {}", self.name, self.width)
    }
}

/// List every glyph, in glyph order, whose advance is neither 0 nor one of
/// `allowed`
///
/// Glyphs without metrics count as width 0.
pub fn verify_widths(font: &Font, allowed: &[u16]) -> Vec<WidthViolation> {
    font.glyph_order()
        .iter()
        .filter_map(|name| {
            let width = font.metric(name).map_or(0, |m| m.advance);
            (width != 0 && !allowed.contains(&width))
                .then(|| WidthViolation { name: name.clone(), width })
        })
        .collect()
}
