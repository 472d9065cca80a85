//! Glyph merge and metric normalization for two-cell monospace fonts
//!
//! The engine imports CJK glyphs from a donor font into a base font, rescales
//! them to the base's unit grid, gives every imported glyph the wide cell
//! width and centers CJK and icon glyphs in their cells.

mod center;
mod classify;
mod config;
mod error;
mod font;
mod glyph_order;
mod import;
mod merger;
mod outline;
mod ranges;
mod scale;
mod tables;
mod types;
mod verify;

pub use center::{IconReport, center_glyphs, scale_icons};
pub use classify::{CJK_RANGES, ICON_RANGES, POWERLINE_RANGE, classify, select_entries, select_glyphs};
pub use config::CellConfig;
pub use error::{MergeError, Result};
pub use font::{Font, Metric};
pub use glyph_order::{GlyphName, GlyphOrder};
pub use import::{ImportReport, SkipReason, import_glyphs};
pub use merger::{FinalizeReport, MergeOutput, MergeReport, Merger};
pub use outline::{ComponentRef, CompositeOutline, Outline, SimpleOutline};
pub use ranges::{CapabilityRanges, reconcile_ranges};
pub use scale::{UnitScale, grid_scale};
pub use tables::cmap::{CharMap, merge_cmap};
pub use types::{Codepoint, CodepointRange, WidthClass};
pub use verify::{WidthViolation, verify_widths};

/// Merge a donor font into a base font using the default cell geometry.
///
/// This is a convenience wrapper around [`Merger`] for the common case.
///
/// # Example
///
/// ```no_run
/// use twincell_font_merger::merge_fonts_bytes;
///
/// let base = std::fs::read("JetBrainsMonoNerdFont-Regular.ttf").unwrap();
/// let donor = std::fs::read("LXGWWenKaiMono-Regular.ttf").unwrap();
/// let merged = merge_fonts_bytes(&base, &donor).unwrap();
/// ```
pub fn merge_fonts_bytes(base: &[u8], donor: &[u8]) -> Result<Vec<u8>> {
    Merger::default().build(base, donor).map(|output| output.data)
}
