//! Horizontal (and, for icons, vertical) centering of glyphs in their cell

use indexmap::IndexMap;
use log::debug;

use crate::{
    classify::select_entries,
    config::CellConfig,
    font::{Font, Metric},
    glyph_order::GlyphName,
    outline::SimpleOutline,
    types::Codepoint,
};

/// Counts from one icon pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconReport {
    /// Powerline symbols moved horizontally only
    pub powerline: usize,
    /// Other icons scaled and centered on both axes
    pub scaled: usize,
    /// Icon glyphs left alone (no contours, or not narrow any more)
    pub skipped: usize,
}

/// Center glyphs of advance `target_width` within their cell
///
/// Glyphs of another width or without contours are ignored. A glyph is moved
/// only when its ink is more than one unit off center; its left side bearing
/// always ends up equal to the ink's left edge. Returns how many glyphs had
/// their metrics set.
pub fn center_glyphs<'a>(
    font: &mut Font,
    names: impl IntoIterator<Item = &'a GlyphName>,
    target_width: u16,
) -> usize {
    let mut centered = 0;

    for name in names {
        if font.metric(name).is_none_or(|m| m.advance != target_width) {
            continue;
        }
        let Some(simple) = font.outline_mut(name).and_then(|o| o.contours_mut()) else {
            continue;
        };
        let Some(x_min) = center_horizontally(simple, target_width) else {
            continue;
        };
        font.set_metric(name, Metric::new(target_width, x_min));
        centered += 1;
    }

    centered
}

/// Enlarge icons to the wide cell and center them
///
/// Only icons that still have the narrow width are touched, so running the
/// pass again changes nothing. Powerline symbols are only moved sideways to
/// keep their vertical alignment with the text; other icons are scaled by
/// the icon factor about the origin and centered on both axes.
pub fn scale_icons(font: &mut Font, config: &CellConfig) -> IconReport {
    let mut report = IconReport::default();

    // A glyph mapped from several codepoints is classified by the last one
    let icons: IndexMap<GlyphName, Codepoint> = select_entries(font.cmap(), &config.icon_ranges)
        .map(|(cp, name)| (name.clone(), cp))
        .collect();

    if icons.is_empty() {
        return report;
    }
    debug!("processing {} icon glyphs", icons.len());

    for (name, cp) in &icons {
        if font.metric(name).is_none_or(|m| m.advance != config.en_width) {
            report.skipped += 1;
            continue;
        }
        let Some(simple) = font.outline_mut(name).and_then(|o| o.contours_mut()) else {
            report.skipped += 1;
            continue;
        };

        let x_min = if config.powerline_range.contains(*cp) {
            report.powerline += 1;
            center_horizontally(simple, config.cn_width)
        } else {
            report.scaled += 1;
            simple.scale(config.icon_scale);
            center_both(simple, config.cn_width, config.icon_center_y)
        };

        font.set_metric(name, Metric::new(config.cn_width, x_min.unwrap_or(0)));
    }

    report
}

/// Left side bearing that centers ink of `ink_width` in a cell
fn ideal_lsb(cell_width: u16, ink_width: i32) -> i32 {
    (cell_width as i32 - ink_width).div_euclid(2)
}

/// Returns the resulting x_min
fn center_horizontally(simple: &mut SimpleOutline, cell_width: u16) -> Option<i16> {
    let bbox = simple.ensure_bounds()?;
    let delta = ideal_lsb(cell_width, bbox.x_max as i32 - bbox.x_min as i32) - bbox.x_min as i32;

    if delta.abs() > 1 {
        simple.translate(delta as f64, 0.0);
    }
    simple.bounds().map(|b| b.x_min)
}

/// Returns the resulting x_min
fn center_both(simple: &mut SimpleOutline, cell_width: u16, center_y: f64) -> Option<i16> {
    let bbox = simple.ensure_bounds()?;
    let dx = ideal_lsb(cell_width, bbox.x_max as i32 - bbox.x_min as i32) - bbox.x_min as i32;
    let dy = center_y - (bbox.y_min as f64 + bbox.y_max as f64) / 2.0;

    if dx.abs() > 1 || dy.abs() > 1.0 {
        simple.translate(dx as f64, dy);
    }
    simple.bounds().map(|b| b.x_min)
}
