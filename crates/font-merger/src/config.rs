//! Cell geometry and tuning for a merge

use crate::{
    classify::{CJK_RANGES, ICON_RANGES, POWERLINE_RANGE},
    types::CodepointRange,
};

/// Parameters of the two-cell width doctrine
///
/// Narrow glyphs are `en_width` wide, CJK and icon glyphs `cn_width`. The
/// engine does not enforce `cn_width == 2 * en_width`; callers do.
#[derive(Debug, Clone, PartialEq)]
pub struct CellConfig {
    pub en_width: u16,
    pub cn_width: u16,

    pub cjk_ranges: Vec<CodepointRange>,
    pub icon_ranges: Vec<CodepointRange>,
    pub powerline_range: CodepointRange,

    /// Extra scale applied to imported glyphs after grid conversion
    pub fill_factor: f64,
    /// Scale applied to non-powerline icons
    pub icon_scale: f64,
    /// Vertical center icons are moved to, in font units
    pub icon_center_y: f64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            en_width: 600,
            cn_width: 1200,
            cjk_ranges: CJK_RANGES.to_vec(),
            icon_ranges: ICON_RANGES.to_vec(),
            powerline_range: POWERLINE_RANGE,
            fill_factor: 1.02,
            icon_scale: 1.4,
            icon_center_y: 360.0,
        }
    }
}

impl CellConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn en_width(mut self, width: u16) -> Self {
        self.en_width = width;
        self
    }

    pub fn cn_width(mut self, width: u16) -> Self {
        self.cn_width = width;
        self
    }

    pub fn cjk_ranges(mut self, ranges: impl IntoIterator<Item = impl Into<CodepointRange>>) -> Self {
        self.cjk_ranges = ranges.into_iter().map(Into::into).collect();
        self
    }

    pub fn icon_ranges(mut self, ranges: impl IntoIterator<Item = impl Into<CodepointRange>>) -> Self {
        self.icon_ranges = ranges.into_iter().map(Into::into).collect();
        self
    }

    pub fn powerline_range(mut self, range: impl Into<CodepointRange>) -> Self {
        self.powerline_range = range.into();
        self
    }

    pub fn fill_factor(mut self, factor: f64) -> Self {
        self.fill_factor = factor;
        self
    }

    pub fn icon_scale(mut self, factor: f64) -> Self {
        self.icon_scale = factor;
        self
    }

    pub fn icon_center_y(mut self, y: f64) -> Self {
        self.icon_center_y = y;
        self
    }

    /// Advance widths a glyph of the merged font may have
    pub fn allowed_widths(&self) -> [u16; 3] {
        [0, self.en_width, self.cn_width]
    }
}
