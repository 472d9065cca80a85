//! Domain-specific newtypes for type safety
//!
//! These types keep codepoints, codepoint ranges and width classes apart
//! from the plain integers they wrap.

use std::fmt::{Display, Formatter, Result};

/// A Unicode codepoint
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(pub u32);

impl Codepoint {
    pub const fn new(cp: u32) -> Self {
        Self(cp)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Convert to a Rust char if valid
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    pub const fn is_bmp(self) -> bool {
        self.0 <= 0xFFFF
    }
}

impl From<u32> for Codepoint {
    fn from(cp: u32) -> Self {
        Self(cp)
    }
}

impl From<char> for Codepoint {
    fn from(ch: char) -> Self {
        Self(ch as u32)
    }
}

impl From<Codepoint> for u32 {
    fn from(cp: Codepoint) -> Self {
        cp.0
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// An inclusive range of codepoints, `start..=end`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodepointRange {
    pub start: u32,
    pub end: u32,
}

impl CodepointRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn contains(&self, cp: Codepoint) -> bool {
        self.start <= cp.0 && cp.0 <= self.end
    }
}

impl From<(u32, u32)> for CodepointRange {
    fn from((start, end): (u32, u32)) -> Self {
        Self::new(start, end)
    }
}

impl Display for CodepointRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "U+{:04X}..U+{:04X}", self.start, self.end)
    }
}

/// The three advance widths a glyph of the merged font may carry
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WidthClass {
    /// Empty or ignorable glyphs
    Zero,
    /// Half-width cell (Latin)
    En,
    /// Full-width cell (CJK and icons), twice [`WidthClass::En`]
    Cn,
}

impl WidthClass {
    /// Classify an advance width against the narrow and wide cell widths
    pub fn of(advance: u16, en_width: u16, cn_width: u16) -> Option<Self> {
        match advance {
            0 => Some(WidthClass::Zero),
            w if w == en_width => Some(WidthClass::En),
            w if w == cn_width => Some(WidthClass::Cn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codepoint() {
        let cp = Codepoint::new(0x0041);
        assert_eq!(cp.to_char(), Some('A'));
        assert_eq!(format!("{}", cp), "U+0041");
        assert!(cp.is_bmp());
        assert!(!Codepoint::new(0x20000).is_bmp());
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = CodepointRange::new(0xE0A0, 0xE0DF);
        assert!(range.contains(Codepoint::new(0xE0A0)));
        assert!(range.contains(Codepoint::new(0xE0DF)));
        assert!(!range.contains(Codepoint::new(0xE09F)));
        assert!(!range.contains(Codepoint::new(0xE0E0)));
        assert_eq!(format!("{}", range), "U+E0A0..U+E0DF");
    }

    #[test]
    fn test_width_class() {
        assert_eq!(WidthClass::of(0, 600, 1200), Some(WidthClass::Zero));
        assert_eq!(WidthClass::of(600, 600, 1200), Some(WidthClass::En));
        assert_eq!(WidthClass::of(1200, 600, 1200), Some(WidthClass::Cn));
        assert_eq!(WidthClass::of(601, 600, 1200), None);
    }
}
