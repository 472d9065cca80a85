//! OS/2 capability bitfield reconciliation

use log::debug;

use crate::font::Font;

/// The OS/2 Unicode-range and code-page bitfields of a font
///
/// `code_pages` is `None` for version 0 OS/2 tables, which have no code-page
/// words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityRanges {
    pub unicode: [u32; 4],
    pub code_pages: Option<[u32; 2]>,
}

impl CapabilityRanges {
    /// OR the other font's bits into these
    pub fn union_with(&mut self, other: &CapabilityRanges) {
        for (word, bits) in self.unicode.iter_mut().zip(other.unicode) {
            *word |= bits;
        }
        if let (Some(ours), Some(theirs)) = (self.code_pages.as_mut(), other.code_pages) {
            ours[0] |= theirs[0];
            ours[1] |= theirs[1];
        }
    }
}

/// Merge the donor's capability bitfields into the base
///
/// Only happens when both fonts carry an OS/2 table; code-page words are
/// merged only when both tables have them. Returns whether anything was
/// reconciled.
pub fn reconcile_ranges(base: &mut Font, donor: &Font) -> bool {
    let Some(theirs) = donor.capabilities().copied() else {
        debug!("donor has no OS/2 table, capability bits left unchanged");
        return false;
    };
    let Some(ours) = base.capabilities_mut() else {
        debug!("base has no OS/2 table, capability bits left unchanged");
        return false;
    };

    ours.union_with(&theirs);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_ors_every_word() {
        let mut base = CapabilityRanges { unicode: [0b0001, 0, 0, 0x10], code_pages: Some([1, 0]) };
        let donor =
            CapabilityRanges { unicode: [0b0110, 0x8000, 0, 0x01], code_pages: Some([0x40000, 2]) };

        base.union_with(&donor);

        assert_eq!(base.unicode, [0b0111, 0x8000, 0, 0x11]);
        assert_eq!(base.code_pages, Some([0x40001, 2]));
    }

    #[test]
    fn test_code_pages_need_both_tables() {
        let mut base = CapabilityRanges { unicode: [1, 0, 0, 0], code_pages: None };
        let donor = CapabilityRanges { unicode: [2, 0, 0, 0], code_pages: Some([0xFF, 0xFF]) };

        base.union_with(&donor);

        assert_eq!(base.unicode[0], 3);
        assert_eq!(base.code_pages, None);
    }

    #[test]
    fn test_reconcile_without_os2_is_noop() {
        let mut base = Font::new(1000);
        base.set_capabilities(Some(CapabilityRanges { unicode: [1, 0, 0, 0], code_pages: None }));
        let donor = Font::new(1000);

        assert!(!reconcile_ranges(&mut base, &donor));
        assert_eq!(base.capabilities().map(|c| c.unicode), Some([1, 0, 0, 0]));

        let mut bare = Font::new(1000);
        let mut rich = Font::new(1000);
        rich.set_capabilities(Some(CapabilityRanges { unicode: [4, 0, 0, 0], code_pages: None }));
        assert!(!reconcile_ranges(&mut bare, &rich));
        assert_eq!(bare.capabilities(), None);
    }

    #[test]
    fn test_reconcile_merges_bits() {
        let mut base = Font::new(1000);
        base.set_capabilities(Some(CapabilityRanges { unicode: [1, 0, 0, 0], code_pages: None }));
        let mut donor = Font::new(2048);
        donor.set_capabilities(Some(CapabilityRanges {
            unicode: [0, 0x0800_0000, 0, 0],
            code_pages: None,
        }));

        assert!(reconcile_ranges(&mut base, &donor));
        assert_eq!(base.capabilities().map(|c| c.unicode), Some([1, 0x0800_0000, 0, 0]));
    }
}
