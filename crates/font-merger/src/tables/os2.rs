//! OS/2 table: capability bitfields and character index range

use read_fonts::{FontRef, TableProvider};
use write_fonts::{from_obj::ToOwnedTable, tables::os2::Os2};

use crate::{Result, ranges::CapabilityRanges, tables::cmap::CharMap};

/// Read the Unicode-range and code-page words, if the font has an OS/2 table
pub(crate) fn read_capabilities(font: &FontRef) -> Option<CapabilityRanges> {
    let os2 = font.os2().ok()?;

    let code_pages = match (os2.ul_code_page_range_1(), os2.ul_code_page_range_2()) {
        (Some(first), Some(second)) => Some([first, second]),
        _ => None,
    };

    Some(CapabilityRanges {
        unicode: [
            os2.ul_unicode_range_1(),
            os2.ul_unicode_range_2(),
            os2.ul_unicode_range_3(),
            os2.ul_unicode_range_4(),
        ],
        code_pages,
    })
}

/// Rebuild OS/2 from the source table with the model's bitfields and the
/// first/last character index of the merged cmap
pub(crate) fn build_os2(
    font: &FontRef,
    capabilities: Option<&CapabilityRanges>,
    cmap: &CharMap,
) -> Result<Option<Os2>> {
    let Ok(source) = font.os2() else {
        return Ok(None);
    };
    let mut os2: Os2 = source.to_owned_table();

    if let Some(caps) = capabilities {
        let [r1, r2, r3, r4] = caps.unicode;
        os2.ul_unicode_range_1 = r1;
        os2.ul_unicode_range_2 = r2;
        os2.ul_unicode_range_3 = r3;
        os2.ul_unicode_range_4 = r4;
        if let (Some([c1, c2]), true) = (caps.code_pages, os2.ul_code_page_range_1.is_some()) {
            os2.ul_code_page_range_1 = Some(c1);
            os2.ul_code_page_range_2 = Some(c2);
        }
    }

    // Both fields are 16-bit; supplementary-plane codepoints saturate
    if let (Some(first), Some(last)) = (cmap.keys().next(), cmap.keys().next_back()) {
        os2.us_first_char_index = first.to_u32().min(0xFFFF) as u16;
        os2.us_last_char_index = last.to_u32().min(0xFFFF) as u16;
    }

    Ok(Some(os2))
}
