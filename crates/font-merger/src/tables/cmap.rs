//! cmap reading, merging and building

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::{Cmap as ReadCmap, CmapSubtable, PlatformId},
    types::GlyphId,
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::cmap::{
        Cmap, Cmap12, CmapSubtable as WriteCmapSubtable, EncodingRecord,
        PlatformId as WritePlatformId, SequentialMapGroup,
    },
};

use crate::{
    Result,
    glyph_order::{GlyphName, GlyphOrder},
    types::Codepoint,
};

/// Codepoint to glyph name mapping of one font
pub type CharMap = BTreeMap<Codepoint, GlyphName>;

/// Read the best Unicode subtable of the font's cmap as (codepoint, glyph id)
/// pairs
///
/// A font without a cmap (or without a usable subtable) maps nothing.
pub(crate) fn read_cmap_ids(font: &FontRef) -> Vec<(Codepoint, u32)> {
    let Ok(cmap) = font.cmap() else {
        return Vec::new();
    };
    find_best_subtable(&cmap)
        .map(|subtable| iter_cmap_subtable(&subtable))
        .unwrap_or_default()
}

/// Resolve glyph ids of a raw cmap to glyph names
pub(crate) fn resolve_names(ids: &[(Codepoint, u32)], order: &GlyphOrder) -> CharMap {
    ids.iter()
        .filter_map(|(cp, gid)| Some((*cp, order.get(*gid as usize)?.clone())))
        .collect()
}

/// Add donor mappings for imported glyphs to the base cmap
///
/// A donor mapping is taken only when its glyph was imported and the base
/// does not map the codepoint yet; base mappings are never replaced.
/// Returns the number of mappings added.
pub fn merge_cmap(base: &mut CharMap, donor: &CharMap, imported: &HashSet<GlyphName>) -> usize {
    let mut added = 0;

    for (cp, name) in donor {
        if !imported.contains(name) {
            continue;
        }
        if base.contains_key(cp) {
            debug!("{cp}: already mapped in base, keeping base glyph");
            continue;
        }
        base.insert(*cp, name.clone());
        added += 1;
    }

    added
}

/// Header of a format 4 subtable plus its 0xFFFF terminator segment
const FORMAT4_FIXED_LEN: usize = 16 + 8;

/// Build the cmap table
///
/// The BMP goes into format 4 subtables on (0,3) and (3,1), with format 12 on
/// (0,4) and (3,10) added when supplementary codepoints are mapped. A BMP
/// repertoire too fragmented for a 16-bit format 4 length is written as
/// format 12 only. Format 14 variation sequences of the source are kept:
/// existing glyph ids never change, so their mappings stay valid.
pub(crate) fn build_cmap(
    cmap: &CharMap,
    order: &GlyphOrder,
    source: Option<&ReadCmap>,
) -> Result<Cmap> {
    let mappings: Vec<(u32, u32)> = cmap
        .iter()
        .filter_map(|(cp, name)| Some((cp.to_u32(), order.id_of(name)? as u32)))
        .collect();

    let mut records = if fits_format4(&mappings) {
        let chars = mappings
            .iter()
            .filter_map(|&(cp, gid)| Some((char::from_u32(cp)?, GlyphId::new(gid))));
        Cmap::from_mappings(chars)?.encoding_records
    } else {
        warn!("{} mappings do not fit a format 4 subtable, writing format 12 only", mappings.len());
        format12_records(&mappings)
    };

    if let Some(source) = source {
        records.extend(variation_records(source));
    }
    records.sort_by_key(|record| (record.platform_id as u16, record.encoding_id));

    Ok(Cmap::new(records))
}

/// Whether the BMP part of `mappings` stays under the format 4 size limit
fn fits_format4(mappings: &[(u32, u32)]) -> bool {
    let bmp: Vec<(u32, u32)> = mappings.iter().copied().filter(|&(cp, _)| cp <= 0xFFFF).collect();
    FORMAT4_FIXED_LEN + 8 * build_sequential_groups(&bmp).len() <= u16::MAX as usize
}

fn format12_records(mappings: &[(u32, u32)]) -> Vec<EncodingRecord> {
    let cmap12 = Cmap12 { language: 0, groups: build_sequential_groups(mappings) };
    vec![
        EncodingRecord::new(
            WritePlatformId::Unicode,
            4,
            WriteCmapSubtable::Format12(cmap12.clone()),
        ),
        EncodingRecord::new(WritePlatformId::Windows, 10, WriteCmapSubtable::Format12(cmap12)),
    ]
}

/// Format 14 (Unicode variation sequence) records of a source cmap
fn variation_records(source: &ReadCmap) -> Vec<EncodingRecord> {
    let owned: Cmap = source.to_owned_table();
    owned
        .encoding_records
        .into_iter()
        .filter(|record| matches!(record.subtable.as_ref(), WriteCmapSubtable::Format14(_)))
        .collect()
}

/// Group codepoint-sorted (codepoint, glyph id) pairs into runs where both
/// increase by one.
fn build_sequential_groups(mappings: &[(u32, u32)]) -> Vec<SequentialMapGroup> {
    let Some(&(first_cp, first_gid)) = mappings.first() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let (mut start_cp, mut start_gid) = (first_cp, first_gid);
    let (mut prev_cp, mut prev_gid) = (first_cp, first_gid);

    for &(cp, gid) in &mappings[1..] {
        if cp == prev_cp + 1 && gid == prev_gid + 1 {
            prev_cp = cp;
            prev_gid = gid;
        } else {
            groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));
            (start_cp, start_gid) = (cp, gid);
            (prev_cp, prev_gid) = (cp, gid);
        }
    }
    groups.push(SequentialMapGroup::new(start_cp, prev_cp, start_gid));

    groups
}

fn find_best_subtable<'a>(cmap: &'a ReadCmap<'a>) -> Option<CmapSubtable<'a>> {
    let records = cmap.encoding_records();

    // Format 12 (full Unicode) first
    for record in records {
        if (record.platform_id() == PlatformId::Unicode
            || (record.platform_id() == PlatformId::Windows && record.encoding_id() == 10))
            && let Ok(subtable) = record.subtable(cmap.offset_data())
            && matches!(subtable, CmapSubtable::Format12(_))
        {
            return Some(subtable);
        }
    }

    // Then format 4 (BMP)
    for record in records {
        if (record.platform_id() == PlatformId::Unicode
            || (record.platform_id() == PlatformId::Windows && record.encoding_id() == 1))
            && let Ok(subtable) = record.subtable(cmap.offset_data())
            && matches!(subtable, CmapSubtable::Format4(_))
        {
            return Some(subtable);
        }
    }

    records.iter().find_map(|r| r.subtable(cmap.offset_data()).ok())
}

fn iter_cmap_subtable(subtable: &CmapSubtable) -> Vec<(Codepoint, u32)> {
    let mut mappings = Vec::new();

    match subtable {
        CmapSubtable::Format4(f4) => {
            let end_codes = f4.end_code();
            let start_codes = f4.start_code();
            let id_deltas = f4.id_delta();
            let id_range_offsets = f4.id_range_offsets();
            let glyph_id_array = f4.glyph_id_array();

            let seg_count = f4.seg_count_x2() as usize / 2;
            for seg in 0..seg_count {
                let end_code = end_codes.get(seg).map(|v| v.get()).unwrap_or(0xFFFF);
                let start_code = start_codes.get(seg).map(|v| v.get()).unwrap_or(0);
                let id_delta = id_deltas.get(seg).map(|v| v.get()).unwrap_or(0);
                let id_range_offset = id_range_offsets.get(seg).map(|v| v.get()).unwrap_or(0);

                if start_code == 0xFFFF || start_code > end_code {
                    continue;
                }

                for cp in start_code..=end_code {
                    let gid = if id_range_offset == 0 {
                        ((cp as i32 + id_delta as i32) & 0xFFFF) as u16
                    } else {
                        let glyph_idx = (id_range_offset as usize / 2 + (cp - start_code) as usize)
                            .checked_sub(seg_count - seg);
                        match glyph_idx.and_then(|i| glyph_id_array.get(i)).map(|g| g.get()) {
                            Some(0) | None => 0,
                            Some(gid) => ((gid as i32 + id_delta as i32) & 0xFFFF) as u16,
                        }
                    };

                    if gid != 0 {
                        mappings.push((Codepoint::new(cp as u32), gid as u32));
                    }
                }
            }
        }
        CmapSubtable::Format12(f12) => {
            for group in f12.groups() {
                let mut gid = group.start_glyph_id();
                for cp in group.start_char_code()..=group.end_char_code() {
                    if gid != 0 {
                        mappings.push((Codepoint::new(cp), gid));
                    }
                    gid += 1;
                }
            }
        }
        CmapSubtable::Format6(f6) => {
            let first = f6.first_code() as u32;
            for (i, gid) in f6.glyph_id_array().iter().enumerate() {
                let gid = gid.get();
                if gid != 0 {
                    mappings.push((Codepoint::new(first + i as u32), gid as u32));
                }
            }
        }
        _ => {}
    }

    mappings
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontData, FontRead};

    use super::*;

    fn charmap(entries: &[(u32, &str)]) -> CharMap {
        entries.iter().map(|(cp, name)| (Codepoint::new(*cp), GlyphName::new(*name))).collect()
    }

    #[test]
    fn test_merge_cmap_base_wins() {
        let mut base = charmap(&[(0x41, "A"), (0x4F60, "base4F60")]);
        let donor = charmap(&[(0x4F60, "uni4F60"), (0x597D, "uni597D"), (0x42, "B")]);
        let imported: HashSet<GlyphName> =
            ["uni4F60", "uni597D"].into_iter().map(GlyphName::new).collect();

        let added = merge_cmap(&mut base, &donor, &imported);

        assert_eq!(added, 1);
        assert_eq!(base.get(&Codepoint::new(0x4F60)).map(GlyphName::as_str), Some("base4F60"));
        assert_eq!(base.get(&Codepoint::new(0x597D)).map(GlyphName::as_str), Some("uni597D"));
        // Not imported, so not mapped
        assert!(!base.contains_key(&Codepoint::new(0x42)));
    }

    #[test]
    fn test_merge_cmap_nothing_imported() {
        let mut base = charmap(&[(0x41, "A")]);
        let donor = charmap(&[(0x4E00, "uni4E00")]);
        assert_eq!(merge_cmap(&mut base, &donor, &HashSet::new()), 0);
        assert_eq!(base.len(), 1);
    }

    #[test]
    fn test_sequential_groups() {
        let groups = build_sequential_groups(&[(0x41, 1), (0x42, 2), (0x43, 3), (0x61, 4), (0x62, 6)]);
        assert_eq!(
            groups,
            vec![
                SequentialMapGroup::new(0x41, 0x43, 1),
                SequentialMapGroup::new(0x61, 0x61, 4),
                SequentialMapGroup::new(0x62, 0x62, 6),
            ]
        );
        assert!(build_sequential_groups(&[]).is_empty());
    }

    fn record_layout(cmap: &Cmap) -> Vec<(u16, u16, u16)> {
        cmap.encoding_records
            .iter()
            .map(|record| {
                let format = match record.subtable.as_ref() {
                    WriteCmapSubtable::Format4(_) => 4,
                    WriteCmapSubtable::Format12(_) => 12,
                    WriteCmapSubtable::Format14(_) => 14,
                    _ => 0,
                };
                (record.platform_id as u16, record.encoding_id, format)
            })
            .collect()
    }

    #[test]
    fn test_build_cmap_skips_unknown_glyphs() {
        let order = GlyphOrder::from_names([".notdef", "A"]);
        let cmap = build_cmap(&charmap(&[(0x41, "A"), (0x42, "missing")]), &order, None).unwrap();

        assert_eq!(record_layout(&cmap), vec![(0, 3, 4), (3, 1, 4)]);

        let bytes = write_fonts::dump_table(&cmap).unwrap();
        let read = ReadCmap::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.map_codepoint(0x41u32), Some(GlyphId::new(1)));
        assert_eq!(read.map_codepoint(0x42u32), None);
    }

    #[test]
    fn test_build_cmap_adds_format12_for_supplementary() {
        let order = GlyphOrder::from_names([".notdef", "A", "u20000"]);
        let cmap =
            build_cmap(&charmap(&[(0x41, "A"), (0x20000, "u20000")]), &order, None).unwrap();

        assert_eq!(record_layout(&cmap), vec![(0, 3, 4), (0, 4, 12), (3, 1, 4), (3, 10, 12)]);
    }

    #[test]
    fn test_fragmented_bmp_falls_back_to_format12() {
        // Every codepoint its own run
        let sparse: Vec<(u32, u32)> = (0..9000).map(|i| (i * 2, i + 1)).collect();
        assert!(!fits_format4(&sparse));
        assert!(fits_format4(&sparse[..100]));

        let layout: Vec<_> =
            format12_records(&sparse).iter().map(|r| (r.platform_id as u16, r.encoding_id)).collect();
        assert_eq!(layout, vec![(0, 4), (3, 10)]);
    }
}
