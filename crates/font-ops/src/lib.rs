//! Table-level font rewriting and name table utilities.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use read_fonts::{
    FontRef, TableProvider,
    types::{NameId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

/// Windows platform, Unicode BMP encoding, US English.
const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_EN_US: u16 = 0x409;

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// Tables added by `f` replace the copied ones.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Map name table records using a transformation function.
///
/// The mapper receives `(name_id, current_string)` and returns:
/// - `Some(new_string)` to replace the record's string
/// - `None` to keep the current string unchanged
///
/// Records whose string cannot be decoded are dropped.
pub fn map_name_records(
    font: &FontRef,
    mut mapper: impl FnMut(u16, &str) -> Option<String>,
) -> Result<Name> {
    let name = font.name().context("Font has no name table")?;
    let mut new_records = Vec::new();

    for record in name.name_record() {
        let name_id = record.name_id().to_u16();
        let current = match record.string(name.string_data()) {
            Ok(s) => s.chars().collect::<String>(),
            Err(_) => continue,
        };

        let new_string = mapper(name_id, &current).unwrap_or(current);

        new_records.push(NameRecord::new(
            record.platform_id(),
            record.encoding_id(),
            record.language_id(),
            NameId::new(name_id),
            new_string.into(),
        ));
    }

    Ok(sorted_name(new_records))
}

/// Set name strings by id.
///
/// Every existing record of a listed id is rewritten, on every platform.
/// Ids without any record get a new Windows Unicode BMP en-US record. A font
/// without a name table gets one with just the listed strings.
pub fn set_names(data: &[u8], names: &BTreeMap<u16, String>) -> Result<Vec<u8>> {
    rewrite_font(data, |font, builder| {
        let mut records = if font.table_data(Tag::new(b"name")).is_some() {
            map_name_records(font, |name_id, _| names.get(&name_id).cloned())?.name_record
        } else {
            Vec::new()
        };

        let present: BTreeSet<u16> = records.iter().map(|r| r.name_id.to_u16()).collect();
        for (&name_id, value) in names {
            if present.contains(&name_id) {
                continue;
            }
            records.push(NameRecord::new(
                WINDOWS_PLATFORM,
                WINDOWS_UNICODE_BMP,
                WINDOWS_EN_US,
                NameId::new(name_id),
                value.clone().into(),
            ));
        }

        builder.add_table(&sorted_name(records))?;
        Ok(())
    })
}

/// Read the Windows English string for a name id, falling back to any
/// decodable record with that id.
pub fn read_name(data: &[u8], name_id: u16) -> Result<Option<String>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let Ok(name) = font.name() else {
        return Ok(None);
    };

    let mut fallback = None;
    for record in name.name_record() {
        if record.name_id().to_u16() != name_id {
            continue;
        }
        let Ok(s) = record.string(name.string_data()) else {
            continue;
        };
        let value: String = s.chars().collect();
        if record.platform_id() == WINDOWS_PLATFORM && record.language_id() == WINDOWS_EN_US {
            return Ok(Some(value));
        }
        fallback.get_or_insert(value);
    }

    Ok(fallback)
}

/// Name records must be sorted by platform, encoding, language and name id.
fn sorted_name(mut records: Vec<NameRecord>) -> Name {
    records.sort_by_key(|r| (r.platform_id, r.encoding_id, r.language_id, r.name_id));
    Name::new(records)
}
