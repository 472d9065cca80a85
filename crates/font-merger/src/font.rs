//! Editable in-memory font
//!
//! A [`Font`] holds everything the merge engine reads or changes: the glyph
//! order, outlines, horizontal metrics, the character map, the units-per-em
//! and the OS/2 capability bits. Fonts loaded with [`Font::from_bytes`] keep
//! their source data so [`Font::to_bytes`] can pass through every table the
//! engine does not rebuild.

use std::collections::{HashMap, HashSet};

use log::debug;
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::FontBuilder;

use crate::{
    MergeError, Result,
    glyph_order::{GlyphName, GlyphOrder},
    outline::{Outline, SimpleOutline},
    ranges::CapabilityRanges,
    tables::{cmap, cmap::CharMap, glyf, head, hmtx, maxp, os2, post},
    types::Codepoint,
};

/// Tables a font must have to be loaded
const REQUIRED_TABLES: [Tag; 6] = [
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
];

/// Tables rebuilt from the model on serialization
const REBUILT_TABLES: [Tag; 9] = [
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"cmap"),
    Tag::new(b"post"),
    Tag::new(b"OS/2"),
];

/// Tables of variable fonts; their per-glyph data cannot cover new glyphs
const VARIATION_TABLES: [Tag; 4] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
];

/// Tables with per-glyph data that would be stale after glyphs are added
const DROPPED_TABLES: [Tag; 5] = [
    Tag::new(b"hdmx"),
    Tag::new(b"LTSH"),
    Tag::new(b"vhea"),
    Tag::new(b"vmtx"),
    Tag::new(b"DSIG"),
];

/// Horizontal metrics of one glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metric {
    pub advance: u16,
    pub lsb: i16,
}

impl Metric {
    pub const fn new(advance: u16, lsb: i16) -> Self {
        Self { advance, lsb }
    }
}

#[derive(Debug, Clone)]
pub struct Font {
    source: Option<Vec<u8>>,
    glyph_order: GlyphOrder,
    outlines: HashMap<GlyphName, Outline>,
    /// Glyphs whose glyf data failed to decode
    undecodable: Vec<GlyphName>,
    metrics: HashMap<GlyphName, Metric>,
    cmap: CharMap,
    units_per_em: u16,
    capabilities: Option<CapabilityRanges>,
}

impl Font {
    /// An empty font with no source data
    ///
    /// Such a font can be edited and merged but not serialized.
    pub fn new(units_per_em: u16) -> Self {
        Self {
            source: None,
            glyph_order: GlyphOrder::new(),
            outlines: HashMap::new(),
            undecodable: Vec::new(),
            metrics: HashMap::new(),
            cmap: CharMap::new(),
            units_per_em,
            capabilities: None,
        }
    }

    /// Load a TrueType font
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let font = FontRef::new(data)?;

        for tag in REQUIRED_TABLES {
            if font.table_data(tag).is_some() {
                continue;
            }
            if tag == Tag::new(b"glyf")
                && (font.table_data(Tag::new(b"CFF ")).is_some()
                    || font.table_data(Tag::new(b"CFF2")).is_some())
            {
                return Err(MergeError::UnsupportedOutlines);
            }
            return Err(MergeError::MissingTable(tag));
        }

        let cmap_ids = cmap::read_cmap_ids(&font);
        let glyph_order = post::read_glyph_order(&font, &cmap_ids)?;
        let cmap = cmap::resolve_names(&cmap_ids, &glyph_order);
        let glyf::ReadOutlines { outlines, undecodable } = glyf::read_outlines(&font, &glyph_order)?;
        let metrics = hmtx::read_metrics(&font, &glyph_order)?;
        let units_per_em = font.head()?.units_per_em();
        let capabilities = os2::read_capabilities(&font);

        debug!(
            "loaded font: {} glyphs, {} cmap entries, {units_per_em} upem",
            glyph_order.len(),
            cmap.len()
        );

        Ok(Self {
            source: Some(data.to_vec()),
            glyph_order,
            outlines,
            undecodable,
            metrics,
            cmap,
            units_per_em,
            capabilities,
        })
    }

    /// Serialize the font
    ///
    /// Glyph-dependent tables are rebuilt from the model, stale per-glyph
    /// tables are dropped and everything else is copied from the source.
    ///
    /// Fails rather than write a glyph it could not decode, or variation
    /// data that no longer matches the glyph count.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let data = self.source.as_deref().ok_or(MergeError::NoSourceData)?;
        let font = FontRef::new(data)?;

        self.check_writable()?;
        let num_glyphs = self.glyph_order.len();
        if num_glyphs > u16::MAX as usize {
            return Err(MergeError::TooManyGlyphs(num_glyphs));
        }
        if num_glyphs != font.maxp()?.num_glyphs() as usize
            && let Some(tag) = self.variation_table()
        {
            return Err(MergeError::VariableFont(tag));
        }

        let (glyf, loca, loca_format) = glyf::build_glyf(&self.glyph_order, &self.outlines)?;
        let head = head::build_head(&font, &self.glyph_order, &self.outlines, loca_format)?;
        let maxp = maxp::build_maxp(&font, &self.glyph_order, &self.outlines)?;
        let hmtx = hmtx::build_hmtx(&self.glyph_order, &self.metrics);
        let hhea = hmtx::build_hhea(&font, &self.glyph_order, &self.metrics, &self.outlines)?;
        let cmap = cmap::build_cmap(&self.cmap, &self.glyph_order, font.cmap().ok().as_ref())?;
        let post = post::build_post(&font, &self.glyph_order);
        let os2 = os2::build_os2(&font, self.capabilities.as_ref(), &self.cmap)?;

        let mut builder = FontBuilder::new();
        builder.add_table(&head)?;
        builder.add_table(&maxp)?;
        builder.add_table(&cmap)?;
        builder.add_table(&hmtx)?;
        builder.add_table(&hhea)?;
        builder.add_table(&post)?;
        if let Some(os2) = os2 {
            builder.add_table(&os2)?;
        }
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        copy_other_tables(&mut builder, &font);

        Ok(builder.build())
    }

    /// Check that every glyph of the source decoded
    ///
    /// A glyph that failed to decode would be written back empty.
    pub fn check_writable(&self) -> Result<()> {
        match self.undecodable.first() {
            Some(name) => Err(MergeError::UndecodableGlyph(name.clone())),
            None => Ok(()),
        }
    }

    /// The first variation table of the source font, if it has one
    pub fn variation_table(&self) -> Option<Tag> {
        let font = FontRef::new(self.source.as_deref()?).ok()?;
        VARIATION_TABLES.into_iter().find(|tag| font.table_data(*tag).is_some())
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn glyph_order(&self) -> &GlyphOrder {
        &self.glyph_order
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyph_order.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyph_order.contains(name)
    }

    pub fn outline(&self, name: &str) -> Option<&Outline> {
        self.outlines.get(name)
    }

    pub fn outline_mut(&mut self, name: &str) -> Option<&mut Outline> {
        self.outlines.get_mut(name)
    }

    pub fn metric(&self, name: &str) -> Option<Metric> {
        self.metrics.get(name).copied()
    }

    /// Set the metrics of a glyph that is in the glyph order
    pub fn set_metric(&mut self, name: &str, metric: Metric) {
        if let Some(slot) = self.metrics.get_mut(name) {
            *slot = metric;
        } else if let Some(id) = self.glyph_order.id_of(name) {
            let key = self.glyph_order.names()[id].clone();
            self.metrics.insert(key, metric);
        }
    }

    pub fn cmap(&self) -> &CharMap {
        &self.cmap
    }

    pub fn cmap_mut(&mut self) -> &mut CharMap {
        &mut self.cmap
    }

    /// Glyph name mapped to a codepoint
    pub fn glyph_for(&self, cp: impl Into<Codepoint>) -> Option<&GlyphName> {
        self.cmap.get(&cp.into())
    }

    /// Map a codepoint to a glyph, replacing any existing mapping
    pub fn map_codepoint(&mut self, cp: impl Into<Codepoint>, name: impl Into<GlyphName>) {
        self.cmap.insert(cp.into(), name.into());
    }

    pub fn capabilities(&self) -> Option<&CapabilityRanges> {
        self.capabilities.as_ref()
    }

    pub fn capabilities_mut(&mut self) -> Option<&mut CapabilityRanges> {
        self.capabilities.as_mut()
    }

    pub fn set_capabilities(&mut self, capabilities: Option<CapabilityRanges>) {
        self.capabilities = capabilities;
    }

    /// Append a glyph to the end of the glyph order
    ///
    /// Returns `false` without touching the font if the name is taken.
    pub fn add_glyph(&mut self, name: impl Into<GlyphName>, outline: Outline, metric: Metric) -> bool {
        let name = name.into();
        if !self.glyph_order.push(name.clone()) {
            return false;
        }
        self.outlines.insert(name.clone(), outline);
        self.metrics.insert(name, metric);
        true
    }

    /// The outline of a glyph as plain contours
    ///
    /// Composites are expanded through their components. `None` if the
    /// glyph has no outline data or a component cannot be resolved.
    pub fn flattened_outline(&self, name: &str) -> Option<SimpleOutline> {
        glyf::flatten_outline(&self.outlines, name)
    }
}

fn copy_other_tables(builder: &mut FontBuilder, font: &FontRef) {
    let skipped: HashSet<Tag> = REBUILT_TABLES.into_iter().chain(DROPPED_TABLES).collect();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if skipped.contains(&tag) || builder.contains(tag) {
            if DROPPED_TABLES.contains(&tag) {
                debug!("dropping '{tag}' table");
            }
            continue;
        }
        if let Some(data) = font.table_data(tag) {
            builder.add_raw(tag, data.as_bytes().to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_glyph_never_overwrites() {
        let mut font = Font::new(1000);
        let outline = Outline::Simple(SimpleOutline::rect(0, 0, 500, 700));
        assert!(font.add_glyph("A", outline, Metric::new(600, 0)));
        assert!(!font.add_glyph("A", Outline::Empty, Metric::new(1200, 0)));

        assert_eq!(font.num_glyphs(), 1);
        assert_eq!(font.metric("A"), Some(Metric::new(600, 0)));
        assert!(font.outline("A").is_some_and(Outline::has_contours));
    }

    #[test]
    fn test_set_metric_ignores_unknown_glyphs() {
        let mut font = Font::new(1000);
        font.set_metric("ghost", Metric::new(600, 0));
        assert_eq!(font.metric("ghost"), None);
    }

    #[test]
    fn test_in_memory_font_cannot_serialize() {
        let font = Font::new(1000);
        assert!(matches!(font.to_bytes(), Err(MergeError::NoSourceData)));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(Font::from_bytes(b"not a font"), Err(MergeError::ReadError(_))));
    }
}
