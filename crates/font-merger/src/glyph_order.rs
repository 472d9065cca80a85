//! Glyph names and the ordered glyph list of a font
//!
//! Glyph names are the identity of a glyph inside the merge engine: the
//! importer, the cmap merger and composite components all refer to glyphs by
//! name, and glyph ids only exist again when a font is serialized.

use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

/// A glyph name, unique within one font
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for GlyphName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GlyphName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The ordered glyph names of a font
///
/// The position of a name is the glyph id it receives when the font is
/// written. Names are unique: [`GlyphOrder::from_names`] renames later
/// duplicates with a numeric suffix (e.g. "A.1") and [`GlyphOrder::push`]
/// refuses names that are already present.
#[derive(Debug, Clone, Default)]
pub struct GlyphOrder {
    names: Vec<GlyphName>,
    index: HashMap<GlyphName, usize>,
}

impl GlyphOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an order from raw names, disambiguating duplicates
    pub fn from_names(names: impl IntoIterator<Item = impl Into<GlyphName>>) -> Self {
        let mut order = Self::new();
        let mut seen: HashMap<GlyphName, usize> = HashMap::new();

        for name in names {
            let name = name.into();
            if order.push(name.clone()) {
                seen.insert(name, 1);
                continue;
            }
            let count = seen.entry(name.clone()).or_insert(1);
            loop {
                let candidate = GlyphName::new(format!("{name}.{count}"));
                *count += 1;
                if order.push(candidate) {
                    break;
                }
            }
        }

        order
    }

    /// Append a name; returns `false` (and leaves the order alone) if the
    /// name is already present
    pub fn push(&mut self, name: GlyphName) -> bool {
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The glyph id this name is written with
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: usize) -> Option<&GlyphName> {
        self.names.get(id)
    }

    pub fn names(&self) -> &[GlyphName] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
