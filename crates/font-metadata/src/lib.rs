//! Output font naming and monospace metadata.

use std::collections::BTreeMap;

use anyhow::Result;
use log::debug;
use read_fonts::TableProvider;
use twincell_font_ops::{rewrite_font, set_names};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{head::Head, os2::Os2, post::Post},
    types::Fixed,
};

/// Name table IDs.
const NAME_ID_COPYRIGHT: u16 = 0;
const NAME_ID_FAMILY: u16 = 1;
const NAME_ID_SUBFAMILY: u16 = 2;
const NAME_ID_UNIQUE_ID: u16 = 3;
const NAME_ID_FULL_NAME: u16 = 4;
const NAME_ID_VERSION: u16 = 5;
const NAME_ID_POSTSCRIPT: u16 = 6;
const NAME_ID_DESIGNER: u16 = 9;
const NAME_ID_DESCRIPTION: u16 = 10;
const NAME_ID_VENDOR_URL: u16 = 11;
const NAME_ID_LICENSE: u16 = 13;
const NAME_ID_LICENSE_URL: u16 = 14;
const NAME_ID_TYPO_FAMILY: u16 = 16;
const NAME_ID_TYPO_SUBFAMILY: u16 = 17;

const RIBBI: [&str; 4] = ["Regular", "Bold", "Italic", "Bold Italic"];

/// Free-form strings written to the name table when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontMetadata {
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub url: String,
    pub license: String,
    pub license_url: String,
}

/// Family and style naming of one output font.
#[derive(Debug, Clone)]
pub struct FontNaming<'a> {
    /// Family name, e.g. "Twincell Mono".
    pub family: &'a str,
    /// Style key used in file and PostScript names, e.g. "MediumItalic".
    pub style_key: &'a str,
    /// Human readable style, e.g. "Medium Italic".
    pub display_name: &'a str,
    pub version: &'a str,
    pub metadata: &'a FontMetadata,
}

impl FontNaming<'_> {
    /// Whether the style is one of the four style-linked styles.
    pub fn is_ribbi(&self) -> bool {
        RIBBI.contains(&self.display_name)
    }

    /// `"{family-without-spaces}-{style key}"`
    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.family.replace(' ', ""), self.style_key)
    }

    /// Output file name, `"{postscript name}.ttf"`.
    pub fn file_name(&self) -> String {
        format!("{}.ttf", self.postscript_name())
    }

    pub fn version_string(&self) -> String {
        format!("Version {}", self.version)
    }

    /// All name strings this naming sets, by name id.
    pub fn name_strings(&self) -> BTreeMap<u16, String> {
        let version_string = self.version_string();
        let postscript_name = self.postscript_name();

        let mut names = BTreeMap::from([
            (NAME_ID_UNIQUE_ID, format!("{version_string};{postscript_name}")),
            (NAME_ID_FULL_NAME, format!("{} {}", self.family, self.display_name)),
            (NAME_ID_VERSION, version_string),
            (NAME_ID_POSTSCRIPT, postscript_name),
        ]);

        if self.is_ribbi() {
            names.insert(NAME_ID_FAMILY, self.family.to_string());
            names.insert(NAME_ID_SUBFAMILY, self.display_name.to_string());
        } else {
            // "Medium Italic" becomes family "X Medium" with subfamily "Italic"
            let (weight, italic) = match self.display_name.strip_suffix(" Italic") {
                Some(weight) => (weight, true),
                None => (self.display_name, false),
            };
            names.insert(NAME_ID_FAMILY, format!("{} {weight}", self.family));
            names.insert(NAME_ID_SUBFAMILY, if italic { "Italic" } else { "Regular" }.to_string());
            names.insert(NAME_ID_TYPO_FAMILY, self.family.to_string());
            names.insert(NAME_ID_TYPO_SUBFAMILY, self.display_name.to_string());
        }

        let metadata = self.metadata;
        for (id, value) in [
            (NAME_ID_COPYRIGHT, &metadata.copyright),
            (NAME_ID_DESIGNER, &metadata.author),
            (NAME_ID_DESCRIPTION, &metadata.description),
            (NAME_ID_VENDOR_URL, &metadata.url),
            (NAME_ID_LICENSE, &metadata.license),
            (NAME_ID_LICENSE_URL, &metadata.license_url),
        ] {
            if !value.is_empty() {
                names.insert(id, value.clone());
            }
        }

        names
    }

    /// Apply the naming to font data.
    ///
    /// Rewrites the name table and, when the version is numeric,
    /// `head.fontRevision`.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let names = self.name_strings();
        debug!("{}: setting {} name records", self.postscript_name(), names.len());
        let data = set_names(data, &names)?;

        match revision(self.version) {
            Some(font_revision) => rewrite_font(&data, |font, builder| {
                if let Ok(head) = font.head() {
                    let mut new_head: Head = head.to_owned_table();
                    new_head.font_revision = font_revision;
                    builder.add_table(&new_head)?;
                }
                Ok(())
            }),
            None => Ok(data),
        }
    }
}

/// Font revision for a numeric version string such as "1.0" or "2.105".
pub fn revision(version: &str) -> Option<Fixed> {
    version.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(Fixed::from_f64)
}

/// Monospace metadata settings.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceSettings {
    /// Average character width, the narrow cell width.
    pub width: i16,
    /// PANOSE proportion value (9 = monospace).
    pub panose_proportion: u8,
}

impl Default for MonospaceSettings {
    fn default() -> Self {
        Self::new(600)
    }
}

impl MonospaceSettings {
    pub fn new(width: u16) -> Self {
        Self { width: i16::try_from(width).unwrap_or(i16::MAX), panose_proportion: 9 }
    }

    /// Apply monospace settings to font data.
    ///
    /// Sets `post.isFixedPitch` and the OS/2 average width and PANOSE
    /// proportion.
    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let width = self.width;
        let proportion = self.panose_proportion;

        rewrite_font(data, |font, builder| {
            if let Ok(post) = font.post() {
                let mut new_post: Post = post.to_owned_table();
                new_post.is_fixed_pitch = 1;
                builder.add_table(&new_post)?;
            }

            if let Ok(os2) = font.os2() {
                let mut new_os2: Os2 = os2.to_owned_table();
                new_os2.panose_10[3] = proportion;
                new_os2.x_avg_char_width = width;
                builder.add_table(&new_os2)?;
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::FontRef;
    use twincell_font_ops::read_name;
    use write_fonts::{FontBuilder, tables::maxp::Maxp};

    use super::*;

    fn naming<'a>(style_key: &'a str, display_name: &'a str, metadata: &'a FontMetadata) -> FontNaming<'a> {
        FontNaming { family: "Twincell Mono", style_key, display_name, version: "1.2", metadata }
    }

    fn bare_font() -> Vec<u8> {
        let mut builder = FontBuilder::new();
        builder.add_table(&Maxp::new(3)).unwrap();
        builder.add_table(&Post::new_v2([".notdef", "A", "B"])).unwrap();
        builder.build()
    }

    #[test]
    fn test_ribbi_names() {
        let metadata = FontMetadata::default();
        let names = naming("BoldItalic", "Bold Italic", &metadata).name_strings();

        assert_eq!(names[&1], "Twincell Mono");
        assert_eq!(names[&2], "Bold Italic");
        assert_eq!(names[&3], "Version 1.2;TwincellMono-BoldItalic");
        assert_eq!(names[&4], "Twincell Mono Bold Italic");
        assert_eq!(names[&5], "Version 1.2");
        assert_eq!(names[&6], "TwincellMono-BoldItalic");
        assert!(!names.contains_key(&16));
        assert!(!names.contains_key(&17));
    }

    #[test]
    fn test_non_ribbi_names() {
        let metadata = FontMetadata::default();
        let names = naming("MediumItalic", "Medium Italic", &metadata).name_strings();

        assert_eq!(names[&1], "Twincell Mono Medium");
        assert_eq!(names[&2], "Italic");
        assert_eq!(names[&16], "Twincell Mono");
        assert_eq!(names[&17], "Medium Italic");

        let names = naming("Light", "Light", &metadata).name_strings();
        assert_eq!(names[&1], "Twincell Mono Light");
        assert_eq!(names[&2], "Regular");
    }

    #[test]
    fn test_metadata_only_when_set() {
        let metadata = FontMetadata {
            author: "Someone".into(),
            license_url: "https://openfontlicense.org".into(),
            ..Default::default()
        };
        let names = naming("Regular", "Regular", &metadata).name_strings();

        assert_eq!(names[&9], "Someone");
        assert_eq!(names[&14], "https://openfontlicense.org");
        assert!(!names.contains_key(&0));
        assert!(!names.contains_key(&13));
    }

    #[test]
    fn test_file_name() {
        let metadata = FontMetadata::default();
        assert_eq!(naming("Regular", "Regular", &metadata).file_name(), "TwincellMono-Regular.ttf");
    }

    #[test]
    fn test_apply_writes_name_table() {
        let metadata = FontMetadata::default();
        let result = naming("Medium", "Medium", &metadata).apply(&bare_font()).unwrap();

        assert_eq!(read_name(&result, 1).unwrap().as_deref(), Some("Twincell Mono Medium"));
        assert_eq!(read_name(&result, 6).unwrap().as_deref(), Some("TwincellMono-Medium"));
        assert_eq!(read_name(&result, 17).unwrap().as_deref(), Some("Medium"));
    }

    #[test]
    fn test_revision() {
        let rev = revision("2.105").unwrap();
        assert!((rev.to_f64() - 2.105).abs() < 0.0001);
        assert!(revision("2024-01-15").is_none());
    }

    #[test]
    fn test_apply_monospace() {
        let result = MonospaceSettings::new(600).apply(&bare_font()).unwrap();
        let font = FontRef::new(&result).unwrap();
        assert_eq!(font.post().unwrap().is_fixed_pitch(), 1);
    }

    #[test]
    fn test_monospace_default() {
        let settings = MonospaceSettings::default();
        assert_eq!(settings.width, 600);
        assert_eq!(settings.panose_proportion, 9);
    }
}
