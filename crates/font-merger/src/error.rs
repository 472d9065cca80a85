use std::result;

use read_fonts::{ReadError, types::Tag};
use thiserror::Error;
use write_fonts::{BuilderError, error, tables::cmap::CmapConflict};

use crate::glyph_order::GlyphName;

/// Fatal errors of the merge engine.
///
/// Per-glyph anomalies of the donor (name collisions, missing outline data)
/// and width violations are never errors; they are collected into reports
/// instead.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("failed to write font: {0}")]
    WriteError(#[from] error::Error),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("required table '{0}' not found")]
    MissingTable(Tag),

    #[error("only TrueType (glyf) outlines are supported")]
    UnsupportedOutlines,

    #[error("variable fonts cannot take new glyphs ('{0}' table present)")]
    VariableFont(Tag),

    #[error("glyph '{0}' has glyf data that cannot be decoded")]
    UndecodableGlyph(GlyphName),

    #[error("failed to build cmap: {0}")]
    CmapBuild(#[from] CmapConflict),

    #[error("font has no source data and cannot be serialized")]
    NoSourceData,

    #[error("merged font would contain {0} glyphs (maximum is 65535)")]
    TooManyGlyphs(usize),
}

pub type Result<T> = result::Result<T, MergeError>;
