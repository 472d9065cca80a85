//! Twincell Core - build pipeline logic for Twincell fonts.

pub mod config;
pub mod io;
pub mod manifest;
pub mod parallel;
pub mod pipeline;
pub mod styles;

pub use config::{BuildConfig, BuildOverrides, DEFAULT_CONFIG_FILE};
pub use manifest::{FontManifest, ManifestEntry};
pub use pipeline::{
    BuildSummary, VariantOutput, WidthCensus, build_all, build_variant, merge_pair, verify_file,
};
pub use styles::{Variant, resolve_variants};
pub use twincell_font_merger::{CellConfig, MergeOutput, WidthClass, WidthViolation};
