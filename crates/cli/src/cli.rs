//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use twincell_core::{
    BuildConfig, BuildOverrides, CellConfig, DEFAULT_CONFIG_FILE, build_all, merge_pair,
    verify_file,
};

#[derive(Parser)]
#[command(name = "twincell-fonts")]
#[command(about = "Merge CJK glyphs into a monospace font with a 2:1 cell width ratio")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    /// Config file; defaults apply when it does not exist
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Comma-separated styles to build (default: from config or all)
    #[arg(long, value_delimiter = ',')]
    pub styles: Option<Vec<String>>,
    /// Directory containing source fonts
    #[arg(long)]
    pub fonts_dir: Option<PathBuf>,
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
    /// Number of styles built at once
    #[arg(long)]
    pub parallel: Option<usize>,
    /// Fail a style whose glyph widths are not all 0, en or cn width
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct WidthArgs {
    #[arg(long, default_value_t = 600)]
    pub en_width: u16,
    #[arg(long, default_value_t = 1200)]
    pub cn_width: u16,
}

impl WidthArgs {
    fn check_ratio(&self) -> Result<()> {
        if u32::from(self.cn_width) != 2 * u32::from(self.en_width) {
            bail!("--cn-width ({}) must be twice --en-width ({})", self.cn_width, self.en_width);
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every configured style
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Merge one donor font into one base font
    Merge {
        /// Base font (Latin and icons)
        #[arg(long)]
        base: PathBuf,
        /// Donor font (CJK)
        #[arg(long)]
        donor: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        widths: WidthArgs,
        #[arg(long, default_value_t = 1.02)]
        fill_factor: f64,
    },
    /// Check that every glyph width is 0, en or cn width
    Verify {
        #[arg(required = true)]
        fonts: Vec<PathBuf>,
        #[command(flatten)]
        widths: WidthArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                let config = BuildConfig::load(&args.config)?.with_overrides(BuildOverrides {
                    styles: args.styles,
                    fonts_dir: args.fonts_dir,
                    output_dir: args.output_dir,
                    parallel: args.parallel,
                    strict: args.strict,
                });
                let summary = build_all(&config)?;
                for output in &summary.outputs {
                    println!(
                        "  {}: {} ({} glyphs imported)",
                        output.variant.key,
                        output.path.display(),
                        output.imported
                    );
                }
            }
            Commands::Merge { base, donor, output, widths, fill_factor } => {
                widths.check_ratio()?;
                let cell = CellConfig::new()
                    .en_width(widths.en_width)
                    .cn_width(widths.cn_width)
                    .fill_factor(fill_factor);
                let merged = merge_pair(&base, &donor, &output, cell)?;

                println!(
                    "Merged {} glyphs ({} skipped), {} icons resized, {} CJK glyphs centered",
                    merged.merge.import.imported_count(),
                    merged.merge.import.skipped.len(),
                    merged.finalize.icons.powerline + merged.finalize.icons.scaled,
                    merged.finalize.centered
                );
                for violation in merged.violations.iter().take(10) {
                    println!("  {violation}");
                }
                println!("Saved: {}", output.display());
            }
            Commands::Verify { fonts, widths } => {
                widths.check_ratio()?;
                let mut failed = 0;
                for path in &fonts {
                    let census = verify_file(path, widths.en_width, widths.cn_width)?;
                    println!(
                        "{}: {} zero, {} en, {} cn, {} unexpected",
                        path.display(),
                        census.zero,
                        census.en,
                        census.cn,
                        census.violations.len()
                    );
                    for violation in &census.violations {
                        println!("  {violation}");
                    }
                    if !census.violations.is_empty() {
                        failed += 1;
                    }
                }
                if failed > 0 {
                    bail!("{failed} of {} fonts have unexpected glyph widths", fonts.len());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_styles() {
        let cli = Cli::parse_from(["twincell-fonts", "build", "--styles", "Regular,Medium", "--strict"]);
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.styles, Some(vec!["Regular".to_string(), "Medium".to_string()]));
        assert!(args.strict);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(args.parallel, None);
    }

    #[test]
    fn test_parse_merge() {
        let cli = Cli::parse_from([
            "twincell-fonts", "merge", "--base", "a.ttf", "--donor", "b.ttf", "-o", "c.ttf",
            "--en-width", "500", "--cn-width", "1000",
        ]);
        let Commands::Merge { widths, fill_factor, .. } = cli.command else {
            panic!("expected merge");
        };
        assert_eq!((widths.en_width, widths.cn_width), (500, 1000));
        assert_eq!(fill_factor, 1.02);
    }

    #[test]
    fn test_ratio_checked() {
        let widths = WidthArgs { en_width: 600, cn_width: 1000 };
        assert!(widths.check_ratio().is_err());
    }
}
