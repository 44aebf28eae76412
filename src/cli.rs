//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::color::Color;
use crate::deck::{Deck, RenderConfig};
use crate::error::SlideError;

/// Instagram carousel maker: render phrases as square slides, or have Gemini write them.
#[derive(Parser, Debug)]
#[command(name = "carosello", version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output (debug logging unless `RUST_LOG` is set).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render phrases as 1080x1080 JPEG slides and export them.
    Render(RenderArgs),
    /// Ask Gemini for phrases in a given style.
    Generate(GenerateArgs),
    /// Serve `POST /api/generate` over HTTP.
    Serve(ServeArgs),
}

/// Options for `render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// One phrase per slide.
    #[arg(conflicts_with = "slides_file")]
    pub phrases: Vec<String>,

    /// File with one phrase per line.
    #[arg(short = 'f', long)]
    pub slides_file: Option<PathBuf>,

    /// Per-slide font size as `INDEX=SIZE` (1-based). Repeatable.
    #[arg(long = "slide-font-size", value_name = "INDEX=SIZE", value_parser = parse_slide_size)]
    pub slide_font_sizes: Vec<(usize, u32)>,

    /// Render one slide in bold (1-based index). Repeatable.
    #[arg(long = "slide-bold", value_name = "INDEX")]
    pub slide_bold: Vec<usize>,

    /// Slide styling.
    #[command(flatten)]
    pub style: StyleArgs,

    /// Export destination.
    #[command(flatten)]
    pub export: ExportArgs,
}

/// Options for `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Style instructions for the model.
    #[arg(short, long, conflicts_with = "style_file")]
    pub style: Option<String>,

    /// File containing the style instructions.
    #[arg(long, conflicts_with = "style")]
    pub style_file: Option<PathBuf>,

    /// Extra topic or context.
    pub topic: Option<String>,

    /// Model name or short alias (defaults to `[defaults] model`).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the phrases as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Also render the phrases and export the deck.
    #[arg(long)]
    pub render: bool,

    /// Slide styling, used with `--render`.
    #[command(flatten)]
    pub slide_style: StyleArgs,

    /// Export destination, used with `--render`.
    #[command(flatten)]
    pub export: ExportArgs,
}

/// Options for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (defaults to `[server] bind`).
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Model name or short alias (defaults to `[defaults] model`).
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Deck-wide styling flags. Unset flags fall back to `[defaults]`.
#[derive(Args, Debug, Default)]
pub struct StyleArgs {
    /// Background color (#RRGGBB).
    #[arg(long)]
    pub background: Option<String>,

    /// Text color (#RRGGBB).
    #[arg(long)]
    pub foreground: Option<String>,

    /// Base font size in pixels (24-120).
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Bold text.
    #[arg(long, overrides_with = "no_bold")]
    pub bold: bool,

    /// Regular weight, even when `[defaults] bold` is set.
    #[arg(long, overrides_with = "bold")]
    pub no_bold: bool,

    /// Regular TTF/OTF font (defaults to `[fonts] regular`, then a built-in face).
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Bold TTF/OTF font (defaults to `[fonts] bold`).
    #[arg(long)]
    pub bold_font: Option<PathBuf>,
}

/// Where exported slides go.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Archive path used when the slides are not shared.
    #[arg(short, long)]
    pub zip: Option<PathBuf>,

    /// Skip the share command and always write an archive.
    #[arg(long)]
    pub no_share: bool,

    /// Write loose slide files into this directory instead.
    #[arg(short, long, conflicts_with_all = ["zip", "no_share"])]
    pub out_dir: Option<PathBuf>,
}

impl RenderArgs {
    /// Resolve the phrases from positional arguments or the slides file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is provided, or if the file cannot be read.
    pub fn resolve_phrases(&self) -> Result<Vec<String>, SlideError> {
        if !self.phrases.is_empty() {
            Ok(self.phrases.clone())
        } else if let Some(ref path) = self.slides_file {
            let text = std::fs::read_to_string(path)?;
            Ok(text.lines().map(str::to_string).collect())
        } else {
            Err(SlideError::InvalidArgument(
                "Provide phrases or use -f/--slides-file".into(),
            ))
        }
    }

    /// Apply `--slide-font-size` and `--slide-bold` to a freshly built deck.
    ///
    /// # Errors
    ///
    /// Returns an error for an index past the end of the deck or a zero size.
    pub fn apply_overrides(&self, deck: &mut Deck) -> Result<(), SlideError> {
        let slide_id = |deck: &Deck, index: usize| {
            index
                .checked_sub(1)
                .and_then(|i| deck.slides().get(i))
                .map(|s| s.id)
                .ok_or_else(|| SlideError::InvalidArgument(format!("No slide {index}")))
        };
        for &(index, size) in &self.slide_font_sizes {
            let id = slide_id(deck, index)?;
            deck.set_font_size_override(id, Some(size))?;
        }
        for &index in &self.slide_bold {
            let id = slide_id(deck, index)?;
            deck.set_bold_override(id, Some(true))?;
        }
        Ok(())
    }
}

fn parse_slide_size(value: &str) -> Result<(usize, u32), String> {
    let (index, size) =
        value.split_once('=').ok_or_else(|| format!("Expected INDEX=SIZE, got '{value}'"))?;
    let index = index.trim().parse().map_err(|e| format!("Bad slide index '{index}': {e}"))?;
    let size = size.trim().parse().map_err(|e| format!("Bad font size '{size}': {e}"))?;
    Ok((index, size))
}

impl GenerateArgs {
    /// Resolve the style instructions from the flag or the file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is provided, or if the file cannot be read.
    pub fn resolve_style(&self) -> Result<String, SlideError> {
        if let Some(ref text) = self.style {
            Ok(text.clone())
        } else if let Some(ref path) = self.style_file {
            Ok(std::fs::read_to_string(path)?.trim().to_string())
        } else {
            Err(SlideError::InvalidArgument("Provide --style or --style-file".into()))
        }
    }
}

impl StyleArgs {
    /// Apply these flags on top of `base`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable color or an out-of-range font size.
    pub fn apply(&self, base: RenderConfig) -> Result<RenderConfig, SlideError> {
        let color = |value: &Option<String>, fallback: Color| {
            value.as_deref().map_or(Ok(fallback), |v| {
                v.parse::<Color>().map_err(SlideError::InvalidArgument)
            })
        };
        RenderConfig::new(
            color(&self.background, base.background)?,
            color(&self.foreground, base.foreground)?,
            self.font_size.unwrap_or(base.base_font_size()),
            !self.no_bold && (self.bold || base.bold),
        )
    }
}
