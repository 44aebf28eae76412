//! The slide deck: the session's ordered list of phrases and the shared render settings.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SlideError;

/// Most slides a deck can hold.
pub const MAX_SLIDES: usize = 15;

/// Allowed range for the deck-wide base font size.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 24..=120;

/// Default slide background (misty rose).
pub const DEFAULT_BACKGROUND: Color = Color::rgb(0xFF, 0xE4, 0xE1);

/// Default text color.
pub const DEFAULT_FOREGROUND: Color = Color::rgb(0x1a, 0x1a, 0x1a);

/// Default base font size.
pub const DEFAULT_FONT_SIZE: u32 = 48;

/// One phrase plus its optional per-slide overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Session-unique identifier. Never reused.
    pub id: u64,
    /// The phrase shown on the slide.
    pub text: String,
    /// Font size that replaces the deck's base size for this slide.
    pub font_size_override: Option<u32>,
    /// Weight that replaces the deck's bold flag for this slide.
    pub bold_override: Option<bool>,
}

impl Slide {
    fn empty(id: u64) -> Self {
        Self { id, text: String::new(), font_size_override: None, bold_override: None }
    }

    /// Whether the slide has something to draw.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Identifies one generation call so late responses can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// Ordered list of 1 to [`MAX_SLIDES`] slides.
#[derive(Debug, Clone)]
pub struct Deck {
    slides: Vec<Slide>,
    next_id: u64,
    latest_ticket: u64,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// A deck with a single empty slide.
    #[must_use]
    pub fn new() -> Self {
        Self { slides: vec![Slide::empty(1)], next_id: 2, latest_ticket: 0 }
    }

    /// Build a deck holding the given phrases, keeping at most [`MAX_SLIDES`].
    #[must_use]
    pub fn from_phrases<S: AsRef<str>>(phrases: &[S]) -> Self {
        let mut deck = Self::new();
        deck.replace_with_phrases(phrases);
        deck
    }

    /// All slides in order.
    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides, filled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; a deck never drops below one slide.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slides with non-blank text, in order.
    pub fn filled(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter().filter(|s| s.is_filled())
    }

    /// Append an empty slide. Returns its id, or `None` when the deck is full.
    pub fn add(&mut self) -> Option<u64> {
        if self.slides.len() >= MAX_SLIDES {
            return None;
        }
        let id = self.take_id();
        self.slides.push(Slide::empty(id));
        Some(id)
    }

    /// Remove a slide. The last remaining slide is never removed.
    pub fn remove(&mut self, id: u64) -> bool {
        if self.slides.len() <= 1 {
            return false;
        }
        let before = self.slides.len();
        self.slides.retain(|s| s.id != id);
        self.slides.len() != before
    }

    /// Replace the text of a slide.
    ///
    /// # Errors
    ///
    /// Returns an error if no slide has that id.
    pub fn update_text(&mut self, id: u64, text: impl Into<String>) -> Result<(), SlideError> {
        self.slide_mut(id)?.text = text.into();
        Ok(())
    }

    /// Set or clear the per-slide font size.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero size or an unknown id.
    pub fn set_font_size_override(&mut self, id: u64, size: Option<u32>) -> Result<(), SlideError> {
        if size == Some(0) {
            return Err(SlideError::InvalidArgument(
                "Font size override must be a positive integer".into(),
            ));
        }
        self.slide_mut(id)?.font_size_override = size;
        Ok(())
    }

    /// Set or clear the per-slide bold flag.
    ///
    /// # Errors
    ///
    /// Returns an error if no slide has that id.
    pub fn set_bold_override(&mut self, id: u64, bold: Option<bool>) -> Result<(), SlideError> {
        self.slide_mut(id)?.bold_override = bold;
        Ok(())
    }

    /// Replace every slide with one per phrase. Fresh ids are assigned; an empty
    /// phrase list leaves a single empty slide.
    pub fn replace_with_phrases<S: AsRef<str>>(&mut self, phrases: &[S]) {
        let mut slides = Vec::with_capacity(phrases.len().clamp(1, MAX_SLIDES));
        for phrase in phrases.iter().take(MAX_SLIDES) {
            let id = self.take_id();
            slides.push(Slide { text: phrase.as_ref().to_string(), ..Slide::empty(id) });
        }
        if slides.is_empty() {
            slides.push(Slide::empty(self.take_id()));
        }
        self.slides = slides;
    }

    /// Start a generation call. Only the most recent ticket can apply its result.
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.latest_ticket += 1;
        GenerationTicket(self.latest_ticket)
    }

    /// Apply a generation result if it belongs to the latest call. Returns false
    /// and leaves the deck untouched for stale tickets.
    pub fn apply_generation<S: AsRef<str>>(
        &mut self,
        ticket: GenerationTicket,
        phrases: &[S],
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            return false;
        }
        self.replace_with_phrases(phrases);
        true
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn slide_mut(&mut self, id: u64) -> Result<&mut Slide, SlideError> {
        self.slides
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SlideError::InvalidArgument(format!("No slide with id {id}")))
    }
}

/// Deck-wide rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Canvas fill.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
    base_font_size: u32,
    /// Bold weight for every slide without an override.
    pub bold: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            base_font_size: DEFAULT_FONT_SIZE,
            bold: false,
        }
    }
}

impl RenderConfig {
    /// Build a config, validating the base font size.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_font_size` lies outside [`FONT_SIZE_RANGE`].
    pub fn new(
        background: Color,
        foreground: Color,
        base_font_size: u32,
        bold: bool,
    ) -> Result<Self, SlideError> {
        validate_font_size(base_font_size)?;
        Ok(Self { background, foreground, base_font_size, bold })
    }

    /// The deck-wide font size.
    #[must_use]
    pub fn base_font_size(&self) -> u32 {
        self.base_font_size
    }

    /// Resolve the style of one slide, letting its overrides win.
    #[must_use]
    pub fn style_for(&self, slide: &Slide) -> SlideStyle {
        SlideStyle {
            background: self.background,
            foreground: self.foreground,
            font_size: slide.font_size_override.unwrap_or(self.base_font_size),
            bold: slide.bold_override.unwrap_or(self.bold),
        }
    }
}

/// Fully resolved inputs for rendering one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideStyle {
    /// Canvas fill.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
    /// Starting font size in pixels.
    pub font_size: u32,
    /// Bold weight.
    pub bold: bool,
}

/// Check that a base font size is within [`FONT_SIZE_RANGE`].
///
/// # Errors
///
/// Returns an error naming the valid range.
pub fn validate_font_size(size: u32) -> Result<(), SlideError> {
    if FONT_SIZE_RANGE.contains(&size) {
        Ok(())
    } else {
        Err(SlideError::InvalidArgument(format!(
            "Font size {size} out of range. Valid: {}-{}",
            FONT_SIZE_RANGE.start(),
            FONT_SIZE_RANGE.end()
        )))
    }
}
