//! Label font.
//!
//! Date labels are set in DejaVu Sans, embedded in the binary and rasterised
//! with rusttype. A font size is the em height in pixels, so a label laid out
//! at `10 * unit` keeps its proportion to the dial at every widget size.
//! Ascent, descent and advance widths come from the same face that is drawn,
//! so label placement matches the pixels on screen.

use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::fmt;
use thiserror::Error;

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Glyph coverage at or above this is painted; labels are drawn without
/// blending, like the other primitives.
const COVERAGE_THRESHOLD: f32 = 0.5;

/// Errors raised while loading the label font.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("embedded label font could not be parsed")]
    Invalid,
}

/// Vertical metrics of the label font at one size, in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    /// Baseline to the top of the tallest glyph
    pub ascent: i32,
    /// Baseline to the bottom of the lowest descender
    pub descent: i32,
}

/// Scalable sans-serif face used for the date labels.
#[derive(Clone)]
pub struct LabelFont {
    font: Font<'static>,
    /// `(ascent - descent) / units_per_em`, converts an em size into the
    /// pixel height rusttype scales by
    height_per_em: f32,
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .field("height_per_em", &self.height_per_em)
            .finish()
    }
}

impl LabelFont {
    /// Load the embedded DejaVu Sans face.
    pub fn builtin() -> Result<Self, FontError> {
        let font = Font::try_from_bytes(DEJAVU_SANS).ok_or(FontError::Invalid)?;
        let units_per_em = f32::from(font.units_per_em());
        if units_per_em <= 0.0 {
            return Err(FontError::Invalid);
        }
        let unscaled = font.v_metrics_unscaled();
        Ok(Self {
            height_per_em: (unscaled.ascent - unscaled.descent) / units_per_em,
            font,
        })
    }

    fn scale(&self, font_size: u32) -> Scale {
        Scale::uniform(font_size as f32 * self.height_per_em)
    }

    pub fn metrics(&self, font_size: u32) -> FontMetrics {
        let v = self.font.v_metrics(self.scale(font_size));
        FontMetrics {
            ascent: v.ascent.round() as i32,
            descent: (-v.descent).round() as i32,
        }
    }

    fn layout(&self, text: &str, font_size: u32, origin: Point) -> Vec<PositionedGlyph<'static>> {
        self.font
            .layout(
                text,
                self.scale(font_size),
                point(origin.x as f32, origin.y as f32),
            )
            .collect()
    }

    /// Advance width of `text` in pixels, kerning included.
    pub fn string_width(&self, text: &str, font_size: u32) -> i32 {
        self.layout(text, font_size, Point::zero())
            .last()
            .map(|glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .round() as i32
    }

    /// Draw `text` with its alphabetic baseline starting at `baseline`.
    pub fn draw<D>(
        &self,
        text: &str,
        baseline: Point,
        font_size: u32,
        color: Rgb888,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let mut pixels = Vec::new();
        for glyph in self.layout(text, font_size, baseline) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                if coverage >= COVERAGE_THRESHOLD {
                    let p = Point::new(bb.min.x + gx as i32, bb.min.y + gy as i32);
                    pixels.push(Pixel(p, color));
                }
            });
        }
        target.draw_iter(pixels)
    }
}
