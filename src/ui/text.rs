// src/ui/text.rs
//! Scaled text rendering
//!
//! Every label on the dashboard uses one monospaced font blown up by an
//! integer factor, so the big power readout and the small clock digits share
//! the same glyph shapes. Metrics are pure functions of the text and scale;
//! measuring never touches a draw target.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, iso_8859_1::FONT_6X9};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

/// The dashboard font. ISO 8859-1 so the degree sign is available.
pub const FONT: &MonoFont<'static> = &FONT_6X9;

/// Integer scale factor and color for a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub scale: u32,
    pub color: Rgb565,
}

impl TextStyle {
    pub const fn new(scale: u32, color: Rgb565) -> Self {
        let scale = if scale == 0 { 1 } else { scale };
        Self { scale, color }
    }
}

/// Bounding box of `text` at `scale`.
pub fn measure_text(text: &str, scale: u32) -> Size {
    let scale = scale.max(1);
    let glyphs = text.chars().count() as u32;
    let advance = FONT.character_size.width + FONT.character_spacing;
    let width = glyphs
        .saturating_mul(advance)
        .saturating_sub(FONT.character_spacing);
    Size::new(
        width.saturating_mul(scale),
        FONT.character_size.height.saturating_mul(scale),
    )
}

/// Draw `text` with its top-left corner at `origin`.
///
/// Only glyph pixels are painted; clearing the background is the caller's job.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    origin: Point,
    style: TextStyle,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut scaled = Upscaled {
        parent: target,
        origin,
        scale: style.scale.max(1),
    };
    let character_style = MonoTextStyle::new(FONT, style.color);
    Text::with_baseline(text, Point::zero(), character_style, Baseline::Top).draw(&mut scaled)?;
    Ok(())
}

/// Draw target adapter that turns every font pixel into a `scale`-sized block.
struct Upscaled<'a, D> {
    parent: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<D> Dimensions for Upscaled<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn bounding_box(&self) -> Rectangle {
        let parent = self.parent.bounding_box();
        Rectangle::new(
            Point::zero(),
            Size::new(
                parent.size.width.div_ceil(self.scale),
                parent.size.height.div_ceil(self.scale),
            ),
        )
    }
}

impl<D> DrawTarget for Upscaled<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let block = Size::new_equal(self.scale);
        let step = i32::try_from(self.scale).unwrap_or(i32::MAX);

        for Pixel(point, color) in pixels {
            let top_left = Point::new(
                self.origin.x.saturating_add(point.x.saturating_mul(step)),
                self.origin.y.saturating_add(point.y.saturating_mul(step)),
            );
            self.parent.fill_solid(&Rectangle::new(top_left, block), color)?;
        }
        Ok(())
    }
}
