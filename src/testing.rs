//! Test doubles shared by the unit tests.
//!
//! [`MockPanel`] stands in for the physical display: it keeps every pixel,
//! counts the draw calls that reach it, and tracks the bounding box of all
//! pixels written since the last reset.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;

use crate::ui::colors;

/// Bounding box of pixels written since the last counter reset.
#[derive(Debug, Clone, Copy)]
struct TouchedRect {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl TouchedRect {
    fn expand(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    fn from_point(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockPanel {
    size: Size,
    pixels: Vec<Rgb565>,
    touched: Option<TouchedRect>,
    /// Calls to any drawing entry point
    pub draw_calls: usize,
    /// Calls to `fill_contiguous`, which is how canvases are blitted
    pub blits: usize,
}

impl MockPanel {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![colors::BLACK; (size.width * size.height) as usize],
            touched: None,
            draw_calls: 0,
            blits: 0,
        }
    }

    /// 320x240 landscape panel.
    pub fn qvga() -> Self {
        Self::new(Size::new(320, 240))
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
        self.pixels[(y as u32 * self.size.width + x as u32) as usize]
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    pub fn count_color(&self, area: &Rectangle, color: Rgb565) -> usize {
        area.intersection(&self.bounding_box())
            .points()
            .filter(|p| self.pixel(p.x, p.y) == color)
            .count()
    }

    /// Area covered by writes since the last reset, if anything was written.
    pub fn touched(&self) -> Option<Rectangle> {
        self.touched.map(|rect| {
            Rectangle::with_corners(
                Point::new(rect.min_x, rect.min_y),
                Point::new(rect.max_x, rect.max_y),
            )
        })
    }

    pub fn reset_counters(&mut self) {
        self.draw_calls = 0;
        self.blits = 0;
        self.touched = None;
    }

    fn set_pixel(&mut self, point: Point, color: Rgb565) {
        if !self.bounding_box().contains(point) {
            return;
        }
        let idx = (point.y as u32 * self.size.width + point.x as u32) as usize;
        self.pixels[idx] = color;
        match &mut self.touched {
            Some(rect) => rect.expand(point),
            None => self.touched = Some(TouchedRect::from_point(point)),
        }
    }
}

impl OriginDimensions for MockPanel {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for MockPanel {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.draw_calls += 1;
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.draw_calls += 1;
        self.blits += 1;
        for (point, color) in area.points().zip(colors) {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.draw_calls += 1;
        for point in area.intersection(&self.bounding_box()).points() {
            self.set_pixel(point, color);
        }
        Ok(())
    }
}

/// Delay that only records how long it was asked to wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: u32,
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}
