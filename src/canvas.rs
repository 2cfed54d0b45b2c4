//! Heap-backed off-screen canvases for the dashboard regions.
//!
//! A region renderer that owns a canvas draws a whole update into RAM and
//! then pushes it to the panel in one `fill_contiguous` transfer, so the
//! viewer never sees a cleared-but-not-yet-redrawn element. Canvases are
//! optional: when the heap cannot provide one the region falls back to
//! drawing straight onto the panel.

use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use thiserror_no_std::Error;

use crate::config::BufferingConfig;

/// Bytes per RGB565 pixel.
pub const BYTES_PER_PIXEL: usize = 2;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasError {
    #[error("Canvas of {width}x{height} pixels overflows the address space")]
    TooLarge { width: u32, height: u32 },
    #[error("Canvas needs {requested} bytes but only {remaining} are left in the budget")]
    OverBudget { requested: usize, remaining: usize },
    #[error("Heap could not provide {requested} bytes for a canvas")]
    OutOfMemory { requested: usize },
    #[error("Buffering is disabled")]
    Disabled,
}

/// Bytes needed for a canvas of `size`, if that fits in `usize`.
pub fn canvas_bytes(size: Size) -> Option<usize> {
    (size.width as usize)
        .checked_mul(size.height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Region-sized RGB565 pixel buffer implementing `DrawTarget`.
///
/// Coordinates are local to the region: `(0, 0)` is the region's top-left
/// corner. Writes outside the canvas are dropped.
pub struct Canvas {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas").field("size", &self.size).finish()
    }
}

impl Canvas {
    /// Allocate a canvas filled with `fill`, failing instead of aborting when
    /// the heap is exhausted.
    pub fn try_new(size: Size, fill: Rgb565) -> Result<Self, CanvasError> {
        let requested = canvas_bytes(size).ok_or(CanvasError::TooLarge {
            width: size.width,
            height: size.height,
        })?;
        let count = requested / BYTES_PER_PIXEL;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| CanvasError::OutOfMemory { requested })?;
        pixels.resize(count, fill);

        Ok(Self { size, pixels })
    }

    /// Heap bytes held by the pixel buffer.
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * BYTES_PER_PIXEL
    }

    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    #[inline]
    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    /// Push the whole canvas to `display` with its top-left corner at `origin`.
    ///
    /// This is a single `fill_contiguous` call, one transfer on an SPI panel.
    pub fn flush<D>(&self, display: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        debug!(
            "Flushing {}x{} canvas at ({}, {})",
            self.size.width, self.size.height, origin.x, origin.y
        );

        let area = Rectangle::new(origin, self.size);
        display.fill_contiguous(&area, self.pixels.iter().copied())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(idx) = self.index(point) {
                self.pixels[idx] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let stride = self.size.width as usize;
        let x_start = area.top_left.x as usize;
        let x_end = bottom_right.x as usize + 1;
        for y in area.top_left.y as usize..=bottom_right.y as usize {
            self.pixels[y * stride + x_start..y * stride + x_end].fill(color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}

/// Canvases obtained at startup, one per region. `None` means that region
/// draws directly onto the panel.
#[derive(Debug, Default)]
pub struct RegionCanvases {
    pub status: Option<Canvas>,
    pub main: Option<Canvas>,
}

/// Hands out canvases while respecting an optional heap budget.
#[derive(Debug, Clone)]
pub struct CanvasAllocator {
    enabled: bool,
    settle_delay_ms: u32,
    remaining: Option<usize>,
}

impl CanvasAllocator {
    pub fn from_config(config: &BufferingConfig) -> Self {
        Self {
            enabled: config.enabled,
            settle_delay_ms: config.settle_delay_ms,
            remaining: config.heap_budget_bytes,
        }
    }

    /// Budget left for further canvases; `None` when unlimited.
    pub fn remaining_budget(&self) -> Option<usize> {
        self.remaining
    }

    /// Allocate one canvas cleared to `fill`, charging it against the budget.
    pub fn allocate(&mut self, size: Size, fill: Rgb565) -> Result<Canvas, CanvasError> {
        if !self.enabled {
            return Err(CanvasError::Disabled);
        }

        let requested = canvas_bytes(size).ok_or(CanvasError::TooLarge {
            width: size.width,
            height: size.height,
        })?;
        if let Some(remaining) = self.remaining
            && requested > remaining
        {
            return Err(CanvasError::OverBudget {
                requested,
                remaining,
            });
        }

        let canvas = Canvas::try_new(size, fill)?;
        if let Some(remaining) = &mut self.remaining {
            *remaining -= requested;
        }
        Ok(canvas)
    }

    /// Try to get a canvas for each region, status bar first.
    ///
    /// Each attempt is preceded by the settle delay. A failed attempt leaves
    /// that region unbuffered and never prevents the other from trying.
    pub fn allocate_regions<Delay: DelayNs>(
        &mut self,
        delay: &mut Delay,
        status: Size,
        main: Size,
        fill: Rgb565,
    ) -> RegionCanvases {
        RegionCanvases {
            status: self.allocate_region("status bar", delay, status, fill),
            main: self.allocate_region("main display", delay, main, fill),
        }
    }

    fn allocate_region<Delay: DelayNs>(
        &mut self,
        name: &str,
        delay: &mut Delay,
        size: Size,
        fill: Rgb565,
    ) -> Option<Canvas> {
        if !self.enabled {
            return None;
        }

        delay.delay_ms(self.settle_delay_ms);
        match self.allocate(size, fill) {
            Ok(canvas) => {
                info!(
                    "Allocated {}x{} canvas for {} ({} bytes)",
                    size.width,
                    size.height,
                    name,
                    canvas.byte_len()
                );
                Some(canvas)
            }
            Err(e) => {
                warn!("No canvas for {}, drawing directly: {}", name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPanel, RecordingDelay};
    use crate::ui::colors;

    fn allocator(budget: Option<usize>) -> CanvasAllocator {
        CanvasAllocator::from_config(&BufferingConfig {
            enabled: true,
            settle_delay_ms: 20,
            heap_budget_bytes: budget,
        })
    }

    #[test]
    fn test_canvas_sizes() {
        assert_eq!(canvas_bytes(Size::new(320, 40)), Some(25_600));
        assert_eq!(canvas_bytes(Size::new(320, 179)), Some(114_560));
        let canvas = Canvas::try_new(Size::new(10, 4), colors::BLACK).unwrap();
        assert_eq!(canvas.byte_len(), 80);
    }

    #[test]
    fn test_draws_outside_canvas_are_dropped() {
        let mut canvas = Canvas::try_new(Size::new(4, 4), colors::BLACK).unwrap();
        canvas
            .fill_solid(&Rectangle::new(Point::new(2, 2), Size::new(10, 10)), colors::RED)
            .unwrap();
        Pixel(Point::new(-1, 0), colors::RED).draw(&mut canvas).unwrap();

        let red = canvas.pixels().iter().filter(|c| **c == colors::RED).count();
        assert_eq!(red, 4);
    }

    #[test]
    fn test_flush_is_single_transfer_at_origin() {
        let mut canvas = Canvas::try_new(Size::new(8, 2), colors::BLACK).unwrap();
        Pixel(Point::new(7, 1), colors::GREEN).draw(&mut canvas).unwrap();

        let mut panel = MockPanel::qvga();
        canvas.flush(&mut panel, Point::new(100, 61)).unwrap();

        assert_eq!(panel.blits, 1);
        assert_eq!(panel.draw_calls, 1);
        assert_eq!(panel.pixel(107, 62), colors::GREEN);
        assert_eq!(
            panel.touched(),
            Some(Rectangle::new(Point::new(100, 61), Size::new(8, 2)))
        );
    }

    #[test]
    fn test_unlimited_budget_allocates_both_regions() {
        let mut delay = RecordingDelay::default();
        let canvases = allocator(None).allocate_regions(
            &mut delay,
            Size::new(320, 40),
            Size::new(320, 179),
            colors::BLACK,
        );
        assert!(canvases.status.is_some());
        assert!(canvases.main.is_some());
        assert!(delay.calls >= 2);
        assert_eq!(delay.total_ns, 40_000_000);
    }

    #[test]
    fn test_partial_budget_buffers_status_bar_only() {
        let mut delay = RecordingDelay::default();
        let mut alloc = allocator(Some(100_000));
        let canvases = alloc.allocate_regions(
            &mut delay,
            Size::new(320, 40),
            Size::new(320, 179),
            colors::BLACK,
        );
        assert!(canvases.status.is_some());
        assert!(canvases.main.is_none());
        assert_eq!(alloc.remaining_budget(), Some(100_000 - 25_600));
    }

    #[test]
    fn test_zero_budget_buffers_nothing() {
        let mut alloc = allocator(Some(0));
        assert_eq!(
            alloc.allocate(Size::new(320, 40), colors::BLACK).unwrap_err(),
            CanvasError::OverBudget {
                requested: 25_600,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_disabled_buffering_skips_delay() {
        let mut delay = RecordingDelay::default();
        let mut alloc = CanvasAllocator::from_config(&BufferingConfig {
            enabled: false,
            ..BufferingConfig::default()
        });
        let canvases = alloc.allocate_regions(
            &mut delay,
            Size::new(320, 40),
            Size::new(320, 179),
            colors::BLACK,
        );
        assert!(canvases.status.is_none() && canvases.main.is_none());
        assert_eq!(delay.calls, 0);
    }
}
