//! Region renderers
//!
//! A [`RegionRenderer`] owns one rectangle of the screen and the canvas (if
//! any) that backs it. The region specific part, which elements exist and
//! how each is compared and drawn, lives behind [`RegionContent`]; the
//! renderer only decides where the pixels go.
//!
//! Two ways of getting pixels on the panel:
//!
//! - **Direct**: changed elements are cleared and redrawn straight on the
//!   panel, each clipped to its own rectangle. Unchanged elements are not
//!   touched at all.
//! - **Buffered**: the whole region is repainted into the canvas, unchanged
//!   elements from their cached values, and the canvas is blitted in one
//!   transfer. The result on the panel is the same as in direct mode.

pub mod main_display;
pub mod status_bar;

use embedded_graphics::draw_target::{Clipped, DrawTargetExt};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, warn};

use crate::canvas::Canvas;

pub use main_display::MainDisplay;
pub use status_bar::StatusBar;

/// Where a region draws, decided once at startup.
#[derive(Debug)]
pub enum RenderTarget {
    Buffered(Canvas),
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMode {
    Buffered,
    Direct,
}

impl BufferMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buffered => "buffered",
            Self::Direct => "direct",
        }
    }
}

/// How [`RegionContent::paint`] should treat the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Draw changed elements on the panel and commit each right after it is
    /// drawn.
    Direct,
    /// Draw every element into a freshly cleared canvas. Nothing is committed
    /// until the canvas has been flushed.
    Staged,
}

/// What an update did to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing changed, no draw calls were issued.
    Unchanged,
    /// Changed elements were drawn directly on the panel.
    Drawn,
    /// The region was repainted off-screen and blitted.
    Flushed,
}

/// The elements of one region and their render cache.
///
/// Coordinates used by `paint` are local to the region.
pub trait RegionContent {
    type Snapshot;
    /// Per-element decision for one update: what to draw and whether it changed.
    type Frame;

    fn plan(&self, snapshot: &Self::Snapshot, force: bool) -> Self::Frame;

    fn has_changes(frame: &Self::Frame) -> bool;

    fn paint<T>(&mut self, target: &mut T, frame: &Self::Frame, pass: Pass) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>;

    /// Record everything in `frame` as visible.
    fn commit(&mut self, frame: &Self::Frame);

    /// Forget the cache so the next update redraws every element.
    fn invalidate(&mut self);

    fn background(&self) -> Rgb565;
}

pub struct RegionRenderer<C> {
    region: Rectangle,
    target: RenderTarget,
    content: C,
}

impl<C: RegionContent> RegionRenderer<C> {
    /// A canvas whose size does not match `region` is dropped and the region
    /// draws directly.
    pub fn new(region: Rectangle, canvas: Option<Canvas>, content: C) -> Self {
        let target = match canvas {
            Some(canvas) if canvas.size() == region.size => RenderTarget::Buffered(canvas),
            Some(canvas) => {
                warn!(
                    "Canvas size {:?} does not match region {:?}, drawing directly",
                    canvas.size(),
                    region.size
                );
                RenderTarget::Direct
            }
            None => RenderTarget::Direct,
        };

        Self {
            region,
            target,
            content,
        }
    }

    pub fn region(&self) -> Rectangle {
        self.region
    }

    pub fn mode(&self) -> BufferMode {
        match self.target {
            RenderTarget::Buffered(_) => BufferMode::Buffered,
            RenderTarget::Direct => BufferMode::Direct,
        }
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn invalidate(&mut self) {
        self.content.invalidate();
    }

    /// Bring the region up to date with `snapshot`.
    ///
    /// Returns [`UpdateOutcome::Unchanged`] without touching the panel when
    /// no element needs a redraw. Every draw stays inside the region.
    pub fn update<D>(
        &mut self,
        display: &mut D,
        snapshot: &C::Snapshot,
        force: bool,
    ) -> Result<UpdateOutcome, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let frame = self.content.plan(snapshot, force);
        if !C::has_changes(&frame) {
            debug!("Region at y={} unchanged", self.region.top_left.y);
            return Ok(UpdateOutcome::Unchanged);
        }

        match &mut self.target {
            RenderTarget::Buffered(canvas) => {
                let Ok(()) = canvas.clear(self.content.background());
                let Ok(()) = self.content.paint(canvas, &frame, Pass::Staged);
                canvas.flush(display, self.region.top_left)?;
                self.content.commit(&frame);
                Ok(UpdateOutcome::Flushed)
            }
            RenderTarget::Direct => {
                let mut clipped = display.clipped(&self.region);
                let mut local = clipped.translated(self.region.top_left);
                self.content.paint(&mut local, &frame, Pass::Direct)?;
                Ok(UpdateOutcome::Drawn)
            }
        }
    }
}

/// Clear `area` and run `draw` clipped to it.
pub(crate) fn repaint_element<T, F>(
    target: &mut T,
    area: &Rectangle,
    background: Rgb565,
    draw: F,
) -> Result<(), T::Error>
where
    T: DrawTarget<Color = Rgb565>,
    F: FnOnce(&mut Clipped<'_, T>) -> Result<(), T::Error>,
{
    target.fill_solid(area, background)?;
    let mut clipped = target.clipped(area);
    draw(&mut clipped)
}
