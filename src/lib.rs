//! Incremental rendering engine for the wattview power monitor display
//!
//! This crate contains the platform-agnostic half of the firmware: it decides
//! on every tick which dashboard elements changed, redraws only those, and
//! stages redraws in region-sized canvases that are blitted to the panel in a
//! single transfer so the viewer never sees a half-drawn frame.
//!
//! The panel, the telemetry feed and the status feed are collaborators: the
//! panel is any `embedded-graphics` [`DrawTarget`](embedded_graphics::draw_target::DrawTarget)
//! over [`Rgb565`](embedded_graphics::pixelcolor::Rgb565), the feeds are the
//! [`TelemetrySource`] and [`StatusSource`] traits.
//!
//! The crate is `no_std` with `alloc` so it builds for the microcontroller as
//! well as for the desktop simulator and host tests.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod canvas;
pub mod change;
pub mod color_scale;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod render;
pub mod telemetry;
pub mod ui;

#[cfg(test)]
mod testing;

pub use canvas::{Canvas, CanvasAllocator, CanvasError, RegionCanvases};
pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{BufferModes, Dashboard, InitError, TickReport};
pub use render::{BufferMode, UpdateOutcome};
pub use telemetry::{ClockTime, StatusSnapshot, StatusSource, TelemetrySnapshot, TelemetrySource};
