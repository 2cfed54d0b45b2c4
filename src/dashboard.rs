//! Dashboard: owns the panel and both region renderers
//!
//! The dashboard is the only thing that touches the display. It allocates the
//! region canvases once at startup, paints the static chrome (background and
//! the divider under the status bar), and on every tick hands the latest
//! snapshots to the status bar and main display renderers.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::draw_target::DrawTargetExt;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::PrimitiveStyle;
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};
use thiserror_no_std::Error;

use crate::canvas::CanvasAllocator;
use crate::config::{ConfigError, DashboardConfig};
use crate::render::{BufferMode, MainDisplay, RegionContent, RegionRenderer, StatusBar, UpdateOutcome};
use crate::telemetry::{StatusSnapshot, StatusSource, TelemetrySnapshot, TelemetrySource};
use crate::ui::{ScreenLayout, TextStyle, centered_origin, colors, draw_text, measure_text};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InitError {
    #[error("Invalid dashboard configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(
        "Display is {actual_width}x{actual_height} but the layout needs {required_width}x{required_height}"
    )]
    SurfaceTooSmall {
        required_width: u32,
        required_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Buffering mode each region ended up with after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferModes {
    pub status: BufferMode,
    pub main: BufferMode,
}

/// What one [`Dashboard::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub status: UpdateOutcome,
    /// `None` when the telemetry source failed and the main display was left as is
    pub main: Option<UpdateOutcome>,
}

pub struct Dashboard<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    display: D,
    layout: ScreenLayout,
    status_bar: RegionRenderer<StatusBar>,
    main_display: RegionRenderer<MainDisplay>,
    /// Background and divider are on screen
    chrome_valid: bool,
    /// A message covers the screen until telemetry comes back
    message_shown: bool,
    telemetry_failures: u32,
}

impl<D> Dashboard<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Validate `config` against the display and set up both regions.
    ///
    /// Canvas allocation failures are not errors: the affected region draws
    /// directly for the lifetime of the dashboard.
    pub fn new<Delay: DelayNs>(
        display: D,
        config: &DashboardConfig,
        delay: &mut Delay,
    ) -> Result<Self, InitError> {
        config.validate()?;

        let actual = display.bounding_box().size;
        if actual.width < config.screen_width || actual.height < config.screen_height {
            return Err(InitError::SurfaceTooSmall {
                required_width: config.screen_width,
                required_height: config.screen_height,
                actual_width: actual.width,
                actual_height: actual.height,
            });
        }

        let layout = ScreenLayout::new(config);
        let canvases = CanvasAllocator::from_config(&config.buffering).allocate_regions(
            delay,
            layout.status_bar.size,
            layout.main.size,
            colors::BACKGROUND,
        );

        let status_bar = RegionRenderer::new(layout.status_bar, canvases.status, StatusBar::new(config));
        let main_display = RegionRenderer::new(
            layout.main,
            canvases.main,
            MainDisplay::new(config, layout.main.size),
        );

        info!(
            "Dashboard ready: status bar {}, main display {}",
            status_bar.mode().as_str(),
            main_display.mode().as_str()
        );

        Ok(Self {
            display,
            layout,
            status_bar,
            main_display,
            chrome_valid: false,
            message_shown: false,
            telemetry_failures: 0,
        })
    }

    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    pub fn buffer_modes(&self) -> BufferModes {
        BufferModes {
            status: self.status_bar.mode(),
            main: self.main_display.mode(),
        }
    }

    /// Consecutive telemetry failures since the last successful fetch.
    pub fn telemetry_failures(&self) -> u32 {
        self.telemetry_failures
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Give the display back.
    pub fn release(self) -> D {
        self.display
    }

    /// Clear the screen, draw the divider, and force-draw placeholders in
    /// every element.
    pub fn draw_initial_frame(&mut self, internal_temp_c: f32) -> Result<(), D::Error> {
        self.repaint_chrome()?;
        self.update_status(&StatusSnapshot::placeholder(internal_temp_c), true)?;
        self.update_telemetry(&TelemetrySnapshot::default(), true)?;
        Ok(())
    }

    /// Held back while a message is on screen.
    pub fn update_status(
        &mut self,
        snapshot: &StatusSnapshot,
        force: bool,
    ) -> Result<UpdateOutcome, D::Error> {
        if self.message_shown {
            return Ok(UpdateOutcome::Unchanged);
        }
        self.ensure_chrome()?;
        self.status_bar.update(&mut self.display, snapshot, force)
    }

    /// Takes down a message screen, if one is up.
    pub fn update_telemetry(
        &mut self,
        snapshot: &TelemetrySnapshot,
        force: bool,
    ) -> Result<UpdateOutcome, D::Error> {
        self.ensure_chrome()?;
        self.main_display.update(&mut self.display, snapshot, force)
    }

    /// Pull one snapshot from each source and update the regions.
    ///
    /// A telemetry failure leaves the screen as it is: the last good reading,
    /// or the message shown with [`Dashboard::show_message`]. Only display
    /// errors are returned.
    pub fn tick<T, S>(&mut self, telemetry: &mut T, status: &mut S) -> Result<TickReport, D::Error>
    where
        T: TelemetrySource,
        S: StatusSource,
    {
        let main_outcome = match telemetry.fetch() {
            Ok(snapshot) => {
                self.telemetry_failures = 0;
                Some(self.update_telemetry(&snapshot, false)?)
            }
            Err(e) => {
                self.telemetry_failures = self.telemetry_failures.saturating_add(1);
                warn!(
                    "Telemetry fetch failed ({} in a row): {:?}",
                    self.telemetry_failures, e
                );
                None
            }
        };

        let status_snapshot = status.status();
        let status_outcome = self.update_status(&status_snapshot, false)?;

        debug!("Tick: status {:?}, main {:?}", status_outcome, main_outcome);
        Ok(TickReport {
            status: status_outcome,
            main: main_outcome,
        })
    }

    /// Replace the whole screen with a centered one-line message.
    ///
    /// The message stays up until the next telemetry update, which repaints
    /// the chrome and redraws every element.
    pub fn show_message(&mut self, text: &str, scale: u32, color: Rgb565) -> Result<(), D::Error> {
        info!("Showing message: {}", text);
        self.chrome_valid = false;
        self.message_shown = true;
        self.status_bar.invalidate();
        self.main_display.invalidate();

        let screen = self.layout.screen;
        screen
            .into_styled(PrimitiveStyle::with_fill(colors::BACKGROUND))
            .draw(&mut self.display)?;

        let style = TextStyle::new(scale, color);
        let origin = centered_origin(&screen, measure_text(text, style.scale));
        draw_text(&mut self.display.clipped(&screen), text, origin, style)
    }

    fn ensure_chrome(&mut self) -> Result<(), D::Error> {
        if self.chrome_valid {
            return Ok(());
        }
        self.repaint_chrome()
    }

    /// Background and divider. Everything drawn before is gone, so both
    /// renderers forget their caches.
    fn repaint_chrome(&mut self) -> Result<(), D::Error> {
        debug!("Repainting dashboard chrome");
        self.layout
            .screen
            .into_styled(PrimitiveStyle::with_fill(colors::BACKGROUND))
            .draw(&mut self.display)?;
        self.layout
            .divider
            .into_styled(PrimitiveStyle::with_fill(colors::STATUS_BAR_LINE))
            .draw(&mut self.display)?;

        self.status_bar.invalidate();
        self.main_display.invalidate();
        self.chrome_valid = true;
        self.message_shown = false;
        Ok(())
    }
}

impl<D> Dashboard<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Whether `snapshot` would cause any status bar draw.
    pub fn status_needs_redraw(&self, snapshot: &StatusSnapshot) -> bool {
        StatusBar::has_changes(&self.status_bar.content().plan(snapshot, false))
    }

    /// Whether `snapshot` would cause any main display draw.
    pub fn telemetry_needs_redraw(&self, snapshot: &TelemetrySnapshot) -> bool {
        MainDisplay::has_changes(&self.main_display.content().plan(snapshot, false))
    }
}
