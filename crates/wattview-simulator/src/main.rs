//! Desktop simulator for the wattview power monitor dashboard.
//!
//! Drives the real rendering engine with synthetic telemetry. By default it
//! runs headless for a fixed number of ticks and writes the final frame to a
//! PNG. Built with the `window` feature, `--window` shows the dashboard live
//! in an SDL2 window instead.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use embedded_hal::delay::DelayNs;
use log::{info, warn};

use wattview::ui::colors;
use wattview::{
    ClockTime, Dashboard, DashboardConfig, StatusSnapshot, StatusSource, TelemetrySnapshot,
    TelemetrySource,
};

/// Simulated seconds between ticks.
const TICK_SECS: f64 = 1.0;

/// Consecutive telemetry failures before the dashboard shows a message.
const MESSAGE_AFTER_FAILURES: u32 = 3;

#[derive(Parser, Debug)]
#[command(version, about = "Run the wattview dashboard against synthetic telemetry")]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Heap bytes available for region canvases (unlimited when omitted)
    #[arg(long)]
    heap_budget: Option<usize>,

    /// Draw directly on the panel without canvases
    #[arg(long)]
    no_buffer: bool,

    /// JSON file with dashboard config overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the final frame
    #[arg(long, default_value = "wattview.png")]
    output: PathBuf,

    /// Make every Nth telemetry fetch fail
    #[arg(long)]
    fail_every: Option<u32>,

    /// Show the dashboard in an SDL2 window, one tick per second
    #[cfg(feature = "window")]
    #[arg(long)]
    window: bool,
}

// ---------------------------------------------------------------------------
// Mock sources
// ---------------------------------------------------------------------------

/// Synthetic meter: a household load swinging between idle and an oven.
struct MockMeter {
    elapsed_secs: f64,
    fetches: u32,
    fail_every: Option<u32>,
}

impl MockMeter {
    fn new(fail_every: Option<u32>) -> Self {
        Self {
            elapsed_secs: 0.0,
            fetches: 0,
            fail_every,
        }
    }
}

impl TelemetrySource for MockMeter {
    type Error = &'static str;

    fn fetch(&mut self) -> Result<TelemetrySnapshot, Self::Error> {
        self.elapsed_secs += TICK_SECS;
        self.fetches += 1;

        if let Some(every) = self.fail_every
            && every > 0
            && self.fetches % every == 0
        {
            return Err("meter did not answer");
        }

        let t = self.elapsed_secs;
        let power = 1800.0 + 1700.0 * (t / 40.0).sin() + 120.0 * (t / 7.0).cos();
        let voltage = 230.0 + 3.0 * (t / 25.0).sin();
        let current = power / voltage;

        Ok(TelemetrySnapshot::new(
            voltage as f32,
            current as f32,
            power as f32,
        ))
    }
}

/// Clock, board temperature and a drifting signal strength.
struct MockStatus {
    start_secs: u64,
    elapsed_secs: f64,
}

impl MockStatus {
    fn new() -> Self {
        let start_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            start_secs,
            elapsed_secs: 0.0,
        }
    }
}

impl StatusSource for MockStatus {
    fn status(&mut self) -> StatusSnapshot {
        self.elapsed_secs += TICK_SECS;
        let t = self.elapsed_secs;

        // No clock for the first few seconds, as if NTP had not answered yet
        let clock = (t > 3.0).then(|| {
            let day_secs = (self.start_secs + t as u64) % 86_400;
            ClockTime::new(
                (day_secs / 3600) as u8,
                (day_secs / 60 % 60) as u8,
                (day_secs % 60) as u8,
            )
        });

        let temperature = 58.0 + 14.0 * (t / 60.0).sin();
        let dbm = -70.0 + 22.0 * (t / 30.0).sin();

        StatusSnapshot::from_clock(temperature as f32, dbm as i32, clock)
    }
}

/// Host delay for the canvas settle time.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };

    if args.no_buffer {
        config.buffering.enabled = false;
    }
    if args.heap_budget.is_some() {
        config.buffering.heap_budget_bytes = args.heap_budget;
    }
    Ok(config)
}

type SimDashboard = Dashboard<SimulatorDisplay<Rgb565>>;

/// One tick, plus the "no data" message once the meter has been silent long enough.
/// The message stays up until the meter answers again.
fn step(dashboard: &mut SimDashboard, meter: &mut MockMeter, status: &mut MockStatus) {
    let Ok(report) = dashboard.tick(meter, status);
    log::debug!("{:?}", report);
    if dashboard.telemetry_failures() == MESSAGE_AFTER_FAILURES {
        warn!("Meter silent for {} ticks", MESSAGE_AFTER_FAILURES);
        let Ok(()) = dashboard.show_message("NO DATA", 4, colors::RED);
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Starting wattview simulator");
    info!(
        "Display: {}x{}, buffering {}",
        config.screen_width,
        config.screen_height,
        if config.buffering.enabled { "on" } else { "off" }
    );

    let display =
        SimulatorDisplay::<Rgb565>::new(Size::new(config.screen_width, config.screen_height));
    let mut dashboard = Dashboard::new(display, &config, &mut StdDelay)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("initializing dashboard")?;

    let modes = dashboard.buffer_modes();
    info!(
        "Status bar {}, main display {}",
        modes.status.as_str(),
        modes.main.as_str()
    );

    let mut meter = MockMeter::new(args.fail_every);
    let mut status = MockStatus::new();

    let Ok(()) = dashboard.draw_initial_frame(41.0);

    #[cfg(feature = "window")]
    if args.window {
        run_window(&mut dashboard, &mut meter, &mut status);
        return Ok(());
    }

    for _ in 0..args.ticks {
        step(&mut dashboard, &mut meter, &mut status);
    }

    let display = dashboard.release();
    display
        .to_rgb_output_image(&OutputSettingsBuilder::new().build())
        .save_png(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote {} after {} ticks", args.output.display(), args.ticks);

    Ok(())
}

#[cfg(feature = "window")]
fn run_window(dashboard: &mut SimDashboard, meter: &mut MockMeter, status: &mut MockStatus) {
    use embedded_graphics_simulator::{SimulatorEvent, Window};
    use std::time::Instant;

    const WINDOW_SCALE: u32 = 2;
    const FRAME_DURATION: Duration = Duration::from_millis(33);

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Wattview Simulator", &output_settings);
    window.update(dashboard.display());

    let mut last_tick = Instant::now();
    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            if let SimulatorEvent::Quit = event {
                break 'running;
            }
        }

        if last_tick.elapsed() >= Duration::from_secs_f64(TICK_SECS) {
            step(dashboard, meter, status);
            last_tick = Instant::now();
        }

        window.update(dashboard.display());

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
