//! Threshold tables that turn a reading into a display color or level.
//!
//! All thresholds are compile-time constants with ordering assertions, so a
//! misordered table fails the build instead of mis-coloring the screen.

use embedded_graphics::pixelcolor::Rgb565;

use crate::format::{finite_or_zero, round_to_i32};
use crate::ui::styling::colors;

/// Ordered `(upper_bound, color)` bands; values above the last bound get the
/// overflow color.
///
/// Bounds are inclusive and evaluated in ascending order, first match wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale<const N: usize> {
    bands: [(f32, Rgb565); N],
    overflow: Rgb565,
}

impl<const N: usize> ColorScale<N> {
    pub const fn new(bands: [(f32, Rgb565); N], overflow: Rgb565) -> Self {
        Self { bands, overflow }
    }

    /// Index of the band `value` falls into; `N` is the unbounded overflow band.
    pub fn band(&self, value: f32) -> usize {
        let value = finite_or_zero(value);
        self.bands
            .iter()
            .position(|(upper, _)| value <= *upper)
            .unwrap_or(N)
    }

    pub fn classify(&self, value: f32) -> Rgb565 {
        match self.bands.get(self.band(value)) {
            Some((_, color)) => *color,
            None => self.overflow,
        }
    }
}

// =============================================================================
// Active Power
// =============================================================================

pub const POWER_NORMAL_MAX_W: f32 = 1500.0;
pub const POWER_MEDIUM_MAX_W: f32 = 2500.0;
pub const POWER_HIGH_MAX_W: f32 = 3500.0;

const _: () = assert!(POWER_NORMAL_MAX_W < POWER_MEDIUM_MAX_W);
const _: () = assert!(POWER_MEDIUM_MAX_W < POWER_HIGH_MAX_W);

pub static POWER_SCALE: ColorScale<3> = ColorScale::new(
    [
        (POWER_NORMAL_MAX_W, colors::POWER_NORMAL),
        (POWER_MEDIUM_MAX_W, colors::POWER_MEDIUM),
        (POWER_HIGH_MAX_W, colors::POWER_HIGH),
    ],
    colors::POWER_MAX,
);

pub fn power_color(watts: f32) -> Rgb565 {
    POWER_SCALE.classify(watts)
}

// =============================================================================
// Internal Temperature
// =============================================================================

/// Classified on the rounded reading, so these are whole degrees.
pub const TEMP_NORMAL_MAX_C: f32 = 59.0;
pub const TEMP_WARM_MAX_C: f32 = 65.0;
pub const TEMP_HOT_MAX_C: f32 = 70.0;

const _: () = assert!(TEMP_NORMAL_MAX_C < TEMP_WARM_MAX_C);
const _: () = assert!(TEMP_WARM_MAX_C < TEMP_HOT_MAX_C);

pub static TEMPERATURE_SCALE: ColorScale<3> = ColorScale::new(
    [
        (TEMP_NORMAL_MAX_C, colors::TEMP_NORMAL),
        (TEMP_WARM_MAX_C, colors::TEMP_WARM),
        (TEMP_HOT_MAX_C, colors::TEMP_HOT),
    ],
    colors::TEMP_CRITICAL,
);

pub fn temperature_color(celsius: f32) -> Rgb565 {
    TEMPERATURE_SCALE.classify(round_to_i32(celsius) as f32)
}

// =============================================================================
// Signal Strength
// =============================================================================

/// Lower dBm bound of levels 4, 3, 2 and 1; anything weaker is level 0.
pub const SIGNAL_FLOORS_DBM: [i32; 4] = [-55, -65, -75, -85];

const _: () = assert!(SIGNAL_FLOORS_DBM[0] > SIGNAL_FLOORS_DBM[1]);
const _: () = assert!(SIGNAL_FLOORS_DBM[1] > SIGNAL_FLOORS_DBM[2]);
const _: () = assert!(SIGNAL_FLOORS_DBM[2] > SIGNAL_FLOORS_DBM[3]);

/// Signal strength bucketed into 0-4 bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SignalLevel(u8);

impl SignalLevel {
    pub const MAX: u8 = SIGNAL_FLOORS_DBM.len() as u8;

    pub fn from_dbm(dbm: i32) -> Self {
        let weaker_floors = SIGNAL_FLOORS_DBM
            .iter()
            .position(|floor| dbm >= *floor)
            .unwrap_or(SIGNAL_FLOORS_DBM.len());
        Self(Self::MAX - weaker_floors as u8)
    }

    pub const fn bars(self) -> u8 {
        self.0
    }

    /// Whether bar `index` (0 = shortest) is lit at this level.
    pub const fn is_lit(self, index: u8) -> bool {
        self.0 > index
    }
}
