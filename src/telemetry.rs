//! Snapshots fed to the renderers and the sources that produce them.

use core::fmt::Debug;

use crate::format::{TimeDigits, digits_from_str, time_digits};

/// Reported when the radio is not associated.
pub const NO_SIGNAL_DBM: i32 = -100;

/// One reading of the power meter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub voltage: f32,
    pub current: f32,
    pub active_power: f32,
}

impl TelemetrySnapshot {
    pub const fn new(voltage: f32, current: f32, active_power: f32) -> Self {
        Self {
            voltage,
            current,
            active_power,
        }
    }
}

/// Wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl ClockTime {
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

/// Everything shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub internal_temp_c: f32,
    pub signal_dbm: i32,
    pub hours: TimeDigits,
    pub minutes: TimeDigits,
    pub seconds: TimeDigits,
}

impl StatusSnapshot {
    /// Digit groups longer than four characters are truncated.
    pub fn new(internal_temp_c: f32, signal_dbm: i32, hours: &str, minutes: &str, seconds: &str) -> Self {
        Self {
            internal_temp_c,
            signal_dbm,
            hours: digits_from_str(hours),
            minutes: digits_from_str(minutes),
            seconds: digits_from_str(seconds),
        }
    }

    /// Zero-padded digits from `clock`, or `--` in every slot when the time is unknown.
    pub fn from_clock(internal_temp_c: f32, signal_dbm: i32, clock: Option<ClockTime>) -> Self {
        Self {
            internal_temp_c,
            signal_dbm,
            hours: time_digits(clock.map(|c| c.hours)),
            minutes: time_digits(clock.map(|c| c.minutes)),
            seconds: time_digits(clock.map(|c| c.seconds)),
        }
    }

    /// What the status bar shows before the clock and the radio are up.
    pub fn placeholder(internal_temp_c: f32) -> Self {
        Self::from_clock(internal_temp_c, NO_SIGNAL_DBM, None)
    }

    pub fn time_groups(&self) -> [&TimeDigits; 3] {
        [&self.hours, &self.minutes, &self.seconds]
    }
}

/// Pull-based feed of power readings.
pub trait TelemetrySource {
    type Error: Debug;

    fn fetch(&mut self) -> Result<TelemetrySnapshot, Self::Error>;
}

/// Feed of status bar data; always has something to show.
pub trait StatusSource {
    fn status(&mut self) -> StatusSnapshot;
}
