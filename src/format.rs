//! Text formatting for the dashboard readouts
//!
//! All labels live in fixed-capacity `heapless` strings. Inputs are clamped to
//! a displayable range first so a pathological reading can never overflow a
//! label or push the layout math out of its rectangle.

use core::fmt::Write;

/// Capacity of a time digit group ("HH", "MM", "SS" or the "--" placeholder).
pub const TIME_DIGITS_CAPACITY: usize = 4;

/// One time digit group.
pub type TimeDigits = heapless::String<TIME_DIGITS_CAPACITY>;

/// A formatted reading, unit suffix included where it belongs to the text.
pub type Label = heapless::String<12>;

/// Shown in every time slot until the clock is known.
pub const TIME_PLACEHOLDER: &str = "--";

/// Readings above 1000 W switch to kilowatts; clamp keeps "99.9kW" the widest.
const POWER_RANGE_W: (f32, f32) = (-999.0, 99_949.0);
const VOLTAGE_RANGE_V: (f32, f32) = (-999.0, 9_999.0);
const CURRENT_RANGE_A: (f32, f32) = (-99.9, 999.9);
const TEMPERATURE_RANGE_C: (i32, i32) = (-99, 999);

/// Non-finite readings are shown as zero.
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Round half away from zero, the way the panel firmware always has.
pub fn round_to_i32(value: f32) -> i32 {
    // `as` saturates at the i32 bounds
    libm::roundf(finite_or_zero(value)) as i32
}

fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    finite_or_zero(value).clamp(min, max)
}

/// Unit a power reading is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUnit {
    Watts,
    Kilowatts,
}

impl PowerUnit {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Watts => "W",
            Self::Kilowatts => "kW",
        }
    }

    /// Horizontal gap between the value and its unit, in pixels.
    pub const fn gap(self) -> u32 {
        match self {
            Self::Watts => 3,
            Self::Kilowatts => 2,
        }
    }
}

/// Power value text with the unit drawn separately at a smaller scale.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerReading {
    pub value: Label,
    pub unit: PowerUnit,
}

/// Format active power.
///
/// The unit is picked on the unrounded value, so 999.6 W reads "1000" W while
/// 1000.0 W reads "1.0" kW.
pub fn format_power(watts: f32) -> PowerReading {
    let watts = clamp(watts, POWER_RANGE_W);
    let mut value = Label::new();

    let unit = if watts >= 1000.0 {
        write!(value, "{:.1}", watts / 1000.0).ok();
        PowerUnit::Kilowatts
    } else {
        write!(value, "{}", round_to_i32(watts)).ok();
        PowerUnit::Watts
    };

    PowerReading { value, unit }
}

/// Rounded volts, e.g. "231V".
pub fn format_voltage(volts: f32) -> Label {
    let mut label = Label::new();
    write!(label, "{}V", round_to_i32(clamp(volts, VOLTAGE_RANGE_V))).ok();
    label
}

/// Amps with one decimal, e.g. "4.7A".
pub fn format_current(amps: f32) -> Label {
    let mut label = Label::new();
    write!(label, "{:.1}A", clamp(amps, CURRENT_RANGE_A)).ok();
    label
}

/// Whole degrees, e.g. "42°C".
pub fn format_temperature(celsius: f32) -> Label {
    let (min, max) = TEMPERATURE_RANGE_C;
    let mut label = Label::new();
    write!(label, "{}\u{b0}C", round_to_i32(celsius).clamp(min, max)).ok();
    label
}

/// Two-digit clock field, or the placeholder when the clock is unknown.
pub fn time_digits(value: Option<u8>) -> TimeDigits {
    let mut digits = TimeDigits::new();
    match value {
        Some(value) => write!(digits, "{:02}", value.min(99)).ok(),
        None => digits.push_str(TIME_PLACEHOLDER).ok(),
    };
    digits
}

/// Copy a caller-provided digit group, dropping whatever does not fit.
pub fn digits_from_str(text: &str) -> TimeDigits {
    let mut digits = TimeDigits::new();
    for ch in text.chars() {
        if digits.push(ch).is_err() {
            break;
        }
    }
    digits
}
