//! Color definitions for the dashboard
//!
//! Every color is an RGB565 value so it can be written straight into a
//! canvas or pushed to the panel without conversion.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)
//!
//! The named constants match the ST77XX controller palette the panel
//! firmware has always used, so `ORANGE` is `0xFC00` and so on.

use embedded_graphics::pixelcolor::Rgb565;

// ============================================================================
// Base Colors
// ============================================================================

pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);

/// Pure white - maximum brightness in RGB565
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// `0x07E0`
pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);

/// `0xFFE0`
pub const YELLOW: Rgb565 = Rgb565::new(31, 63, 0);

/// `0xFC00`
pub const ORANGE: Rgb565 = Rgb565::new(31, 32, 0);

/// `0xF800`
pub const RED: Rgb565 = Rgb565::new(31, 0, 0);

/// `0x07FF`
pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);

/// `0xF81F`
pub const MAGENTA: Rgb565 = Rgb565::new(31, 0, 31);

/// Custom dark grey (`0x4228`) used for separators and unlit icon bars
pub const DARK_GREY: Rgb565 = Rgb565::new(8, 17, 8);

// ============================================================================
// Role Colors
// ============================================================================

pub const BACKGROUND: Rgb565 = BLACK;
pub const STATUS_BAR_BACKGROUND: Rgb565 = BLACK;

/// Divider under the status bar and the unlit signal bars.
pub const STATUS_BAR_LINE: Rgb565 = DARK_GREY;

pub const TIME: Rgb565 = WHITE;
pub const SIGNAL_ICON: Rgb565 = WHITE;
pub const VOLTAGE: Rgb565 = CYAN;
pub const CURRENT: Rgb565 = MAGENTA;

// ============================================================================
// Threshold Colors
// ============================================================================

/// 0 - 1500 W
pub const POWER_NORMAL: Rgb565 = GREEN;
/// >1500 - 2500 W
pub const POWER_MEDIUM: Rgb565 = YELLOW;
/// >2500 - 3500 W
pub const POWER_HIGH: Rgb565 = ORANGE;
/// >3500 W
pub const POWER_MAX: Rgb565 = RED;

/// < 60 C
pub const TEMP_NORMAL: Rgb565 = GREEN;
/// 60 - 65 C
pub const TEMP_WARM: Rgb565 = YELLOW;
/// 66 - 70 C
pub const TEMP_HOT: Rgb565 = ORANGE;
/// > 70 C
pub const TEMP_CRITICAL: Rgb565 = RED;

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::raw::{RawData, RawU16};

    fn raw(color: Rgb565) -> u16 {
        RawU16::from(color).into_inner()
    }

    #[test]
    fn test_palette_matches_controller_values() {
        assert_eq!(raw(WHITE), 0xFFFF);
        assert_eq!(raw(GREEN), 0x07E0);
        assert_eq!(raw(YELLOW), 0xFFE0);
        assert_eq!(raw(ORANGE), 0xFC00);
        assert_eq!(raw(RED), 0xF800);
        assert_eq!(raw(CYAN), 0x07FF);
        assert_eq!(raw(MAGENTA), 0xF81F);
        assert_eq!(raw(DARK_GREY), 0x4228);
    }
}
