//! Dashboard geometry, thresholds and buffering settings
//!
//! Defaults reproduce the 320x240 landscape layout the firmware ships with.
//! Everything is plain data so a host tool can load overrides with serde.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::ui::text::FONT;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub screen_width: u32,
    pub screen_height: u32,
    pub status_bar: StatusBarConfig,
    pub main_display: MainDisplayConfig,
    pub thresholds: ChangeThresholds,
    pub buffering: BufferingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            screen_width: 320,
            screen_height: 240,
            status_bar: StatusBarConfig::default(),
            main_display: MainDisplayConfig::default(),
            thresholds: ChangeThresholds::default(),
            buffering: BufferingConfig::default(),
        }
    }
}

/// Top strip: clock on the left, temperature and signal icon on the right.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StatusBarConfig {
    pub height: u32,
    /// Empty rows between the divider line and the main display
    pub bottom_padding: u32,
    pub font_scale: u32,
    pub time_font_scale: u32,
    pub time_left_x: u32,
    /// Fixed slot width for each of "HH", "MM" and "SS"
    pub time_segment_width: u32,
    pub time_separator_width: u32,
    /// Width cleared to the left of the temperature anchor before redrawing
    pub temperature_max_width: u32,
    pub temperature_icon_gap: u32,
    pub signal_icon_width: u32,
    pub signal_icon_height: u32,
    pub signal_icon_right_padding: u32,
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self {
            height: 40,
            bottom_padding: 20,
            font_scale: 2,
            time_font_scale: 2,
            time_left_x: 5,
            time_segment_width: 28,
            time_separator_width: 8,
            temperature_max_width: 65,
            temperature_icon_gap: 8,
            signal_icon_width: 24,
            signal_icon_height: 18,
            signal_icon_right_padding: 5,
        }
    }
}

impl StatusBarConfig {
    /// Width of the whole `HH:MM:SS` block.
    pub fn time_block_width(&self) -> u32 {
        self.time_segment_width
            .saturating_mul(3)
            .saturating_add(self.time_separator_width.saturating_mul(2))
    }

    /// Right edge the temperature text is aligned against.
    pub fn temperature_anchor_x(&self, screen_width: u32) -> i32 {
        coordinate(screen_width)
            .saturating_sub(coordinate(self.signal_icon_width))
            .saturating_sub(coordinate(self.signal_icon_right_padding))
            .saturating_sub(coordinate(self.temperature_icon_gap))
    }
}

/// Power on top, voltage and current side by side underneath.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MainDisplayConfig {
    pub power_value_scale: u32,
    pub power_unit_scale: u32,
    pub voltage_current_scale: u32,
    /// Share of the main area height given to the power readout
    pub power_share_percent: u32,
}

impl Default for MainDisplayConfig {
    fn default() -> Self {
        Self {
            power_value_scale: 11,
            power_unit_scale: 3,
            voltage_current_scale: 5,
            power_share_percent: 60,
        }
    }
}

/// Minimum changes that justify a redraw of continuous readings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChangeThresholds {
    pub power_watts: f32,
    pub current_amps: f32,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            power_watts: 0.5,
            current_amps: 0.05,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BufferingConfig {
    pub enabled: bool,
    /// Pause before each canvas allocation so the heap free-list settles
    pub settle_delay_ms: u32,
    /// Heap bytes the canvases may use in total; `None` means whatever the
    /// allocator can provide
    pub heap_budget_bytes: Option<usize>,
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_ms: 20,
            heap_budget_bytes: None,
        }
    }
}

/// Largest supported screen side in pixels.
pub const MAX_SCREEN_SIDE: u32 = 4096;

fn coordinate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Screen size must be non-zero")]
    EmptyScreen,
    #[error("Screen {width}x{height} exceeds {max}px per side")]
    ScreenTooLarge { width: u32, height: u32, max: u32 },
    #[error("Status bar ({status_bar}px + padding) leaves no room on a {screen}px screen")]
    StatusBarTooTall { status_bar: u32, screen: u32 },
    #[error("Signal icon does not fit in the status bar")]
    IconTooLarge,
    #[error("Status bar elements overlap (time ends at {time_end}, temperature starts at {temperature_start})")]
    StatusBarOverflow { time_end: i32, temperature_start: i32 },
    #[error("Font scale for {0} must be at least 1")]
    ZeroScale(&'static str),
    #[error("Font scale {scale} for {element} does not fit a {height}px row")]
    ScaleTooLarge {
        element: &'static str,
        scale: u32,
        height: u32,
    },
    #[error("Power share must be between 1 and 99 percent, got {0}")]
    InvalidShare(u32),
    #[error("Change threshold for {0} must be finite and non-negative")]
    InvalidThreshold(&'static str),
}

impl DashboardConfig {
    /// Check that the geometry can be laid out without overlapping elements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::EmptyScreen);
        }

        if self.screen_width > MAX_SCREEN_SIDE || self.screen_height > MAX_SCREEN_SIDE {
            return Err(ConfigError::ScreenTooLarge {
                width: self.screen_width,
                height: self.screen_height,
                max: MAX_SCREEN_SIDE,
            });
        }

        let bar = &self.status_bar;
        let main_top = bar
            .height
            .checked_add(1)
            .and_then(|h| h.checked_add(bar.bottom_padding))
            .filter(|&top| bar.height > 0 && top < self.screen_height);
        let Some(main_top) = main_top else {
            return Err(ConfigError::StatusBarTooTall {
                status_bar: bar.height,
                screen: self.screen_height,
            });
        };

        let icon_width = bar
            .signal_icon_width
            .checked_add(bar.signal_icon_right_padding);
        if bar.signal_icon_height > bar.height
            || icon_width.is_none_or(|width| width > self.screen_width)
        {
            return Err(ConfigError::IconTooLarge);
        }

        let time_end = coordinate(bar.time_left_x.saturating_add(bar.time_block_width()));
        let anchor = bar.temperature_anchor_x(self.screen_width);
        let temperature_start = anchor.saturating_sub(coordinate(bar.temperature_max_width));
        if anchor <= 0 || time_end > temperature_start {
            return Err(ConfigError::StatusBarOverflow {
                time_end,
                temperature_start,
            });
        }

        for (name, scale) in [
            ("status bar", bar.font_scale),
            ("time", bar.time_font_scale),
            ("power value", self.main_display.power_value_scale),
            ("power unit", self.main_display.power_unit_scale),
            ("voltage/current", self.main_display.voltage_current_scale),
        ] {
            if scale == 0 {
                return Err(ConfigError::ZeroScale(name));
            }
        }

        let share = self.main_display.power_share_percent;
        if !(1..=99).contains(&share) {
            return Err(ConfigError::InvalidShare(share));
        }

        // One glyph row must fit the strip the text is drawn in
        let main_height = self.screen_height - main_top;
        let power_height = main_height * share / 100;
        let lower_height = main_height - power_height;
        for (element, scale, height) in [
            ("status bar", bar.font_scale, bar.height),
            ("time", bar.time_font_scale, bar.height),
            ("power value", self.main_display.power_value_scale, power_height),
            ("power unit", self.main_display.power_unit_scale, power_height),
            ("voltage/current", self.main_display.voltage_current_scale, lower_height),
        ] {
            if scale.saturating_mul(FONT.character_size.height) > height {
                return Err(ConfigError::ScaleTooLarge {
                    element,
                    scale,
                    height,
                });
            }
        }

        for (name, threshold) in [
            ("power", self.thresholds.power_watts),
            ("current", self.thresholds.current_amps),
        ] {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(DashboardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_anchor_matches_firmware_layout() {
        let config = DashboardConfig::default();
        // 320 - 24 - 5 - 8
        assert_eq!(config.status_bar.temperature_anchor_x(320), 283);
        assert_eq!(config.status_bar.time_block_width(), 100);
    }

    #[test]
    fn test_status_bar_taller_than_screen() {
        let mut config = DashboardConfig::default();
        config.status_bar.height = 230;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StatusBarTooTall { .. })
        ));
    }

    #[test]
    fn test_overlapping_status_elements() {
        let mut config = DashboardConfig::default();
        config.status_bar.time_segment_width = 80;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StatusBarOverflow { .. })
        ));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut config = DashboardConfig::default();
        config.main_display.power_unit_scale = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroScale("power unit")));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = DashboardConfig::default();
        config.thresholds.current_amps = -0.1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidThreshold("current"))
        );
    }

    #[test]
    fn test_power_share_bounds() {
        let mut config = DashboardConfig::default();
        config.main_display.power_share_percent = 100;
        assert_eq!(config.validate(), Err(ConfigError::InvalidShare(100)));
    }

    #[test]
    fn test_overflowing_status_bar_is_an_error() {
        let mut config = DashboardConfig::default();
        config.status_bar.height = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StatusBarTooTall { .. })
        ));

        let mut config = DashboardConfig::default();
        config.status_bar.signal_icon_height = 10;
        config.status_bar.signal_icon_width = u32::MAX;
        assert_eq!(config.validate(), Err(ConfigError::IconTooLarge));

        let mut config = DashboardConfig::default();
        config.status_bar.time_segment_width = u32::MAX;
        config.status_bar.temperature_max_width = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StatusBarOverflow { .. })
        ));
    }

    #[test]
    fn test_oversized_screen_rejected() {
        let mut config = DashboardConfig::default();
        config.screen_width = u32::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScreenTooLarge { .. })
        ));
    }

    #[test]
    fn test_scale_must_fit_its_row() {
        let mut config = DashboardConfig::default();
        config.main_display.power_value_scale = 1_000_000_000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ScaleTooLarge {
                element: "power value",
                scale: 1_000_000_000,
                height: 107,
            })
        );

        // 12 * 9 = 108 rows, one more than the power strip has
        config.main_display.power_value_scale = 12;
        assert!(config.validate().is_err());
        config.main_display.power_value_scale = 11;
        assert_eq!(config.validate(), Ok(()));

        config.status_bar.time_font_scale = 5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ScaleTooLarge {
                element: "time",
                scale: 5,
                height: 40,
            })
        );
    }
}
