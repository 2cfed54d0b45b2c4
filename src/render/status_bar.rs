//! Status bar: clock, internal temperature and signal icon
//!
//! The clock is split into three fixed-width slots so a changing seconds
//! value never shifts the hours and minutes. Each slot, the temperature and
//! the icon have their own rectangle and are redrawn independently.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::change::{BucketedLevel, ChangeDetector, ExactMatch, RoundedInteger, Slot};
use crate::color_scale::{SignalLevel, temperature_color};
use crate::config::DashboardConfig;
use crate::format::{TimeDigits, format_temperature};
use crate::render::{Pass, RegionContent, repaint_element};
use crate::telemetry::StatusSnapshot;
use crate::ui::{TextStyle, colors, draw_text, label_origin, measure_text, right_aligned_x};

const SIGNAL_BAR_WIDTH: u32 = 4;
const SIGNAL_BAR_GAP: u32 = 2;

/// Region-local rectangles of every status bar element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusBarGeometry {
    pub time_slots: [Rectangle; 3],
    pub separators: [Rectangle; 2],
    /// Area cleared before the temperature is redrawn
    pub temperature: Rectangle,
    /// Right edge of the temperature text
    pub temperature_anchor_x: i32,
    pub signal_icon: Rectangle,
    pub text_scale: u32,
    pub time_scale: u32,
}

impl StatusBarGeometry {
    pub fn new(config: &DashboardConfig) -> Self {
        let bar = &config.status_bar;
        let height = bar.height;
        let strip = |x: i32, width: u32| Rectangle::new(Point::new(x, 0), Size::new(width, height));

        let segment = bar.time_segment_width as i32;
        let separator = bar.time_separator_width as i32;
        let hours_x = bar.time_left_x as i32;
        let minutes_x = hours_x + segment + separator;
        let seconds_x = minutes_x + segment + separator;

        let anchor = bar.temperature_anchor_x(config.screen_width);
        let clear_x = (anchor - bar.temperature_max_width as i32).max(0);

        let icon_x = config.screen_width as i32
            - bar.signal_icon_width as i32
            - bar.signal_icon_right_padding as i32;
        let icon_y = (height.saturating_sub(bar.signal_icon_height) / 2) as i32;

        Self {
            time_slots: [
                strip(hours_x, bar.time_segment_width),
                strip(minutes_x, bar.time_segment_width),
                strip(seconds_x, bar.time_segment_width),
            ],
            separators: [
                strip(hours_x + segment, bar.time_separator_width),
                strip(minutes_x + segment, bar.time_separator_width),
            ],
            temperature: strip(clear_x, (anchor - clear_x).max(0) as u32),
            temperature_anchor_x: anchor,
            signal_icon: Rectangle::new(
                Point::new(icon_x, icon_y),
                Size::new(bar.signal_icon_width, bar.signal_icon_height),
            ),
            text_scale: bar.font_scale,
            time_scale: bar.time_font_scale,
        }
    }

    /// Bar `index` (0 = shortest) of the signal icon.
    pub fn signal_bar(&self, index: u8) -> Rectangle {
        let icon = &self.signal_icon;
        let bars = u32::from(SignalLevel::MAX);
        let icon_width = bars * SIGNAL_BAR_WIDTH + (bars - 1) * SIGNAL_BAR_GAP;
        let start_x = icon.top_left.x + (icon.size.width.saturating_sub(icon_width) / 2) as i32;

        let bar_height = icon.size.height * (u32::from(index) + 1) / bars;
        Rectangle::new(
            Point::new(
                start_x + i32::from(index) * (SIGNAL_BAR_WIDTH + SIGNAL_BAR_GAP) as i32,
                icon.top_left.y + (icon.size.height - bar_height) as i32,
            ),
            Size::new(SIGNAL_BAR_WIDTH, bar_height),
        )
    }
}

/// Redraw decisions for one status bar update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFrame {
    pub time: [Slot<TimeDigits>; 3],
    pub separators: bool,
    pub temperature: Slot<f32>,
    pub signal: Slot<i32>,
}

pub struct StatusBar {
    geometry: StatusBarGeometry,
    time: [ChangeDetector<TimeDigits, ExactMatch>; 3],
    temperature: ChangeDetector<f32, RoundedInteger>,
    signal: ChangeDetector<i32, BucketedLevel>,
    separators_drawn: bool,
}

impl StatusBar {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            geometry: StatusBarGeometry::new(config),
            time: [
                ChangeDetector::new(ExactMatch),
                ChangeDetector::new(ExactMatch),
                ChangeDetector::new(ExactMatch),
            ],
            temperature: ChangeDetector::new(RoundedInteger),
            signal: ChangeDetector::new(BucketedLevel),
            separators_drawn: false,
        }
    }

    pub fn geometry(&self) -> &StatusBarGeometry {
        &self.geometry
    }

    fn draw_time_slot<T>(&self, target: &mut T, index: usize, digits: &str) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let slot = self.geometry.time_slots[index];
        let size = measure_text(digits, self.geometry.time_scale);
        let origin = Point::new(
            right_aligned_x(slot.top_left.x + slot.size.width as i32, size.width, slot.top_left.x),
            label_origin(&slot, size).y,
        );
        let style = TextStyle::new(self.geometry.time_scale, colors::TIME);

        repaint_element(target, &slot, colors::STATUS_BAR_BACKGROUND, |t| {
            draw_text(t, digits, origin, style)
        })
    }

    fn draw_separator<T>(&self, target: &mut T, index: usize) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let area = self.geometry.separators[index];
        let size = measure_text(":", self.geometry.time_scale);
        let origin = Point::new(area.top_left.x, label_origin(&area, size).y);
        let style = TextStyle::new(self.geometry.time_scale, colors::TIME);

        repaint_element(target, &area, colors::STATUS_BAR_BACKGROUND, |t| {
            draw_text(t, ":", origin, style)
        })
    }

    fn draw_temperature<T>(&self, target: &mut T, celsius: f32) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let area = self.geometry.temperature;
        let label = format_temperature(celsius);
        let size = measure_text(&label, self.geometry.text_scale);
        let origin = Point::new(
            right_aligned_x(self.geometry.temperature_anchor_x, size.width, area.top_left.x),
            label_origin(&area, size).y,
        );
        let style = TextStyle::new(self.geometry.text_scale, temperature_color(celsius));

        repaint_element(target, &area, colors::STATUS_BAR_BACKGROUND, |t| {
            draw_text(t, &label, origin, style)
        })
    }

    fn draw_signal<T>(&self, target: &mut T, dbm: i32) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let level = SignalLevel::from_dbm(dbm);
        repaint_element(
            target,
            &self.geometry.signal_icon,
            colors::STATUS_BAR_BACKGROUND,
            |t| {
                for index in 0..SignalLevel::MAX {
                    let color = if level.is_lit(index) {
                        colors::SIGNAL_ICON
                    } else {
                        colors::STATUS_BAR_LINE
                    };
                    t.fill_solid(&self.geometry.signal_bar(index), color)?;
                }
                Ok(())
            },
        )
    }
}

impl RegionContent for StatusBar {
    type Snapshot = StatusSnapshot;
    type Frame = StatusFrame;

    fn plan(&self, snapshot: &StatusSnapshot, force: bool) -> StatusFrame {
        let groups = snapshot.time_groups();
        StatusFrame {
            time: [
                self.time[0].slot(groups[0], force),
                self.time[1].slot(groups[1], force),
                self.time[2].slot(groups[2], force),
            ],
            separators: force || !self.separators_drawn,
            temperature: self.temperature.slot(&snapshot.internal_temp_c, force),
            signal: self.signal.slot(&snapshot.signal_dbm, force),
        }
    }

    fn has_changes(frame: &StatusFrame) -> bool {
        frame.separators
            || frame.time.iter().any(|slot| slot.changed)
            || frame.temperature.changed
            || frame.signal.changed
    }

    fn paint<T>(&mut self, target: &mut T, frame: &StatusFrame, pass: Pass) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let direct = pass == Pass::Direct;
        let staged = pass == Pass::Staged;

        for (index, slot) in frame.time.iter().enumerate() {
            if staged || slot.changed {
                self.draw_time_slot(target, index, &slot.value)?;
                if direct {
                    self.time[index].commit(slot.value.clone());
                }
            }
        }

        if staged || frame.separators {
            self.draw_separator(target, 0)?;
            self.draw_separator(target, 1)?;
            if direct {
                self.separators_drawn = true;
            }
        }

        if staged || frame.temperature.changed {
            self.draw_temperature(target, frame.temperature.value)?;
            if direct {
                self.temperature.commit(frame.temperature.value);
            }
        }

        if staged || frame.signal.changed {
            self.draw_signal(target, frame.signal.value)?;
            if direct {
                self.signal.commit(frame.signal.value);
            }
        }

        Ok(())
    }

    fn commit(&mut self, frame: &StatusFrame) {
        for (detector, slot) in self.time.iter_mut().zip(frame.time.iter()) {
            detector.commit(slot.value.clone());
        }
        self.separators_drawn = true;
        self.temperature.commit(frame.temperature.value);
        self.signal.commit(frame.signal.value);
    }

    fn invalidate(&mut self) {
        for detector in &mut self.time {
            detector.invalidate();
        }
        self.temperature.invalidate();
        self.signal.invalidate();
        self.separators_drawn = false;
    }

    fn background(&self) -> Rgb565 {
        colors::STATUS_BAR_BACKGROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RegionRenderer, UpdateOutcome};
    use crate::testing::MockPanel;

    fn region() -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(320, 40))
    }

    fn renderer() -> RegionRenderer<StatusBar> {
        RegionRenderer::new(region(), None, StatusBar::new(&DashboardConfig::default()))
    }

    fn snapshot(temp: f32, dbm: i32, seconds: &str) -> StatusSnapshot {
        StatusSnapshot::new(temp, dbm, "12", "34", seconds)
    }

    #[test]
    fn test_default_geometry() {
        let geometry = StatusBarGeometry::new(&DashboardConfig::default());
        assert_eq!(geometry.time_slots[0].top_left.x, 5);
        assert_eq!(geometry.separators[0].top_left.x, 33);
        assert_eq!(geometry.time_slots[1].top_left.x, 41);
        assert_eq!(geometry.separators[1].top_left.x, 69);
        assert_eq!(geometry.time_slots[2].top_left.x, 77);
        assert_eq!(
            geometry.temperature,
            Rectangle::new(Point::new(218, 0), Size::new(65, 40))
        );
        assert_eq!(
            geometry.signal_icon,
            Rectangle::new(Point::new(291, 11), Size::new(24, 18))
        );
    }

    #[test]
    fn test_signal_bars_grow_left_to_right() {
        let geometry = StatusBarGeometry::new(&DashboardConfig::default());
        assert_eq!(
            geometry.signal_bar(0),
            Rectangle::new(Point::new(292, 25), Size::new(4, 4))
        );
        assert_eq!(
            geometry.signal_bar(3),
            Rectangle::new(Point::new(310, 11), Size::new(4, 18))
        );
    }

    #[test]
    fn test_second_identical_update_draws_nothing() {
        let mut panel = MockPanel::qvga();
        let mut bar = renderer();
        let status = snapshot(42.0, -60, "56");

        assert_eq!(bar.update(&mut panel, &status, false).unwrap(), UpdateOutcome::Drawn);
        panel.reset_counters();

        assert_eq!(bar.update(&mut panel, &status, false).unwrap(), UpdateOutcome::Unchanged);
        assert_eq!(panel.draw_calls, 0);
    }

    #[test]
    fn test_only_changed_seconds_slot_is_redrawn() {
        let mut panel = MockPanel::qvga();
        let mut bar = renderer();
        bar.update(&mut panel, &snapshot(42.0, -60, "56"), true).unwrap();
        panel.reset_counters();

        bar.update(&mut panel, &snapshot(42.2, -62, "57"), false).unwrap();
        let touched = panel.touched().unwrap();
        assert_eq!(touched.top_left.x, 77);
        assert!(touched.bottom_right().unwrap().x < 105);
    }

    #[test]
    fn test_signal_within_bucket_is_not_redrawn() {
        let mut panel = MockPanel::qvga();
        let mut bar = renderer();
        bar.update(&mut panel, &snapshot(42.0, -56, "00"), false).unwrap();
        panel.reset_counters();

        assert_eq!(
            bar.update(&mut panel, &snapshot(42.0, -58, "00"), false).unwrap(),
            UpdateOutcome::Unchanged
        );

        bar.update(&mut panel, &snapshot(42.0, -70, "00"), false).unwrap();
        let icon = bar.content().geometry().signal_icon;
        assert_eq!(panel.touched(), Some(icon));
        assert_eq!(panel.pixel(293, 28), colors::SIGNAL_ICON);
        assert_eq!(panel.pixel(299, 22), colors::SIGNAL_ICON);
        assert_eq!(panel.pixel(305, 20), colors::STATUS_BAR_LINE);
        assert_eq!(panel.pixel(311, 12), colors::STATUS_BAR_LINE);
    }

    #[test]
    fn test_temperature_color_follows_rounded_value() {
        let mut panel = MockPanel::qvga();
        let mut bar = renderer();
        let area = bar.content().geometry().temperature;

        bar.update(&mut panel, &snapshot(59.6, -60, "00"), false).unwrap();
        assert!(panel.count_color(&area, colors::TEMP_WARM) > 0);

        bar.update(&mut panel, &snapshot(65.4, -60, "00"), false).unwrap();
        assert!(panel.count_color(&area, colors::TEMP_WARM) > 0);

        bar.update(&mut panel, &snapshot(65.6, -60, "00"), false).unwrap();
        assert!(panel.count_color(&area, colors::TEMP_HOT) > 0);
        assert_eq!(panel.count_color(&area, colors::TEMP_WARM), 0);
    }

    #[test]
    fn test_force_redraws_every_element() {
        let mut panel = MockPanel::qvga();
        let mut bar = renderer();
        let status = snapshot(42.0, -60, "56");
        bar.update(&mut panel, &status, false).unwrap();

        let frame = bar.content().plan(&status, true);
        assert!(frame.separators);
        assert!(frame.time.iter().all(|slot| slot.changed));
        assert!(frame.temperature.changed && frame.signal.changed);

        panel.reset_counters();
        bar.update(&mut panel, &status, true).unwrap();
        let touched = panel.touched().unwrap();
        assert_eq!(touched.top_left.x, 5);
        assert_eq!(touched.bottom_right().unwrap().x, 314);
    }

    #[test]
    fn test_invalidate_redraws_separators() {
        let mut bar = renderer();
        let mut panel = MockPanel::qvga();
        let status = snapshot(42.0, -60, "56");
        bar.update(&mut panel, &status, false).unwrap();
        assert!(!bar.content().plan(&status, false).separators);

        bar.invalidate();
        assert!(bar.content().plan(&status, false).separators);
    }
}
