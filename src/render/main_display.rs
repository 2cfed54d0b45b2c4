//! Main display: active power on top, voltage and current underneath.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::change::{AbsoluteTolerance, AnyOf, ChangeDetector, ColorBand, RoundedInteger, Slot};
use crate::color_scale::{POWER_SCALE, power_color};
use crate::config::DashboardConfig;
use crate::format::{format_current, format_power, format_voltage};
use crate::render::{Pass, RegionContent, repaint_element};
use crate::telemetry::TelemetrySnapshot;
use crate::ui::styling::layout::{split_columns, split_rows};
use crate::ui::{TextStyle, colors, draw_text, label_origin, measure_text, power_origins};

type PowerPolicy = AnyOf<AbsoluteTolerance, ColorBand<3>>;

/// Region-local rectangles of the three readouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainDisplayGeometry {
    pub power: Rectangle,
    pub voltage: Rectangle,
    pub current: Rectangle,
    pub power_value_scale: u32,
    pub power_unit_scale: u32,
    pub label_scale: u32,
}

impl MainDisplayGeometry {
    pub fn new(config: &DashboardConfig, region_size: Size) -> Self {
        let main = &config.main_display;
        let area = Rectangle::new(Point::zero(), region_size);
        let (power, lower) = split_rows(&area, main.power_share_percent);
        let (voltage, current) = split_columns(&lower);

        Self {
            power,
            voltage,
            current,
            power_value_scale: main.power_value_scale,
            power_unit_scale: main.power_unit_scale,
            label_scale: main.voltage_current_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainFrame {
    pub power: Slot<f32>,
    pub voltage: Slot<f32>,
    pub current: Slot<f32>,
}

pub struct MainDisplay {
    geometry: MainDisplayGeometry,
    power: ChangeDetector<f32, PowerPolicy>,
    voltage: ChangeDetector<f32, RoundedInteger>,
    current: ChangeDetector<f32, AbsoluteTolerance>,
}

impl MainDisplay {
    pub fn new(config: &DashboardConfig, region_size: Size) -> Self {
        let thresholds = &config.thresholds;
        Self {
            geometry: MainDisplayGeometry::new(config, region_size),
            power: ChangeDetector::new(AnyOf(
                AbsoluteTolerance(thresholds.power_watts),
                ColorBand(&POWER_SCALE),
            )),
            voltage: ChangeDetector::new(RoundedInteger),
            current: ChangeDetector::new(AbsoluteTolerance(thresholds.current_amps)),
        }
    }

    pub fn geometry(&self) -> &MainDisplayGeometry {
        &self.geometry
    }

    fn draw_power<T>(&self, target: &mut T, watts: f32) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let geometry = &self.geometry;
        let reading = format_power(watts);
        let unit = reading.unit.suffix();
        let value_size = measure_text(&reading.value, geometry.power_value_scale);
        let unit_size = measure_text(unit, geometry.power_unit_scale);
        let (value_origin, unit_origin) =
            power_origins(&geometry.power, value_size, unit_size, reading.unit.gap());

        let color = power_color(watts);
        repaint_element(target, &geometry.power, colors::BACKGROUND, |t| {
            draw_text(
                t,
                &reading.value,
                value_origin,
                TextStyle::new(geometry.power_value_scale, color),
            )?;
            draw_text(
                t,
                unit,
                unit_origin,
                TextStyle::new(geometry.power_unit_scale, color),
            )
        })
    }

    fn draw_label<T>(
        &self,
        target: &mut T,
        area: &Rectangle,
        label: &str,
        color: Rgb565,
    ) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let scale = self.geometry.label_scale;
        let origin = label_origin(area, measure_text(label, scale));
        repaint_element(target, area, colors::BACKGROUND, |t| {
            draw_text(t, label, origin, TextStyle::new(scale, color))
        })
    }
}

impl RegionContent for MainDisplay {
    type Snapshot = TelemetrySnapshot;
    type Frame = MainFrame;

    fn plan(&self, snapshot: &TelemetrySnapshot, force: bool) -> MainFrame {
        MainFrame {
            power: self.power.slot(&snapshot.active_power, force),
            voltage: self.voltage.slot(&snapshot.voltage, force),
            current: self.current.slot(&snapshot.current, force),
        }
    }

    fn has_changes(frame: &MainFrame) -> bool {
        frame.power.changed || frame.voltage.changed || frame.current.changed
    }

    fn paint<T>(&mut self, target: &mut T, frame: &MainFrame, pass: Pass) -> Result<(), T::Error>
    where
        T: DrawTarget<Color = Rgb565>,
    {
        let direct = pass == Pass::Direct;
        let staged = pass == Pass::Staged;

        if staged || frame.power.changed {
            self.draw_power(target, frame.power.value)?;
            if direct {
                self.power.commit(frame.power.value);
            }
        }

        if staged || frame.voltage.changed {
            let area = self.geometry.voltage;
            self.draw_label(target, &area, &format_voltage(frame.voltage.value), colors::VOLTAGE)?;
            if direct {
                self.voltage.commit(frame.voltage.value);
            }
        }

        if staged || frame.current.changed {
            let area = self.geometry.current;
            self.draw_label(target, &area, &format_current(frame.current.value), colors::CURRENT)?;
            if direct {
                self.current.commit(frame.current.value);
            }
        }

        Ok(())
    }

    fn commit(&mut self, frame: &MainFrame) {
        self.power.commit(frame.power.value);
        self.voltage.commit(frame.voltage.value);
        self.current.commit(frame.current.value);
    }

    fn invalidate(&mut self) {
        self.power.invalidate();
        self.voltage.invalidate();
        self.current.invalidate();
    }

    fn background(&self) -> Rgb565 {
        colors::BACKGROUND
    }
}
