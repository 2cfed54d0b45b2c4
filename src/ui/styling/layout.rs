//! Screen regions and label placement
//!
//! The screen is split into a status bar along the top edge, a one pixel
//! divider under it, some padding, and the main display below. Label
//! placement helpers clamp their results to the target rectangle so an
//! oversized label is cut at the rectangle's right edge instead of spilling
//! past its left edge.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::DashboardConfig;

// ============================================================================
// Screen Regions
// ============================================================================

/// Absolute rectangles of the dashboard regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    pub screen: Rectangle,
    pub status_bar: Rectangle,
    /// Horizontal line right under the status bar
    pub divider: Rectangle,
    pub main: Rectangle,
}

impl ScreenLayout {
    /// Expects a configuration that passed [`DashboardConfig::validate`].
    pub fn new(config: &DashboardConfig) -> Self {
        let width = config.screen_width;
        let bar_height = config.status_bar.height;
        let main_top = bar_height + 1 + config.status_bar.bottom_padding;

        Self {
            screen: Rectangle::new(Point::zero(), Size::new(width, config.screen_height)),
            status_bar: Rectangle::new(Point::zero(), Size::new(width, bar_height)),
            divider: Rectangle::new(Point::new(0, bar_height as i32), Size::new(width, 1)),
            main: Rectangle::new(
                Point::new(0, main_top as i32),
                Size::new(width, config.screen_height.saturating_sub(main_top)),
            ),
        }
    }
}

/// Split `area` into a top part holding `percent` of the height and the rest.
pub fn split_rows(area: &Rectangle, percent: u32) -> (Rectangle, Rectangle) {
    let top_height = area.size.height * percent.min(100) / 100;
    let top = Rectangle::new(area.top_left, Size::new(area.size.width, top_height));
    let bottom = Rectangle::new(
        area.top_left + Point::new(0, top_height as i32),
        Size::new(area.size.width, area.size.height - top_height),
    );
    (top, bottom)
}

/// Split `area` into left and right halves; an odd pixel goes to the right.
pub fn split_columns(area: &Rectangle) -> (Rectangle, Rectangle) {
    let left_width = area.size.width / 2;
    let left = Rectangle::new(area.top_left, Size::new(left_width, area.size.height));
    let right = Rectangle::new(
        area.top_left + Point::new(left_width as i32, 0),
        Size::new(area.size.width - left_width, area.size.height),
    );
    (left, right)
}

// ============================================================================
// Label Placement
// ============================================================================

/// Offset that centers `inner` within `outer`, never negative.
fn center_offset(outer: u32, inner: u32) -> i32 {
    (outer.saturating_sub(inner) / 2) as i32
}

/// Top-left corner that centers `content` in `area`.
pub fn centered_origin(area: &Rectangle, content: Size) -> Point {
    area.top_left
        + Point::new(
            center_offset(area.size.width, content.width),
            center_offset(area.size.height, content.height),
        )
}

/// Origin for a single-line label centered in `area`.
///
/// The font cell carries its blank row at the bottom, so labels sit one
/// pixel lower than the geometric center.
pub fn label_origin(area: &Rectangle, content: Size) -> Point {
    centered_origin(area, content) + Point::new(0, 1)
}

/// Left edge of a label whose right edge sits on `anchor_x`, never left of `min_x`.
pub fn right_aligned_x(anchor_x: i32, width: u32, min_x: i32) -> i32 {
    (anchor_x - width as i32).max(min_x)
}

/// Origins of the power value and its unit.
///
/// `value + gap + unit` is centered horizontally, the value is centered
/// vertically, and the unit is lifted so its bottom sits a tenth of the value
/// height above the value's bottom edge.
pub fn power_origins(area: &Rectangle, value: Size, unit: Size, gap: u32) -> (Point, Point) {
    let total_width = value.width + gap + unit.width;
    let value_origin = area.top_left
        + Point::new(
            center_offset(area.size.width, total_width),
            center_offset(area.size.height, value.height),
        );

    let unit_origin = Point::new(
        value_origin.x + (value.width + gap) as i32,
        value_origin.y + value.height as i32 - unit.height as i32 - (value.height / 10) as i32,
    );

    (value_origin, unit_origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_screen_layout() {
        let layout = ScreenLayout::new(&DashboardConfig::default());
        assert_eq!(layout.status_bar, Rectangle::new(Point::zero(), Size::new(320, 40)));
        assert_eq!(layout.divider, Rectangle::new(Point::new(0, 40), Size::new(320, 1)));
        assert_eq!(layout.main, Rectangle::new(Point::new(0, 61), Size::new(320, 179)));
    }

    #[test]
    fn test_split_rows_matches_sixty_percent() {
        let main = Rectangle::new(Point::zero(), Size::new(320, 179));
        let (top, bottom) = split_rows(&main, 60);
        assert_eq!(top.size.height, 107);
        assert_eq!(bottom.top_left.y, 107);
        assert_eq!(bottom.size.height, 72);
    }

    #[test]
    fn test_split_columns() {
        let area = Rectangle::new(Point::new(0, 107), Size::new(321, 72));
        let (left, right) = split_columns(&area);
        assert_eq!(left.size.width, 160);
        assert_eq!(right.top_left, Point::new(160, 107));
        assert_eq!(right.size.width, 161);
    }

    #[test]
    fn test_label_origin_centers_with_nudge() {
        let area = Rectangle::new(Point::new(0, 107), Size::new(160, 72));
        // "230V" at scale 5 is 120x45
        let origin = label_origin(&area, Size::new(120, 45));
        assert_eq!(origin, Point::new(20, 107 + 13 + 1));
    }

    #[test]
    fn test_oversized_label_is_clamped_to_area() {
        let area = Rectangle::new(Point::new(160, 0), Size::new(160, 40));
        let origin = centered_origin(&area, Size::new(400, 80));
        assert_eq!(origin, Point::new(160, 0));
        assert_eq!(right_aligned_x(283, 400, 218), 218);
        assert_eq!(right_aligned_x(283, 48, 218), 235);
    }

    #[test]
    fn test_power_origins() {
        let area = Rectangle::new(Point::zero(), Size::new(320, 107));
        // "1.0" at scale 11 next to "kW" at scale 3
        let (value, unit) = power_origins(&area, Size::new(198, 99), Size::new(36, 27), 2);
        assert_eq!(value, Point::new((320 - 236) / 2, 4));
        assert_eq!(unit, Point::new(42 + 200, 4 + 99 - 27 - 9));
    }
}
