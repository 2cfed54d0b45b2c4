//! Styling for dashboard elements
//!
//! - [`colors`] - RGB565 constants for every element and threshold band
//! - [`layout`] - Screen regions and label placement math

pub mod colors;
pub mod layout;
