// src/ui/mod.rs
//! Drawing helpers shared by the dashboard regions
//!
//! This module provides:
//! - Scaled text rendering and side-effect free text metrics
//! - The RGB565 palette
//! - Layout math for centering and aligning labels inside rectangles

pub mod styling;
pub mod text;

pub use styling::colors;
pub use styling::layout::{ScreenLayout, centered_origin, label_origin, power_origins, right_aligned_x};
pub use text::{TextStyle, draw_text, measure_text};
