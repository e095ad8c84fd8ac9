//! GreenModel colors for CLI output.
//!
//! - Primary: Green (#10B981) - RGB(16, 185, 129)
//! - Accent: Cyan (#06B6D4) - RGB(6, 182, 212)
//! - Warning: Yellow (#F59E0B) - RGB(245, 158, 11)

use colored::Color;
use comfy_table::Color as ComfyColor;

pub struct GreenModelColors;

impl GreenModelColors {
    pub const PRIMARY_RGB: (u8, u8, u8) = (16, 185, 129);
    pub const ACCENT_RGB: (u8, u8, u8) = (6, 182, 212);
    pub const WARNING_RGB: (u8, u8, u8) = (245, 158, 11);

    pub fn primary() -> Color {
        rgb(Self::PRIMARY_RGB)
    }

    pub fn accent() -> Color {
        rgb(Self::ACCENT_RGB)
    }

    pub fn warning() -> Color {
        rgb(Self::WARNING_RGB)
    }

    /// Same palette for comfy-table cells.
    pub fn cell(rgb: (u8, u8, u8)) -> ComfyColor {
        ComfyColor::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 }
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::TrueColor { r, g, b }
}
