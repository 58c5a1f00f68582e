pub mod map;
pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::Color32;
use palette::{Srgb, Srgba};

pub fn color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

pub fn color32_alpha(c: Srgba<u8>) -> Color32 {
    Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, c.alpha)
}
