pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::Color32;

/// Points at or above the filtered mean.
pub const ABOVE_COLOR: Color32 = Color32::from_rgb(22, 163, 74);
/// Points below the filtered mean.
pub const BELOW_COLOR: Color32 = Color32::from_rgb(220, 38, 38);
