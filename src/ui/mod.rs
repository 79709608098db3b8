//! egui widgets: menu bar, side panel, plot, and table preview.

pub mod panels;
pub mod plot;
pub mod table;
