pub mod app;
pub mod family_canvas;
pub mod theme_toggle;
