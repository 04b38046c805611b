pub mod app;
pub mod credits_panel;
pub mod scene_grid;
pub mod vu_meter;
