pub mod meter_renderer;
