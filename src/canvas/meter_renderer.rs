use web_sys::CanvasRenderingContext2d;
use apulati_core::analysis::WaveformTrail;

pub const METER_WIDTH: u32 = 60;
pub const METER_HEIGHT: u32 = 200;
pub const TRACE_WIDTH: u32 = 200;
pub const TRACE_HEIGHT: u32 = 100;

const BAR_INSET: f64 = 10.0;
const ACCENT_RGB: (u8, u8, u8) = (74, 144, 226);

fn accent(opacity: f64) -> String {
    let (r, g, b) = ACCENT_RGB;
    format!("rgba({r}, {g}, {b}, {opacity:.3})")
}

/// `(x, y, w, h)` of the volume bar, growing up from the bottom edge.
pub fn bar_rect(volume: f32, width: f64, height: f64) -> (f64, f64, f64, f64) {
    let bar_h = height * volume.clamp(0.0, 1.0) as f64;
    (BAR_INSET, height - bar_h, (width - 2.0 * BAR_INSET).max(0.0), bar_h)
}

/// Map centered samples in [-1, 1] across the canvas, zero on the midline.
pub fn trace_points(samples: &[f32], width: f64, height: f64) -> Vec<(f64, f64)> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mid_y = height / 2.0;
    let slice = width / samples.len() as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 * slice, mid_y - s.clamp(-1.0, 1.0) as f64 * mid_y))
        .collect()
}

pub fn draw_volume_bar(ctx: &CanvasRenderingContext2d, volume: f32, width: f64, height: f64) {
    ctx.clear_rect(0.0, 0.0, width, height);
    let (x, y, w, h) = bar_rect(volume, width, height);
    if h <= 0.0 {
        return;
    }
    let gradient = ctx.create_linear_gradient(0.0, height, 0.0, 0.0);
    let _ = gradient.add_color_stop(0.0, "#4A90E2");
    let _ = gradient.add_color_stop(1.0, "#9CC4F0");
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(x, y, w, h);
}

/// Every frame in the trail, oldest first, faded by age.
pub fn draw_trail(
    ctx: &CanvasRenderingContext2d,
    trail: &WaveformTrail,
    now_ms: f64,
    width: f64,
    height: f64,
) {
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_line_width(2.0);
    for (opacity, samples) in trail.iter_faded(now_ms) {
        let points = trace_points(samples, width, height);
        let Some(&(x0, y0)) = points.first() else { continue };
        ctx.set_stroke_style_str(&accent(opacity));
        ctx.begin_path();
        ctx.move_to(x0, y0);
        for &(x, y) in &points[1..] {
            ctx.line_to(x, y);
        }
        ctx.stroke();
    }
}

pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
    ctx.clear_rect(0.0, 0.0, width, height);
}
