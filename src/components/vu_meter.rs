use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use apulati_core::analysis::{read_frame, should_render, WaveformTrail};
use apulati_core::sync::MediaElement;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::canvas::meter_renderer::{self, METER_HEIGHT, METER_WIDTH, TRACE_HEIGHT, TRACE_WIDTH};
use crate::components::app::now_ms;
use crate::player::Player;

fn context_2d(canvas: &HtmlCanvasElement, width: u32, height: u32) -> Option<CanvasRenderingContext2d> {
    if canvas.width() != width || canvas.height() != height {
        canvas.set_width(width);
        canvas.set_height(height);
    }
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

#[component]
pub fn VuMeter() -> impl IntoView {
    let player = expect_context::<Player>();
    let meter_ref = NodeRef::<leptos::html::Canvas>::new();
    let trace_ref = NodeRef::<leptos::html::Canvas>::new();

    let analysis = player.graph.with_value(|g| g.config().clone());
    let trail = Rc::new(RefCell::new(WaveformTrail::new(analysis.trail_ms)));

    let tick = move || {
        let (Some(meter), Some(trace)) = (meter_ref.get_untracked(), trace_ref.get_untracked()) else {
            return;
        };
        let (Some(meter_ctx), Some(trace_ctx)) = (
            context_2d(&meter, METER_WIDTH, METER_HEIGHT),
            context_2d(&trace, TRACE_WIDTH, TRACE_HEIGHT),
        ) else {
            return;
        };
        let (mw, mh) = (METER_WIDTH as f64, METER_HEIGHT as f64);
        let (tw, th) = (TRACE_WIDTH as f64, TRACE_HEIGHT as f64);

        let Some(graph) = player.graph.with_value(|g| g.get()) else {
            meter_renderer::clear(&meter_ctx, mw, mh);
            meter_renderer::clear(&trace_ctx, tw, th);
            return;
        };
        let frame = read_frame(&*graph, analysis.volume_scale);
        let paused = player.controller().audio().is_paused();
        let mut trail = trail.borrow_mut();
        if should_render(paused, frame.volume, analysis.noise_floor) {
            let now = now_ms();
            meter_renderer::draw_volume_bar(&meter_ctx, frame.volume, mw, mh);
            trail.push(now, frame.waveform);
            meter_renderer::draw_trail(&trace_ctx, &trail, now, tw, th);
        } else {
            trail.clear();
            meter_renderer::clear(&meter_ctx, mw, mh);
            meter_renderer::clear(&trace_ctx, tw, th);
        }
    };

    let handle = set_interval_with_handle(tick, Duration::from_millis(u64::from(analysis.tick_ms.max(16))))
        .inspect_err(|e| log::error!("Failed to start meter timer: {e:?}"))
        .ok();
    on_cleanup(move || {
        if let Some(handle) = handle {
            handle.clear();
        }
    });

    view! {
        <div class="vu-meter">
            <canvas node_ref=meter_ref class="vu-bar" width=METER_WIDTH height=METER_HEIGHT></canvas>
            <canvas node_ref=trace_ref class="vu-trace" width=TRACE_WIDTH height=TRACE_HEIGHT></canvas>
        </div>
    }
}
