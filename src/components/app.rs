use std::time::Duration;

use apulati_core::{NavKey, Site};
use leptos::prelude::*;

use crate::components::credits_panel::CreditsPanel;
use crate::components::scene_grid::SceneGrid;
use crate::components::vu_meter::VuMeter;
use crate::player::Player;
use crate::state::AppState;

pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

#[component]
pub fn App(site: Site) -> impl IntoView {
    let state = AppState::new();
    provide_context(state);

    match Player::new(state, site) {
        Ok(player) => {
            provide_context(player);
            view! { <Viewer /> }.into_any()
        }
        Err(e) => {
            log::error!("Failed to create the audio element: {e:?}");
            view! {
                <div class="empty-state">"Audio playback is not available in this browser"</div>
            }
            .into_any()
        }
    }
}

#[component]
fn Viewer() -> impl IntoView {
    let state = expect_context::<AppState>();
    let player = expect_context::<Player>();

    player.title.with_value(|title| {
        if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
            doc.set_title(title);
        }
    });

    let keys = window_event_listener(leptos::ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.repeat() {
            return;
        }
        let Some(key) = NavKey::from_key(&ev.key()) else { return };
        ev.prevent_default();
        let controller = player.controller();
        let intent = player
            .navigator
            .with_value(|nav| nav.on_key(key, &controller.selection(), controller.catalog()));
        if let Some(intent) = intent {
            player.dispatch(intent);
        }
    });

    let interval = player.controller.with_value(|c| c.config().reconcile_interval());
    let reconcile = set_interval_with_handle(
        move || {
            if state.scene_index.get_untracked().is_some() {
                player.controller().reconcile();
            }
        },
        interval.max(Duration::from_millis(100)),
    )
    .inspect_err(|e| log::error!("Failed to start reconcile timer: {e:?}"))
    .ok();

    on_cleanup(move || {
        keys.remove();
        if let Some(handle) = reconcile {
            handle.clear();
        }
    });

    let on_wheel = move |ev: web_sys::WheelEvent| {
        let controller = player.controller();
        let sel = controller.selection();
        let intent = player
            .navigator
            .try_update_value(|nav| {
                nav.on_wheel(ev.delta_x(), ev.delta_y(), now_ms(), &sel, controller.catalog())
            })
            .flatten();
        if let Some(intent) = intent {
            ev.prevent_default();
            player.dispatch(intent);
        }
    };

    let interacted = move || state.has_user_interacted.get();

    view! {
        <div class="viewer-container" class:credits-visible=interacted>
            <div class="video-section" class:full-width=move || !interacted() on:wheel=on_wheel>
                <SceneGrid />
            </div>
            <Show when=interacted>
                <CreditsPanel />
                <VuMeter />
            </Show>
        </div>
    }
}
