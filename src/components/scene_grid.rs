use std::rc::Rc;

use apulati_core::analysis::ElementId;
use apulati_core::source::{candidates, BrowserProfile};
use apulati_core::sync::MediaElement;
use apulati_core::SceneKey;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlMediaElement;

use crate::audio::element::WebMedia;
use crate::player::Player;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowPosition {
    Current,
    Next,
    Prev,
}

impl RowPosition {
    fn class(self) -> &'static str {
        match self {
            Self::Current => "work-row current-work",
            Self::Next => "work-row next-work",
            Self::Prev => "work-row prev-work",
        }
    }
}

/// Where `work` sits relative to `current`, or `None` when it is not shown.
pub fn row_position(work: usize, current: usize, count: usize) -> Option<RowPosition> {
    if count == 0 || work >= count {
        return None;
    }
    if work == current {
        Some(RowPosition::Current)
    } else if work == (current + 1) % count {
        Some(RowPosition::Next)
    } else if work == (current + count - 1) % count {
        Some(RowPosition::Prev)
    } else {
        None
    }
}

fn browser_profile() -> BrowserProfile {
    let ua = web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .unwrap_or_default();
    BrowserProfile::from_user_agent(&ua)
}

#[component]
pub fn SceneGrid() -> impl IntoView {
    let state = expect_context::<AppState>();
    let player = expect_context::<Player>();
    let work_count = player.controller().catalog().work_count();
    let profile = browser_profile();
    log::debug!("Video source order for {profile:?}");

    let hovered: RwSignal<Option<SceneKey>> = RwSignal::new(None);

    let rows = move || {
        let current = state.work_index.get();
        (0..work_count)
            .filter_map(|w| row_position(w, current, work_count).map(|pos| (w, pos)))
            .collect::<Vec<_>>()
    };

    view! {
        <div class="scene-grid">
            <div class="works-container">
                <For
                    each=rows
                    key=|row| *row
                    children=move |(work, pos)| view! {
                        <WorkRow work=work position=pos profile=profile hovered=hovered />
                    }
                />
            </div>
        </div>
    }
}

#[component]
fn WorkRow(
    work: usize,
    position: RowPosition,
    profile: BrowserProfile,
    hovered: RwSignal<Option<SceneKey>>,
) -> impl IntoView {
    let player = expect_context::<Player>();
    let scenes = player.controller().catalog().scene_count(work);

    view! {
        <div class=position.class()>
            <div class="scenes-container">
                {(0..scenes)
                    .map(|scene| view! {
                        <SceneTile scene_key=SceneKey::new(work, scene) profile=profile hovered=hovered />
                    })
                    .collect_view()}
            </div>
        </div>
    }
}

#[component]
fn SceneTile(
    scene_key: SceneKey,
    profile: BrowserProfile,
    hovered: RwSignal<Option<SceneKey>>,
) -> impl IntoView {
    let state = expect_context::<AppState>();
    let player = expect_context::<Player>();
    let video_ref = NodeRef::<leptos::html::Video>::new();

    let sources = player
        .controller()
        .catalog()
        .scene(scene_key)
        .map(|scene| candidates(scene, profile))
        .unwrap_or_default();

    let registered: StoredValue<Option<ElementId>> = StoredValue::new(None);
    Effect::new(move || {
        let Some(video) = video_ref.get() else { return };
        video.set_muted(true);
        let media = WebMedia::new(video.unchecked_into::<HtmlMediaElement>());
        registered.set_value(Some(media.id()));
        player.controller().register_video(scene_key, Rc::new(media));
    });

    on_cleanup(move || {
        let (Some(controller), Some(Some(id))) = (player.controller.try_get_value(), registered.try_get_value()) else {
            return;
        };
        controller.unregister_video(scene_key, id);
    });

    // Some mobile browsers show a blank frame until the first seek.
    let priming = StoredValue::new(false);
    let primed = StoredValue::new(false);
    let on_loaded_metadata = move |_| {
        if primed.get_value() {
            return;
        }
        if let Some(video) = video_ref.get_untracked() {
            primed.set_value(true);
            priming.set_value(true);
            video.set_current_time(0.001);
        }
    };
    let on_seeked = move |_| {
        if priming.get_value() {
            priming.set_value(false);
            if let Some(video) = video_ref.get_untracked() {
                video.set_current_time(0.0);
            }
        }
    };

    let is_active = move || state.is_active(scene_key.work, scene_key.scene);
    let is_hovered = move || hovered.get() == Some(scene_key);
    let show_pause = move || is_active() && state.is_playing.get();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        ev.prevent_default();
        let controller = player.controller();
        let intent = player
            .navigator
            .with_value(|nav| nav.on_tile_click(scene_key, &controller.selection()));
        player.dispatch(intent);
    };

    view! {
        <div
            class="scene-item"
            class:active=is_active
            class:hovered=is_hovered
            class:selecting=move || is_active() && state.is_selecting.get()
            on:click=on_click
            on:mouseenter=move |_| hovered.set(Some(scene_key))
            on:mouseleave=move |_| hovered.set(None)
        >
            <video
                node_ref=video_ref
                class="scene-video"
                class:blurred=move || !is_active() && !is_hovered()
                prop:muted=true
                loop=true
                playsinline=true
                preload="metadata"
                on:loadedmetadata=on_loaded_metadata
                on:seeked=on_seeked
            >
                {sources
                    .into_iter()
                    .map(|c| view! { <source src=c.url type=c.mime /> })
                    .collect_view()}
            </video>
            <div
                class="play-pause-button"
                role="button"
                tabindex="-1"
                on:mousedown=|ev: web_sys::MouseEvent| ev.prevent_default()
            >
                <Show
                    when=show_pause
                    fallback=|| view! { <div class="play-icon"></div> }
                >
                    <div class="pause-icon">
                        <div class="pause-bar"></div>
                        <div class="pause-bar"></div>
                    </div>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_positions() {
        assert_eq!(row_position(1, 1, 4), Some(RowPosition::Current));
        assert_eq!(row_position(2, 1, 4), Some(RowPosition::Next));
        assert_eq!(row_position(0, 1, 4), Some(RowPosition::Prev));
        assert_eq!(row_position(3, 1, 4), None, "only neighbours are shown");
        assert_eq!(row_position(3, 0, 4), Some(RowPosition::Prev), "previous wraps");
    }

    #[test]
    fn test_small_catalogs_show_every_work() {
        assert_eq!(row_position(1, 0, 2), Some(RowPosition::Next));
        assert_eq!(row_position(0, 1, 2), Some(RowPosition::Next));
        assert_eq!(row_position(0, 0, 1), Some(RowPosition::Current));
        assert_eq!(row_position(1, 0, 1), None);
        assert_eq!(row_position(0, 0, 0), None);
    }
}
