//! The controller and its companions, shared with components through context.

use std::rc::Rc;

use apulati_core::{Intent, Navigator, Site, SyncController};
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsValue;

use crate::audio::backend::WebBackend;
use crate::audio::element::WebMedia;
use crate::audio::graph::GraphHandle;
use crate::state::AppState;

pub type Controller = SyncController<WebBackend>;

#[derive(Clone, Copy)]
pub struct Player {
    pub controller: StoredValue<Rc<Controller>, LocalStorage>,
    pub graph: StoredValue<Rc<GraphHandle>, LocalStorage>,
    pub navigator: StoredValue<Navigator>,
    pub title: StoredValue<String>,
}

impl Player {
    pub fn new(state: AppState, site: Site) -> Result<Self, JsValue> {
        let audio = WebMedia::shared_audio()?;
        let graph = Rc::new(GraphHandle::new(site.player.analysis.clone()));
        let backend = WebBackend::new(state, graph.clone(), audio.clone());
        let navigator = Navigator::new(&site.player);
        let controller = SyncController::new(backend, Rc::new(site.catalog), site.player, audio);
        state.apply(controller.selection());

        Ok(Self {
            controller: StoredValue::new_local(Rc::new(controller)),
            graph: StoredValue::new_local(graph),
            navigator: StoredValue::new(navigator),
            title: StoredValue::new(site.title),
        })
    }

    pub fn controller(&self) -> Rc<Controller> {
        self.controller.get_value()
    }

    /// Work changes stop media before returning; scene intents run in the
    /// background.
    pub fn dispatch(&self, intent: Intent) {
        let controller = self.controller();
        let Some(intent) = controller.dispatch_now(intent) else {
            return;
        };
        spawn_local(async move {
            controller.dispatch(intent).await;
        });
    }
}
