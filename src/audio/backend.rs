//! Browser environment for the sync controller.

use std::rc::Rc;

use apulati_core::sync::MediaBackend;
use apulati_core::PlaybackSelection;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::element::WebMedia;
use super::graph::GraphHandle;
use crate::state::AppState;

pub struct WebBackend {
    state: AppState,
    graph: Rc<GraphHandle>,
    audio: WebMedia,
}

impl WebBackend {
    pub fn new(state: AppState, graph: Rc<GraphHandle>, audio: WebMedia) -> Self {
        Self { state, graph, audio }
    }
}

async fn head_ok(url: &str) -> Result<bool, String> {
    let window = web_sys::window().ok_or("No window")?;
    let opts = RequestInit::new();
    opts.set_method("HEAD");
    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| format!("{e:?}"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("Fetch error: {e:?}"))?;
    let resp: Response = resp_value.dyn_into().map_err(|_| "Not a Response")?;
    Ok(resp.ok())
}

impl MediaBackend for WebBackend {
    type Audio = WebMedia;
    type Video = WebMedia;

    async fn resume_graph(&self) {
        let graph = match self.graph.get_or_create() {
            Ok(graph) => graph,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        if let Err(e) = graph.connect(&self.audio) {
            log::error!("{e}");
        }
        if let Err(e) = graph.resume().await {
            log::error!("{e}");
        }
    }

    async fn asset_exists(&self, url: &str) -> bool {
        match head_ok(url).await {
            Ok(ok) => ok,
            Err(e) => {
                log::warn!("Probe of {url} failed: {e}");
                false
            }
        }
    }

    fn publish(&self, selection: PlaybackSelection) {
        self.state.apply(selection);
    }
}
