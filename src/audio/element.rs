//! `HtmlMediaElement` bound to the core's media traits.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use apulati_core::analysis::ElementId;
use apulati_core::sync::{AudioOutput, MediaElement};
use apulati_core::MediaError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlAudioElement, HtmlMediaElement};

thread_local! {
    static NEXT_ID: Cell<u32> = const { Cell::new(1) };
}

fn next_id() -> ElementId {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id.wrapping_add(1));
        ElementId(id)
    })
}

/// One media element plus the source URL we last assigned to it.
#[derive(Clone)]
pub struct WebMedia {
    id: ElementId,
    el: HtmlMediaElement,
    source: Rc<RefCell<Option<String>>>,
}

impl WebMedia {
    pub fn new(el: HtmlMediaElement) -> Self {
        Self {
            id: next_id(),
            el,
            source: Rc::new(RefCell::new(None)),
        }
    }

    /// The page's single audio element. Not attached to the DOM.
    pub fn shared_audio() -> Result<Self, JsValue> {
        let audio = HtmlAudioElement::new()?;
        audio.set_loop(true);
        audio.set_preload("auto");
        Ok(Self::new(audio.unchecked_into()))
    }

    pub fn element(&self) -> &HtmlMediaElement {
        &self.el
    }
}

impl MediaElement for WebMedia {
    fn id(&self) -> ElementId {
        self.id
    }

    fn is_paused(&self) -> bool {
        self.el.paused()
    }

    fn is_ready(&self) -> bool {
        self.el.ready_state() >= HtmlMediaElement::HAVE_CURRENT_DATA
    }

    fn pause(&self) {
        if let Err(e) = self.el.pause() {
            log::error!("pause() failed: {e:?}");
        }
    }

    async fn play(&self) -> Result<(), MediaError> {
        let rejected = |e: JsValue| MediaError::StartRejected {
            reason: format!("{e:?}"),
        };
        let promise = self.el.play().map_err(rejected)?;
        JsFuture::from(promise).await.map_err(rejected)?;
        Ok(())
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<(), MediaError> {
        let timeout_ms = timeout.as_millis() as u64;
        let timed_out = || MediaError::ReadyTimeout { timeout_ms };

        let mut settle: Option<(js_sys::Function, js_sys::Function)> = None;
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            settle = Some((resolve, reject));
        });
        let Some((resolve, reject)) = settle else {
            return Err(timed_out());
        };
        let window = web_sys::window().ok_or_else(timed_out)?;

        let on_ready = Closure::<dyn FnMut()>::new(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let listener: &js_sys::Function = on_ready.as_ref().unchecked_ref();
        self.el
            .add_event_listener_with_callback("canplay", listener)
            .map_err(|_| timed_out())?;
        let timer = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&reject, timeout_ms.min(i32::MAX as u64) as i32)
            .ok();

        // canplay may have fired between the caller's check and the listener.
        let outcome = if self.is_ready() {
            Ok(())
        } else {
            JsFuture::from(promise).await.map(|_| ()).map_err(|_| timed_out())
        };

        if let Some(timer) = timer {
            window.clear_timeout_with_handle(timer);
        }
        let _ = self.el.remove_event_listener_with_callback("canplay", listener);
        outcome
    }
}

impl AudioOutput for WebMedia {
    fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    fn load_source(&self, url: &str) {
        self.el.set_src(url);
        self.el.load();
        *self.source.borrow_mut() = Some(url.to_string());
    }

    fn rewind(&self) {
        self.pause();
        self.el.set_current_time(0.0);
        if self.source.borrow_mut().take().is_some() {
            let _ = self.el.remove_attribute("src");
            self.el.load();
        }
    }
}
