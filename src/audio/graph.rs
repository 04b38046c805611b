//! The page's one analysis graph: media element source -> analyser -> speakers.
//!
//! Created lazily on the first start so the `AudioContext` comes out of a user
//! gesture. An element can be wrapped in a `MediaElementAudioSourceNode` only
//! once per lifetime, so connections are recorded by [`ElementId`].

use std::cell::RefCell;
use std::rc::Rc;

use apulati_core::analysis::{Analyser, ConnectionRegistry, ElementId};
use apulati_core::sync::MediaElement;
use apulati_core::{AnalysisConfig, MediaError};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AnalyserNode, AudioContext, AudioContextState};

use super::element::WebMedia;

fn graph_error(what: &str, e: wasm_bindgen::JsValue) -> MediaError {
    MediaError::GraphUnavailable(format!("{what}: {e:?}"))
}

pub struct AnalysisGraph {
    ctx: AudioContext,
    analyser: AnalyserNode,
    connected: RefCell<ConnectionRegistry>,
}

impl AnalysisGraph {
    fn new(config: &AnalysisConfig) -> Result<Self, MediaError> {
        let ctx = AudioContext::new().map_err(|e| graph_error("AudioContext", e))?;
        let analyser = ctx
            .create_analyser()
            .map_err(|e| graph_error("create_analyser", e))?;
        analyser.set_fft_size(config.fft_size);
        analyser.set_smoothing_time_constant(config.smoothing);
        analyser
            .connect_with_audio_node(&ctx.destination())
            .map_err(|e| graph_error("connect analyser", e))?;
        log::info!(
            "Analysis graph created (fft {}, {} Hz)",
            config.fft_size,
            ctx.sample_rate()
        );
        Ok(Self {
            ctx,
            analyser,
            connected: RefCell::new(ConnectionRegistry::default()),
        })
    }

    /// Route `media` through the analyser. A no-op for an element already routed.
    pub fn connect(&self, media: &WebMedia) -> Result<(), MediaError> {
        let id: ElementId = media.id();
        if self.connected.borrow().is_connected(id) {
            return Ok(());
        }
        let source = self
            .ctx
            .create_media_element_source(media.element())
            .map_err(|e| graph_error("create_media_element_source", e))?;
        source
            .connect_with_audio_node(&self.analyser)
            .map_err(|e| graph_error("connect source", e))?;
        self.connected.borrow_mut().mark_connected(id);
        log::info!("Connected media element {id:?} to analyser");
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), MediaError> {
        if self.ctx.state() != AudioContextState::Suspended {
            return Ok(());
        }
        let promise = self.ctx.resume().map_err(|e| graph_error("resume", e))?;
        JsFuture::from(promise)
            .await
            .map_err(|e| graph_error("resume", e))?;
        Ok(())
    }
}

impl Analyser for AnalysisGraph {
    fn bin_count(&self) -> usize {
        self.analyser.frequency_bin_count() as usize
    }

    fn frequency_bytes(&self, out: &mut [u8]) {
        self.analyser.get_byte_frequency_data(out);
    }

    fn time_domain_bytes(&self, out: &mut [u8]) {
        self.analyser.get_byte_time_domain_data(out);
    }
}

/// Lazy owner of the graph, shared between the backend and the meter.
pub struct GraphHandle {
    config: AnalysisConfig,
    graph: RefCell<Option<Rc<AnalysisGraph>>>,
}

impl GraphHandle {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            graph: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The graph if it has been created.
    pub fn get(&self) -> Option<Rc<AnalysisGraph>> {
        self.graph.borrow().clone()
    }

    pub fn get_or_create(&self) -> Result<Rc<AnalysisGraph>, MediaError> {
        if let Some(graph) = self.get() {
            return Ok(graph);
        }
        let graph = Rc::new(AnalysisGraph::new(&self.config)?);
        *self.graph.borrow_mut() = Some(graph.clone());
        Ok(graph)
    }
}
