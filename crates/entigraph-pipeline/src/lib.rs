//! entigraph-pipeline - Stage sequencing and pipeline state
//!
//! The coordinator is the only stateful component: it owns the document,
//! the reduced entity list, and the assembled graph with its rendering
//! artifact. Stage order is fixed (normalize, recognize, reduce, assemble)
//! and commits are all-or-nothing: a failed stage leaves the previously
//! committed state intact.

pub mod cache;

pub use cache::{EngineCache, EngineKey};

use std::sync::Arc;

use entigraph_core::{
    AppConfig, BackendConfig, BackendKind, Document, EngineError, EntityList, LinkingConfig,
    RenderOptions, Result,
};
use entigraph_graph::{render, EntityGraph, RenderArtifact};
use entigraph_tagger::{
    reduce, LexiconBackend, LinkingClient, RecognitionBackend, TokenClassifierBackend,
};
use entigraph_text::Normalizer;

/// Observable pipeline lifecycle.
///
/// `Processed` is reachable through [`PipelineCoordinator::process`]; a
/// full [`PipelineCoordinator::run`] commits straight through to
/// `Graphed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unloaded,
    Loaded,
    Processed,
    Graphed,
}

/// Drives the fixed stage sequence and owns all mutable pipeline state.
///
/// Not designed for concurrent `run` calls against one instance; callers
/// serialize access (the [`EngineCache`] hands out mutex-guarded
/// coordinators for exactly this reason).
pub struct PipelineCoordinator {
    backend: Arc<dyn RecognitionBackend>,
    normalizer: Normalizer,
    render: RenderOptions,
    dev_mode: bool,

    state: PipelineState,
    document: Option<Document>,
    entities: EntityList,
    graph: Option<EntityGraph>,
    artifact: Option<RenderArtifact>,
}

impl std::fmt::Debug for PipelineCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCoordinator")
            .field("normalizer", &self.normalizer)
            .field("render", &self.render)
            .field("dev_mode", &self.dev_mode)
            .field("state", &self.state)
            .field("document", &self.document)
            .field("entities", &self.entities)
            .field("graph", &self.graph)
            .field("artifact", &self.artifact)
            .finish_non_exhaustive()
    }
}

impl PipelineCoordinator {
    /// Create a coordinator around an already-constructed backend
    pub fn new(backend: Arc<dyn RecognitionBackend>) -> Self {
        Self {
            backend,
            normalizer: Normalizer::new(),
            render: RenderOptions::default(),
            dev_mode: false,
            state: PipelineState::Unloaded,
            document: None,
            entities: Vec::new(),
            graph: None,
            artifact: None,
        }
    }

    /// Construct a coordinator from configuration.
    ///
    /// Backend construction happens here; a missing or unloadable model
    /// artifact fails now, not on the first run.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let backend = build_backend(&config.backend, &config.linking)?;
        Ok(Self::new(backend).with_render_options(config.render.clone()))
    }

    /// Override the graph document sizing
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Enable the diagnostic side channel that emits the intermediate
    /// entity list on each run
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Replace the owned document with new text
    pub fn load_document(&mut self, text: impl Into<String>) {
        self.document = Some(Document::new(text));
        self.entities.clear();
        self.graph = None;
        self.artifact = None;
        self.state = PipelineState::Loaded;
    }

    /// Load a document from a file, read whole into memory.
    pub fn load_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let document = Document::from_path(path)?;
        self.document = Some(document);
        self.entities.clear();
        self.graph = None;
        self.artifact = None;
        self.state = PipelineState::Loaded;
        Ok(())
    }

    /// Run normalize, recognize, and reduce, committing the document and
    /// entity list. The graph is left for [`Self::run`].
    pub async fn process(&mut self, text: Option<&str>) -> Result<()> {
        let (document, entities) = self.extract(text).await?;

        self.document = Some(document);
        self.entities = entities;
        self.graph = None;
        self.artifact = None;
        self.state = PipelineState::Processed;
        Ok(())
    }

    /// Run the full pipeline: normalize, recognize, reduce, assemble.
    ///
    /// With `text` the owned document is replaced first; without it the
    /// previously loaded document is reused. Calling with neither is a
    /// hard error. Nothing is committed unless every stage succeeds.
    pub async fn run(&mut self, text: Option<&str>) -> Result<()> {
        let (document, entities) = self.extract(text).await?;

        let normalized = document.normalized().unwrap_or_default();
        let (graph, artifact) = render::build(normalized, &entities, &self.render)?;

        self.document = Some(document);
        self.entities = entities;
        self.graph = Some(graph);
        self.artifact = Some(artifact);
        self.state = PipelineState::Graphed;
        Ok(())
    }

    /// Shared front half of `process`/`run`: everything up to the uniform
    /// entity list, with no mutation of owned state.
    async fn extract(&self, text: Option<&str>) -> Result<(Document, EntityList)> {
        let mut document = match (text, self.document.as_ref()) {
            (Some(text), _) => Document::new(text),
            (None, Some(existing)) => existing.clone(),
            (None, None) => return Err(EngineError::NoDocument),
        };

        let normalized = self.normalizer.normalize(document.raw());
        tracing::debug!(chars = normalized.len(), "normalized document");
        document.set_normalized(normalized.clone());

        let output = self.backend.tag_entities(&normalized).await?;
        let entities = reduce(output)?;
        tracing::debug!(count = entities.len(), backend = self.backend.name(), "reduced entities");

        if self.dev_mode {
            for entity in &entities {
                tracing::debug!(text = %entity.text, label = %entity.label, "extracted entity");
            }
        }

        Ok((document, entities))
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The owned document, if any
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The committed entity list from the last successful run
    pub fn entities(&self) -> &EntityList {
        &self.entities
    }

    /// The committed entity list as a JSON array of two-field objects
    pub fn entities_json(&self) -> Result<String> {
        serde_json::to_string(&self.entities)
            .map_err(|e| EngineError::Other(anyhow::anyhow!("entity serialization: {e}")))
    }

    /// The assembled graph from the last successful run
    pub fn graph(&self) -> Option<&EntityGraph> {
        self.graph.as_ref()
    }

    /// The rendering artifact from the last successful run
    pub fn artifact(&self) -> Option<&RenderArtifact> {
        self.artifact.as_ref()
    }
}

/// Construct the configured backend variant.
///
/// The coordinator holds the result as a trait object and never branches
/// on the variant again.
pub fn build_backend(
    backend: &BackendConfig,
    linking: &LinkingConfig,
) -> Result<Arc<dyn RecognitionBackend>> {
    match backend.kind {
        BackendKind::Lexicon => {
            let mut built = match &backend.gazetteer_path {
                Some(path) => LexiconBackend::from_gazetteer_file(path)?,
                None => LexiconBackend::new(),
            };
            if linking.enabled {
                built = built.with_linker(LinkingClient::new(linking)?);
            }
            Ok(Arc::new(built))
        }
        BackendKind::Token => {
            let built = match &backend.model_path {
                Some(path) => TokenClassifierBackend::from_model_file(path)?,
                None => TokenClassifierBackend::new()?,
            };
            Ok(Arc::new(built))
        }
    }
}
