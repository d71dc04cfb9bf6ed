//! Per-instance controller binding a source URL to rendered inline SVG.
//!
//! The host drives it explicitly:
//!
//! 1. `mount()` / `set_src()` start (or join) a cached load and return a
//!    [`PendingLoad`];
//! 2. the host awaits [`PendingLoad::settle`] without borrowing the
//!    controller, then passes the result to `complete()`;
//! 3. on every update the host calls `render()` and, once the output is in
//!    place, `rendered()`, which emits `Loaded` after a successful load.
//!
//! A settlement for a key the instance is no longer bound to is discarded.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::fetch_pipeline::RequestHandle;
use super::merge::{RenderOptions, RenderedSvg};
use super::pending::PendingState;
use super::svg_cache::SvgCache;
use super::unique_ids::generate_suffix;
use crate::error::{LoadError, RenderError};
use crate::models::{AttrValue, CallerAttrs, InlineSvgProps, SvgElement, TransformFn, UniqueIds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing bound or nothing loaded yet
    Empty,
    /// Waiting for the bound key's load to settle
    Loading,
    /// Source element held
    Loaded,
    /// Transient while a failure is processed
    Failed,
}

/// Notification emitted to the host
#[derive(Debug, Clone)]
pub enum SvgEvent {
    Loaded(RenderedSvg),
    Unloaded,
    Error(LoadError),
}

pub type EventSender = mpsc::UnboundedSender<SvgEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SvgEvent>;

/// A load the host has to await before calling [`InlineSvg::complete`]
#[derive(Debug)]
pub struct PendingLoad {
    key: String,
    promise: PendingState<Arc<SvgElement>>,
}

impl PendingLoad {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_pending(&self) -> bool {
        self.promise.is_pending()
    }

    pub async fn settle(self) -> SettledLoad {
        let result = self.promise.clone().await;
        SettledLoad {
            key: self.key,
            promise: self.promise,
            result,
        }
    }
}

/// Outcome of a [`PendingLoad`], tagged with the key it was requested for
#[derive(Debug)]
pub struct SettledLoad {
    key: String,
    promise: PendingState<Arc<SvgElement>>,
    result: Result<Arc<SvgElement>, LoadError>,
}

impl SettledLoad {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn result(&self) -> &Result<Arc<SvgElement>, LoadError> {
        &self.result
    }
}

/// What [`InlineSvg::complete`] did with a settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed(LoadError),
    /// The instance was re-bound to another key in the meantime
    Stale,
}

/// One inline SVG instance
pub struct InlineSvg {
    cache: Arc<SvgCache>,
    props: InlineSvgProps,
    events: EventSender,
    id_suffix: String,
    current_key: Option<String>,
    source: Option<Arc<SvgElement>>,
    request: Option<RequestHandle>,
    state: LoadState,
    notify_loaded: bool,
}

impl InlineSvg {
    pub fn new(cache: Arc<SvgCache>, props: InlineSvgProps, events: EventSender) -> Self {
        Self {
            cache,
            props,
            events,
            id_suffix: generate_suffix(),
            current_key: None,
            source: None,
            request: None,
            state: LoadState::Empty,
            notify_loaded: false,
        }
    }

    /// Create an instance together with the receiving end of its events.
    pub fn channel(cache: Arc<SvgCache>, props: InlineSvgProps) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(cache, props, tx), rx)
    }

    pub fn props(&self) -> &InlineSvgProps {
        &self.props
    }

    /// Mutable props for render-time options. Changing `src` here does not
    /// trigger a load; use [`InlineSvg::set_src`].
    pub fn props_mut(&mut self) -> &mut InlineSvgProps {
        &mut self.props
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.props.title = title;
    }

    pub fn set_attrs(&mut self, attrs: CallerAttrs) {
        self.props.attrs = attrs;
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.props.attrs.insert(name.into(), value.into());
    }

    pub fn set_transform(&mut self, transform: Option<TransformFn>) {
        self.props.transform_source = transform;
    }

    /// Applies from the next `set_src` on.
    pub fn set_keep_during_loading(&mut self, keep: bool) {
        self.props.keep_during_loading = keep;
    }

    pub fn set_unique_ids(&mut self, unique_ids: impl Into<UniqueIds>) {
        self.props.unique_ids = unique_ids.into();
    }

    pub fn set_unique_ids_base(&mut self, base: Option<String>) {
        self.props.unique_ids_base = base;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    /// The cached source element currently held
    pub fn source_element(&self) -> Option<&Arc<SvgElement>> {
        self.source.as_ref()
    }

    /// Transport handle of the request behind the bound key
    pub fn request(&self) -> Option<&RequestHandle> {
        self.request.as_ref()
    }

    /// Per-instance suffix used when `unique_ids` is enabled without one
    pub fn id_suffix(&self) -> &str {
        &self.id_suffix
    }

    /// Start loading the `src` given in the props.
    pub fn mount(&mut self) -> Option<PendingLoad> {
        let key = self.props.src.clone();
        self.bind(key)
    }

    /// Re-bind to a new source. `None` when there is nothing to load: an
    /// empty `src`, or the source already loaded for this key.
    pub fn set_src(&mut self, src: impl Into<String>) -> Option<PendingLoad> {
        self.props.src = src.into();
        let key = self.props.src.clone();
        self.bind(key)
    }

    fn bind(&mut self, key: String) -> Option<PendingLoad> {
        if key.is_empty() {
            self.current_key = None;
            self.request = None;
            self.clear_source();
            self.state = LoadState::Empty;
            return None;
        }

        if self.state == LoadState::Loaded && self.current_key.as_deref() == Some(key.as_str()) {
            tracing::debug!(key = %key, "Inline SVG source unchanged");
            return None;
        }

        let entry = self.cache.load(&key);
        self.current_key = Some(key.clone());
        self.request = entry.request.clone();

        if entry.is_pending() && !self.props.keep_during_loading {
            self.clear_source();
        }
        self.state = LoadState::Loading;

        tracing::debug!(
            key = %key,
            pending = entry.is_pending(),
            keep_during_loading = self.props.keep_during_loading,
            "Bound inline SVG source"
        );

        Some(PendingLoad {
            key,
            promise: entry.promise,
        })
    }

    /// Apply a settled load.
    ///
    /// On failure the held source is cleared (`Unloaded`), the cache entry
    /// is evicted so the next request fetches again, and `Error` is emitted,
    /// in that order.
    pub fn complete(&mut self, settled: SettledLoad) -> LoadOutcome {
        let SettledLoad {
            key,
            promise,
            result,
        } = settled;

        if self.current_key.as_deref() != Some(key.as_str()) {
            if result.is_err() {
                self.cache.evict_entry(&key, &promise);
            }
            tracing::debug!(
                key = %key,
                current = ?self.current_key,
                "Discarding stale SVG load"
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(svg) => {
                self.source = Some(svg);
                self.state = LoadState::Loaded;
                self.notify_loaded = true;
                tracing::info!(key = %key, "Inline SVG loaded");
                LoadOutcome::Loaded
            }
            Err(error) => {
                self.state = LoadState::Failed;
                self.request = None;
                self.clear_source();
                self.cache.evict_entry(&key, &promise);
                tracing::warn!(key = %key, error = %error, "Inline SVG failed to load");
                self.emit(SvgEvent::Error(error.clone()));
                self.state = LoadState::Empty;
                LoadOutcome::Failed(error)
            }
        }
    }

    /// Bind to `src`, wait for the load and apply it.
    pub async fn load(&mut self, src: impl Into<String>) -> Option<LoadOutcome> {
        let pending = self.set_src(src)?;
        let settled = pending.settle().await;
        Some(self.complete(settled))
    }

    /// Render the current state. `None` while no source element is held.
    pub fn render(&self) -> Result<Option<RenderedSvg>, RenderError> {
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let id_suffix = match &self.props.unique_ids {
            UniqueIds::Off => None,
            UniqueIds::Auto => Some(self.id_suffix.as_str()),
            UniqueIds::Suffix(suffix) => Some(suffix.as_str()),
        };
        let options = RenderOptions {
            transform: self.props.transform_source.as_ref(),
            title: self.props.title.as_deref(),
            id_suffix,
            id_base: self.props.unique_ids_base.as_deref(),
        };

        RenderedSvg::render(source, &self.props.attrs, &options).map(Some)
    }

    /// Post-render hook: emits `Loaded` with the rendered node once per
    /// successful load.
    pub fn rendered(&mut self, node: &RenderedSvg) {
        if std::mem::take(&mut self.notify_loaded) {
            self.emit(SvgEvent::Loaded(node.clone()));
        }
    }

    /// `render()` followed by `rendered()`, for hosts without a separate
    /// paint step.
    pub fn update(&mut self) -> Result<Option<RenderedSvg>, RenderError> {
        let rendered = self.render()?;
        if let Some(node) = &rendered {
            self.rendered(node);
        }
        Ok(rendered)
    }

    /// Drop local state. Cache entries are left untouched.
    pub fn unmount(self) {
        tracing::debug!(key = ?self.current_key, "Unmounted inline SVG");
    }

    fn clear_source(&mut self) {
        if self.source.take().is_some() {
            self.notify_loaded = false;
            self.emit(SvgEvent::Unloaded);
        }
    }

    fn emit(&self, event: SvgEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Inline SVG event receiver dropped");
        }
    }
}
