use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::attributes::CallerAttrs;
use super::svg_element::SvgElement;
use crate::error::{ConfigError, TransformError};

/// Hook applied to each consumer's private clone of the source tree.
pub type TransformFn =
    Arc<dyn Fn(SvgElement) -> Result<SvgElement, TransformError> + Send + Sync>;

/// Id uniquification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "UniqueIdsRepr")]
pub enum UniqueIds {
    #[default]
    Off,
    /// Use a random per-instance suffix
    Auto,
    /// Use the given suffix verbatim
    Suffix(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UniqueIdsRepr {
    Flag(bool),
    Suffix(String),
}

impl From<UniqueIdsRepr> for UniqueIds {
    fn from(repr: UniqueIdsRepr) -> Self {
        match repr {
            UniqueIdsRepr::Flag(true) => UniqueIds::Auto,
            UniqueIdsRepr::Flag(false) => UniqueIds::Off,
            UniqueIdsRepr::Suffix(s) => UniqueIds::Suffix(s),
        }
    }
}

impl From<bool> for UniqueIds {
    fn from(enabled: bool) -> Self {
        UniqueIdsRepr::Flag(enabled).into()
    }
}

impl From<&str> for UniqueIds {
    fn from(suffix: &str) -> Self {
        UniqueIds::Suffix(suffix.to_string())
    }
}

/// Options of one inline SVG instance.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct InlineSvgProps {
    /// Resource key; also the URL fetched
    pub src: String,
    /// Text of the injected `<title>` child
    pub title: Option<String>,
    #[serde(skip)]
    pub transform_source: Option<TransformFn>,
    /// Keep the previous tree rendered while a new source loads
    pub keep_during_loading: bool,
    pub unique_ids: UniqueIds,
    /// Base URL prefixed to rewritten id references
    pub unique_ids_base: Option<String>,
    /// Attributes merged onto the root `<svg>`
    pub attrs: CallerAttrs,
}

impl Default for InlineSvgProps {
    fn default() -> Self {
        Self {
            src: String::new(),
            title: None,
            transform_source: None,
            keep_during_loading: true,
            unique_ids: UniqueIds::Off,
            unique_ids_base: None,
            attrs: CallerAttrs::new(),
        }
    }
}

impl fmt::Debug for InlineSvgProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineSvgProps")
            .field("src", &self.src)
            .field("title", &self.title)
            .field("transform_source", &self.transform_source.is_some())
            .field("keep_during_loading", &self.keep_during_loading)
            .field("unique_ids", &self.unique_ids)
            .field("unique_ids_base", &self.unique_ids_base)
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl InlineSvgProps {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<super::AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(SvgElement) -> Result<SvgElement, TransformError> + Send + Sync + 'static,
    {
        self.transform_source = Some(Arc::new(transform));
        self
    }

    pub fn keep_during_loading(mut self, keep: bool) -> Self {
        self.keep_during_loading = keep;
        self
    }

    pub fn with_unique_ids(mut self, unique_ids: impl Into<UniqueIds>) -> Self {
        self.unique_ids = unique_ids.into();
        self
    }

    pub fn with_unique_ids_base(mut self, base: impl Into<String>) -> Self {
        self.unique_ids_base = Some(base.into());
        self
    }

    /// Load props from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
