//! Attribute merging and content rendering for one inline SVG.

use serde::Serialize;

use super::unique_ids::make_ids_unique;
use crate::error::RenderError;
use crate::models::svg_element::write_tag;
use crate::models::{CallerAttrs, MergedAttributes, SvgElement, SvgNode, TransformFn};

/// Merge the source element's attributes with caller overrides.
///
/// Falsy caller values are ignored. `class` and `style` keep both sides
/// (source first); for every other attribute the caller wins.
pub fn merge_attributes(source: &SvgElement, caller: &CallerAttrs) -> MergedAttributes {
    let mut merged = MergedAttributes::default();

    for (name, value) in source.attributes() {
        match name.as_str() {
            "class" => merged.class.push(value.clone()),
            "style" => merged.style.push(value.clone()),
            _ => merged.others.push((name.clone(), value.clone())),
        }
    }

    for (name, value) in caller {
        let Some(value) = value.as_rendered() else {
            continue;
        };
        match name.as_str() {
            "class" => merged.class.push(value),
            "style" => merged.style.push(value),
            _ => match merged.others.iter_mut().find(|(k, _)| k == name) {
                Some((_, existing)) => *existing = value,
                None => merged.others.push((name.clone(), value)),
            },
        }
    }

    merged
}

/// Per-pass content options
#[derive(Default)]
pub struct RenderOptions<'a> {
    pub transform: Option<&'a TransformFn>,
    pub title: Option<&'a str>,
    /// Suffix appended to every id; `None` disables uniquification
    pub id_suffix: Option<&'a str>,
    pub id_base: Option<&'a str>,
}

/// Transformed copy of a source element
#[derive(Debug, Clone)]
pub struct RenderedContent {
    pub content: String,
    pub attributes: Vec<(String, String)>,
    pub element: SvgElement,
}

/// Clone `source`, then transform, add the title and uniquify ids.
///
/// `source` itself is never modified, so a failing transform cannot
/// corrupt a cached tree.
pub fn render_content(
    source: &SvgElement,
    options: &RenderOptions<'_>,
) -> Result<RenderedContent, RenderError> {
    let mut svg = source.clone();

    if let Some(transform) = options.transform {
        svg = transform(svg)?;
    }

    if let Some(title) = options.title {
        set_title(&mut svg, title);
    }

    if let Some(suffix) = options.id_suffix {
        make_ids_unique(&mut svg, suffix, options.id_base);
    }

    Ok(RenderedContent {
        content: svg.inner_markup(),
        attributes: svg.attributes().to_vec(),
        element: svg,
    })
}

fn set_title(svg: &mut SvgElement, title: &str) {
    match svg.child_element_mut("title") {
        Some(existing) => existing.set_text(title),
        None => svg.prepend_child(
            SvgElement::new("title").with_child(SvgNode::Text(title.to_string())),
        ),
    }
}

/// Output of one render pass: the root `<svg>` attributes and content.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSvg {
    pub attributes: MergedAttributes,
    pub content: String,
    /// The transformed clone the content was taken from
    #[serde(skip)]
    pub element: SvgElement,
}

impl RenderedSvg {
    /// Render content and merge its root attributes with `caller`.
    pub fn render(
        source: &SvgElement,
        caller: &CallerAttrs,
        options: &RenderOptions<'_>,
    ) -> Result<Self, RenderError> {
        let rendered = render_content(source, options)?;
        Ok(Self {
            attributes: merge_attributes(&rendered.element, caller),
            content: rendered.content,
            element: rendered.element,
        })
    }

    /// Complete inline `<svg>` markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_tag("svg", &self.attributes.to_attributes(), &self.content, &mut out);
        out
    }
}
