use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute value supplied by the caller.
///
/// `Bool(false)` and `Null` mean "do not override"; they never clear an
/// attribute coming from the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl AttrValue {
    /// Rendered value, or `None` for values that are filtered out.
    pub fn as_rendered(&self) -> Option<String> {
        match self {
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Int(n) => Some(n.to_string()),
            AttrValue::Float(n) => Some(n.to_string()),
            AttrValue::Bool(true) => Some("true".to_string()),
            AttrValue::Bool(false) | AttrValue::Null => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

/// Caller attribute overrides, keyed by attribute name.
pub type CallerAttrs = BTreeMap<String, AttrValue>;

/// Result of merging source attributes with caller overrides.
///
/// `class` and `style` keep every contributing segment (source first,
/// caller second); all other attributes hold a single resolved value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedAttributes {
    pub(crate) class: Vec<String>,
    pub(crate) style: Vec<String>,
    pub(crate) others: Vec<(String, String)>,
}

impl MergedAttributes {
    pub fn class_segments(&self) -> &[String] {
        &self.class
    }

    pub fn style_segments(&self) -> &[String] {
        &self.style
    }

    /// Space-joined union of all class segments, duplicates removed.
    pub fn class(&self) -> Option<String> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.class.iter().flat_map(|s| s.split_whitespace()) {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        (!tokens.is_empty()).then(|| tokens.join(" "))
    }

    /// Style declarations of all segments; later segments win per property.
    pub fn style(&self) -> Option<String> {
        let mut declarations: Vec<(&str, &str)> = Vec::new();
        for decl in self.style.iter().flat_map(|s| split_declarations(s)) {
            let Some((property, value)) = decl.split_once(':') else {
                continue;
            };
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() {
                continue;
            }
            match declarations
                .iter_mut()
                .find(|(p, _)| p.eq_ignore_ascii_case(property))
            {
                Some(existing) => existing.1 = value,
                None => declarations.push((property, value)),
            }
        }
        (!declarations.is_empty()).then(|| {
            declarations
                .iter()
                .map(|(p, v)| format!("{p}: {v}"))
                .collect::<Vec<_>>()
                .join("; ")
        })
    }

    /// Resolved value of a single attribute.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "class" => self.class(),
            "style" => self.style(),
            _ => self
                .others
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
        }
    }

    /// Final attribute list: `class`, `style`, then everything else.
    pub fn to_attributes(&self) -> Vec<(String, String)> {
        let mut attrs = Vec::with_capacity(self.others.len() + 2);
        if let Some(class) = self.class() {
            attrs.push(("class".to_string(), class));
        }
        if let Some(style) = self.style() {
            attrs.push(("style".to_string(), style));
        }
        attrs.extend(self.others.iter().cloned());
        attrs
    }
}

/// Split a style attribute on top-level `;`, keeping separators that sit
/// inside parentheses or quotes.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in style.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&style[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_rendering() {
        assert_eq!(AttrValue::from("x").as_rendered(), Some("x".to_string()));
        assert_eq!(AttrValue::from(true).as_rendered(), Some("true".to_string()));
        assert_eq!(AttrValue::from(false).as_rendered(), None);
        assert_eq!(AttrValue::from(None::<&str>).as_rendered(), None);
    }

    #[test]
    fn test_attr_value_deserialize() {
        let attrs: CallerAttrs =
            serde_yaml::from_str("width: '200'\nhidden: false\nrole: ~\nfocusable: true").unwrap();
        assert_eq!(attrs["width"], AttrValue::Str("200".to_string()));
        assert_eq!(attrs["hidden"], AttrValue::Bool(false));
        assert_eq!(attrs["role"], AttrValue::Null);
        assert_eq!(attrs["focusable"], AttrValue::Bool(true));

        let attrs: CallerAttrs = serde_yaml::from_str("height: 48").unwrap();
        assert_eq!(attrs["height"].as_rendered(), Some("48".to_string()));

        let attrs: CallerAttrs =
            serde_yaml::from_str("opacity: 0.5\nstroke-width: 1.5").unwrap();
        assert_eq!(attrs["opacity"], AttrValue::Float(0.5));
        assert_eq!(attrs["opacity"].as_rendered(), Some("0.5".to_string()));
        assert_eq!(attrs["stroke-width"].as_rendered(), Some("1.5".to_string()));
    }

    #[test]
    fn test_class_union_dedupes_tokens() {
        let merged = MergedAttributes {
            class: vec!["icon large".to_string(), "large custom".to_string()],
            ..Default::default()
        };
        assert_eq!(merged.class(), Some("icon large custom".to_string()));
    }

    #[test]
    fn test_style_later_segment_wins() {
        let merged = MergedAttributes {
            style: vec![
                "fill: red; stroke: blue".to_string(),
                "FILL:green;opacity:0.5;".to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(
            merged.style(),
            Some("fill: green; stroke: blue; opacity: 0.5".to_string())
        );
    }

    #[test]
    fn test_style_keeps_semicolons_in_values() {
        let merged = MergedAttributes {
            style: vec![
                "background: url(data:image/png;base64,AAAA); fill: red".to_string(),
                r#"font-family: "a;b", 'c;d'"#.to_string(),
            ],
            ..Default::default()
        };
        assert_eq!(
            merged.style(),
            Some(
                r#"background: url(data:image/png;base64,AAAA); fill: red; font-family: "a;b", 'c;d'"#
                    .to_string()
            )
        );
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let merged = MergedAttributes {
            others: vec![("width".to_string(), "10".to_string())],
            ..Default::default()
        };
        assert_eq!(merged.class(), None);
        assert_eq!(
            merged.to_attributes(),
            vec![("width".to_string(), "10".to_string())]
        );
    }
}
