//! Id uniquification for inlined SVG copies.
//!
//! Several copies of one document in a page would otherwise share element
//! ids, making `<use href="#x">` and `fill="url(#x)"` resolve to whichever
//! copy comes first.

use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::SvgElement;

const SUFFIX_LEN: usize = 8;

const LINK_ATTRIBUTES: [&str; 2] = ["href", "xlink:href"];

/// Random lowercase alphanumeric suffix.
pub fn generate_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

fn url_reference_regex() -> &'static Regex {
    static URL_REF: OnceLock<Regex> = OnceLock::new();
    URL_REF.get_or_init(|| {
        Regex::new(r##"url\(\s*(['"]?)([^'"#)]*)#([^'")\s]+)(['"]?)\s*\)"##)
            .expect("url() reference pattern is valid")
    })
}

/// Rename every `id` to `{id}_{suffix}` and point references at the new ids.
///
/// References are `href`/`xlink:href` values of the form `#id` or
/// `{base}#id`, and `url(#id)` / `url({base}#id)` inside any attribute.
/// Rewritten references carry `base` when one is given. References to ids
/// not defined in the tree are left alone.
pub fn make_ids_unique(svg: &mut SvgElement, suffix: &str, base: Option<&str>) {
    let mut renamed: HashMap<String, String> = HashMap::new();
    svg.visit(&mut |element: &SvgElement| {
        if let Some(id) = element.attribute("id") {
            renamed.insert(id.to_string(), format!("{id}_{suffix}"));
        }
    });

    if renamed.is_empty() {
        return;
    }

    let base = base.unwrap_or("");
    let mut rewritten = 0usize;

    svg.visit_mut(&mut |element: &mut SvgElement| {
        for (name, value) in element.attributes_mut().iter_mut() {
            if name.as_str() == "id" {
                if let Some(new_id) = renamed.get(value.as_str()) {
                    *value = new_id.clone();
                }
                continue;
            }

            if LINK_ATTRIBUTES.contains(&name.as_str()) {
                let target = link_target(value.as_str(), base).and_then(|id| renamed.get(id));
                if let Some(target) = target {
                    *value = format!("{base}#{target}");
                    rewritten += 1;
                }
                continue;
            }

            if value.contains("url(") {
                if let Some(updated) = rewrite_url_references(value.as_str(), base, &renamed) {
                    *value = updated;
                    rewritten += 1;
                }
            }
        }
    });

    tracing::debug!(
        ids = renamed.len(),
        references = rewritten,
        suffix = %suffix,
        "Made SVG ids unique"
    );
}

/// Id referenced by a same-document link, if any.
fn link_target<'a>(value: &'a str, base: &str) -> Option<&'a str> {
    if let Some(id) = value.strip_prefix('#') {
        return Some(id);
    }
    if base.is_empty() {
        return None;
    }
    value.strip_prefix(base)?.strip_prefix('#')
}

fn rewrite_url_references(
    value: &str,
    base: &str,
    renamed: &HashMap<String, String>,
) -> Option<String> {
    let mut changed = false;
    let updated = url_reference_regex().replace_all(value, |caps: &Captures| {
        let prefix = &caps[2];
        let same_document = prefix.is_empty() || (!base.is_empty() && prefix == base);
        match renamed.get(&caps[3]) {
            Some(new_id) if same_document => {
                changed = true;
                format!("url({quote}{base}#{new_id}{quote})", quote = &caps[1])
            }
            _ => caps[0].to_string(),
        }
    });
    changed.then(|| updated.into_owned())
}
