//! Assertion helpers for tests.

use pretty_assertions::assert_eq;

use inline_svg::services::{EventReceiver, RenderedSvg, SvgEvent};

/// Event names received so far, in order
pub fn drain_events(rx: &mut EventReceiver) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(match event {
            SvgEvent::Loaded(_) => "loaded",
            SvgEvent::Unloaded => "unloaded",
            SvgEvent::Error(_) => "error",
        });
    }
    names
}

/// Assert the received events match `expected` exactly
pub fn assert_events(rx: &mut EventReceiver, expected: &[&str]) {
    let events = drain_events(rx);
    assert_eq!(events, expected, "Unexpected event sequence");
}

/// Assert the rendered content contains a child element `<name`
pub fn assert_renders_child(node: &RenderedSvg, name: &str) {
    let tag = format!("<{name}");
    assert!(
        node.content.contains(&tag),
        "Expected content to contain {tag}, got: {}",
        node.content
    );
}

/// Assert a merged root attribute value
pub fn assert_attr(node: &RenderedSvg, name: &str, expected: Option<&str>) {
    assert_eq!(
        node.attributes.get(name).as_deref(),
        expected,
        "Attribute {name} mismatch"
    );
}
