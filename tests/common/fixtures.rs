//! Test fixtures and constants.

/// Documents served by the mock transport, keyed by path
pub mod svgs {
    pub const TEST: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><circle cx="50" cy="50" r="40"/></svg>"#;

    pub const RECT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 200"><rect x="50" y="50" width="100" height="100"/></svg>"#;

    pub const POLY: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 150 150"><polygon points="75,20 150,130 0,130"/></svg>"#;

    /// Gradient and symbol referenced by id
    pub const IDS: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 10 10"><defs><linearGradient id="grad"/><path id="shape" d="M0 0h10v10z"/></defs><use xlink:href="#shape" fill="url(#grad)"/></svg>"##;

    /// Root carries class and style for merge tests
    pub const STYLED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" class="icon" style="fill: red; stroke: none" width="10"><circle r="4"/></svg>"#;

    /// Well-formed XML without any `<svg>`
    pub const HTML_PAGE: &str = "<html><body><p>not an image</p></body></html>";

    pub const WITH_DOCTYPE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"><rect/></svg>"#;
}

/// Paths known to the mock transport
pub mod paths {
    pub const TEST: &str = "test.svg";
    pub const RECT: &str = "rect.svg";
    pub const POLY: &str = "poly.svg";
    pub const IDS: &str = "ids.svg";
    pub const STYLED: &str = "styled.svg";
    pub const PAGE: &str = "page.html";
    pub const MISSING: &str = "missing.svg";
}

/// Body for a path, ignoring any query string
pub fn svg_for(url: &str) -> Option<&'static str> {
    let path = url.split('?').next().unwrap_or(url);
    match path {
        paths::TEST => Some(svgs::TEST),
        paths::RECT => Some(svgs::RECT),
        paths::POLY => Some(svgs::POLY),
        paths::IDS => Some(svgs::IDS),
        paths::STYLED => Some(svgs::STYLED),
        paths::PAGE => Some(svgs::HTML_PAGE),
        _ => None,
    }
}
