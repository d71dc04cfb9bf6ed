//! inline-svg - fetch, cache and inline SVG documents
//!
//! Loads SVG files by URL through a process-wide de-duplicating cache and
//! renders them as inline `<svg>` markup with caller attributes merged in.
//! This library exposes modules for integration testing.

pub mod error;
pub mod models;
pub mod services;
