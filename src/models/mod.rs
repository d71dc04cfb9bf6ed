pub mod attributes;
pub mod config;
pub mod props;
pub mod svg_element;

pub use attributes::{AttrValue, CallerAttrs, MergedAttributes};
pub use config::{AppConfig, DefaultsConfig, TransportConfig};
pub use props::{InlineSvgProps, TransformFn, UniqueIds};
pub use svg_element::{parse_svg, SvgElement, SvgNode};
