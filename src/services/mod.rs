pub mod fetch_pipeline;
pub mod lifecycle;
pub mod merge;
pub mod pending;
pub mod svg_cache;
pub mod transport;
pub mod unique_ids;

pub use fetch_pipeline::{FetchPipeline, PendingFetch, RequestHandle};
pub use lifecycle::{
    EventReceiver, EventSender, InlineSvg, LoadOutcome, LoadState, PendingLoad, SettledLoad,
    SvgEvent,
};
pub use merge::{merge_attributes, render_content, RenderOptions, RenderedContent, RenderedSvg};
pub use pending::{IntoPendingState, LoadFuture, PendingState};
pub use svg_cache::{CacheEntry, SvgCache};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
pub use unique_ids::{generate_suffix, make_ids_unique};
