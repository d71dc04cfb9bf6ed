use futures_util::future::{abortable, AbortHandle, Aborted, FutureExt};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::pending::LoadFuture;
use super::transport::{Transport, TransportResponse};
use crate::error::{LoadError, TransportError};
use crate::models::{parse_svg, SvgElement};

/// Handle on an in-flight transport call, separate from its result.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: u64,
    url: String,
    abort: AbortHandle,
}

impl RequestHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Abort the request. The pending load settles with
    /// [`TransportError::Aborted`] unless it already finished.
    pub fn abort(&self) {
        tracing::debug!(id = self.id, url = %self.url, "Aborting request");
        self.abort.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_aborted()
    }
}

/// A started fetch: the result future and the request handle.
pub struct PendingFetch {
    pub future: LoadFuture<Arc<SvgElement>>,
    pub handle: RequestHandle,
}

/// Fetch → status check → XML parse → `<svg>` extraction.
#[derive(Clone)]
pub struct FetchPipeline {
    transport: Arc<dyn Transport>,
}

impl FetchPipeline {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build the fetch for `url`. The request is issued when the returned
    /// future is first polled.
    pub fn fetch(&self, url: &str) -> PendingFetch {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let transport = self.transport.clone();
        let request_url = url.to_string();
        let (request, abort) = abortable(async move { transport.get(&request_url).await });

        let handle = RequestHandle {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            url: url.to_string(),
            abort,
        };

        PendingFetch {
            future: fetch_and_parse(url.to_string(), request).boxed(),
            handle,
        }
    }
}

async fn fetch_and_parse(
    url: String,
    request: impl Future<Output = Result<Result<TransportResponse, TransportError>, Aborted>>,
) -> Result<Arc<SvgElement>, LoadError> {
    let response = match request.await {
        Ok(result) => result?,
        Err(Aborted) => return Err(TransportError::Aborted { url }.into()),
    };

    if !(200..400).contains(&response.status) {
        tracing::warn!(url = %url, status = response.status, "SVG request failed");
        return Err(TransportError::Status {
            url,
            status: response.status,
        }
        .into());
    }

    let svg = parse_svg(&response.body).map_err(|e| {
        tracing::warn!(url = %url, error = %e, "Failed to parse SVG");
        e
    })?;

    tracing::debug!(
        url = %url,
        attributes = svg.attributes().len(),
        children = svg.children().len(),
        "SVG parsed"
    );

    Ok(Arc::new(svg))
}
