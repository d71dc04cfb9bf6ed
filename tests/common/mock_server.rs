//! Mock HTTP server for testing the reqwest transport.

use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockHttpServer {
    pub server: MockServer,
}

impl MockHttpServer {
    /// Start a new mock HTTP server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Mock a GET endpoint returning an SVG document
    pub async fn mock_svg(&self, endpoint: &str, svg: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(svg)
                    .insert_header("content-type", "image/svg+xml"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a GET endpoint expected to be hit exactly `times` times
    pub async fn mock_svg_expect(&self, endpoint: &str, svg: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_string(svg))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mock a slow SVG endpoint
    pub async fn mock_svg_delayed(&self, endpoint: &str, svg: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(svg)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a GET endpoint returning a status with a plain body
    pub async fn mock_status(&self, endpoint: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a redirect to another path on this server
    pub async fn mock_redirect(&self, endpoint: &str, target: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", self.url_for(target).as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests received so far
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
