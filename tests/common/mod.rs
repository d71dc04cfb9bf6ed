//! Common test infrastructure for inline-svg integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;
pub mod mock_server;
pub mod mock_transport;

pub use assertions::*;
pub use mock_server::MockHttpServer;
pub use mock_transport::MockTransport;
