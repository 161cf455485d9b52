//! HTTP transport for artwork downloads and cache priming.
//!
//! The fetch engine talks to remote providers only through the
//! [`ArtworkTransport`] trait so runs can be driven against a mock.

mod error;
mod http;
mod traits;

pub use error::TransportError;
pub use http::ReqwestTransport;
pub use traits::{ArtworkTransport, FetchResponse, GetOptions};
