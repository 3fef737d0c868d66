//! HTTP transport layer for the OpenPlantbook API.

mod http_transport;

pub use http_transport::{HttpResponse, HttpTransport, ReqwestTransport};
