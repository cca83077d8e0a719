//! Network layer: wire types, the endpoint trait, and its HTTP client.

pub mod api;
pub mod http;
pub mod types;

pub use api::{ApiError, SiteApi};
pub use http::HttpSiteApi;
