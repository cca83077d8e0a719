//! Typed endpoint surface of the estates backend.
//!
//! ERROR HANDLING
//! ==============
//! A request that never got a response (`Transport`) is kept distinct from a
//! response outside 2xx (`Status`) and from a 2xx body that did not decode
//! (`Decode`), so callers can tell "server unreachable" from "login refused".

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::{AdminToken, Credentials, NewOffer, Offer, Property, SiteSettings};

pub const SETTINGS_PATH: &str = "/api/settings";
pub const PROPERTIES_PATH: &str = "/api/properties";
pub const OFFERS_PATH: &str = "/api/offers";
pub const ADMIN_LOGIN_PATH: &str = "/api/admin/login";
pub const ADMIN_SEED_PATH: &str = "/api/admin/seed";

/// Errors produced by remote calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No response was obtained (DNS, connect, timeout, reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered outside the 2xx range.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// A 2xx body could not be decoded into the expected type.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// HTTP status of a non-2xx response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 4xx responses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }
}

/// One method per backend endpoint.
///
/// Implemented over HTTP by [`super::http::HttpSiteApi`]; tests substitute
/// in-memory fakes.
#[async_trait::async_trait]
pub trait SiteApi: Send + Sync {
    /// `GET /api/settings`.
    async fn fetch_settings(&self) -> Result<SiteSettings, ApiError>;

    /// `PATCH /api/settings` with a bearer token; returns the canonical document.
    async fn update_settings(&self, token: &AdminToken, settings: &SiteSettings) -> Result<SiteSettings, ApiError>;

    /// `GET /api/properties`.
    async fn fetch_properties(&self) -> Result<Vec<Property>, ApiError>;

    /// `GET /api/offers`.
    async fn fetch_offers(&self) -> Result<Vec<Offer>, ApiError>;

    /// `POST /api/offers`, unauthenticated.
    async fn create_offer(&self, offer: &NewOffer) -> Result<Offer, ApiError>;

    /// `POST /api/admin/login`; a 2xx without a `token` field is a decode error.
    async fn admin_login(&self, credentials: &Credentials) -> Result<AdminToken, ApiError>;

    /// `POST /api/admin/seed`. Idempotent; the body is ignored.
    async fn seed_admin(&self) -> Result<(), ApiError>;
}
