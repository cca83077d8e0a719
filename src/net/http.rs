//! HTTP implementation of [`SiteApi`] over `reqwest`.
//!
//! Thin wrapper: one request per call, no retries, no caching. Timeouts are
//! whatever the transport is configured with. Pure helpers (`endpoint_url`,
//! `classify`, `parse_body`) carry the logic so they can be tested without a
//! socket.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api::{
    ADMIN_LOGIN_PATH, ADMIN_SEED_PATH, ApiError, OFFERS_PATH, PROPERTIES_PATH, SETTINGS_PATH, SiteApi,
};
use super::types::{AdminToken, Credentials, LoginRequest, LoginResponse, NewOffer, Offer, Property, SiteSettings};
use crate::config::ClientConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpSiteApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSiteApi {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the TLS/HTTP stack fails to initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx status, or decode failure.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(endpoint_url(&self.base_url, path));
        let text = self.send("GET", path, request).await?;
        parse_body(&text)
    }

    /// `POST` an optional JSON body, with an optional bearer token.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx status, or decode failure.
    pub async fn post_json<B, T>(&self, path: &str, body: Option<&B>, bearer: Option<&AdminToken>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.post_request(path, body, bearer);
        let text = self.send("POST", path, request).await?;
        parse_body(&text)
    }

    /// `PATCH` a JSON body with a bearer token.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx status, or decode failure.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B, bearer: &AdminToken) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .http
            .patch(endpoint_url(&self.base_url, path))
            .header(AUTHORIZATION, bearer_value(bearer))
            .json(body);
        let text = self.send("PATCH", path, request).await?;
        parse_body(&text)
    }

    fn post_request<B>(&self, path: &str, body: Option<&B>, bearer: Option<&AdminToken>) -> reqwest::RequestBuilder
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.post(endpoint_url(&self.base_url, path));
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, bearer_value(token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    /// Send and return the body text of a 2xx response.
    async fn send(&self, method: &str, path: &str, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request not delivered");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::debug!(%method, %path, status, "response received");
        classify(status, text)
    }
}

#[async_trait::async_trait]
impl SiteApi for HttpSiteApi {
    async fn fetch_settings(&self) -> Result<SiteSettings, ApiError> {
        self.fetch_json(SETTINGS_PATH).await
    }

    async fn update_settings(&self, token: &AdminToken, settings: &SiteSettings) -> Result<SiteSettings, ApiError> {
        self.patch_json(SETTINGS_PATH, settings, token).await
    }

    async fn fetch_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.fetch_json(PROPERTIES_PATH).await
    }

    async fn fetch_offers(&self) -> Result<Vec<Offer>, ApiError> {
        self.fetch_json(OFFERS_PATH).await
    }

    async fn create_offer(&self, offer: &NewOffer) -> Result<Offer, ApiError> {
        self.post_json(OFFERS_PATH, Some(offer), None).await
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<AdminToken, ApiError> {
        let body = LoginRequest { email: &credentials.email, password: credentials.password() };
        let response: LoginResponse = self.post_json(ADMIN_LOGIN_PATH, Some(&body), None).await?;
        token_from(response)
    }

    async fn seed_admin(&self) -> Result<(), ApiError> {
        let request = self.post_request::<()>(ADMIN_SEED_PATH, None, None);
        self.send("POST", ADMIN_SEED_PATH, request).await?;
        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn bearer_value(token: &AdminToken) -> String {
    format!("Bearer {}", token.expose())
}

/// A 2xx login only authenticates when it carries a non-blank token.
fn token_from(response: LoginResponse) -> Result<AdminToken, ApiError> {
    let token = AdminToken::new(response.token);
    if token.is_blank() {
        return Err(ApiError::Decode("login response carried an empty token".into()));
    }
    Ok(token)
}

fn classify(status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::Status { status, body })
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
