//! In-memory [`SiteApi`] fake and fixtures shared by component tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use crate::net::types::{AdminToken, Credentials, NewOffer, Offer, Property, SiteSettings};
use crate::net::{ApiError, SiteApi};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_TOKEN: &str = "token-1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FetchSettings,
    UpdateSettings,
    FetchProperties,
    FetchOffers,
    CreateOffer,
    Login,
    Seed,
}

/// Backend-side data held by [`FakeApi`].
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub settings: SiteSettings,
    pub properties: Vec<Property>,
    pub offers: Vec<Offer>,
    /// Bumped on every accepted PATCH and stamped into the canonical document.
    pub revision: u64,
    /// Token handed out on a successful login instead of [`ADMIN_TOKEN`].
    pub login_token: Option<String>,
}

#[derive(Default)]
pub struct FakeApi {
    pub backend: Mutex<FakeBackend>,
    calls: Mutex<Vec<Endpoint>>,
    failures: Mutex<HashMap<Endpoint, ApiError>>,
    held: Mutex<HashSet<Endpoint>>,
    gate: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeApi {
    /// A backend with one property, no offers and default copy.
    #[must_use]
    pub fn seeded() -> Arc<Self> {
        let api = Self::default();
        {
            let mut backend = lock(&api.backend);
            backend.settings = settings("Nova Estates", "Find your next home");
            backend.properties = vec![loft()];
        }
        Arc::new(api)
    }

    /// Make every later call to `endpoint` fail with `err`.
    pub fn fail(&self, endpoint: Endpoint, err: ApiError) {
        lock(&self.failures).insert(endpoint, err);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        lock(&self.failures).remove(&endpoint);
    }

    /// Park calls to `endpoint` until [`FakeApi::release`].
    pub fn hold(&self, endpoint: Endpoint) {
        lock(&self.held).insert(endpoint);
    }

    pub fn release(&self, endpoint: Endpoint) {
        lock(&self.held).remove(&endpoint);
        self.gate.notify_waiters();
    }

    /// Make successful logins return `token`.
    pub fn issue_token(&self, token: &str) {
        lock(&self.backend).login_token = Some(token.to_owned());
    }

    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        lock(&self.calls).iter().filter(|e| **e == endpoint).count()
    }

    #[must_use]
    pub fn backend_settings(&self) -> SiteSettings {
        lock(&self.backend).settings.clone()
    }

    #[must_use]
    pub fn backend_offers(&self) -> Vec<Offer> {
        lock(&self.backend).offers.clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        lock(&self.calls).push(endpoint);
        loop {
            let released = self.gate.notified();
            let parked = lock(&self.held).contains(&endpoint);
            if !parked {
                break;
            }
            released.await;
        }
        match lock(&self.failures).get(&endpoint) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SiteApi for FakeApi {
    async fn fetch_settings(&self) -> Result<SiteSettings, ApiError> {
        self.enter(Endpoint::FetchSettings).await?;
        Ok(self.backend_settings())
    }

    async fn update_settings(&self, token: &AdminToken, settings: &SiteSettings) -> Result<SiteSettings, ApiError> {
        self.enter(Endpoint::UpdateSettings).await?;
        if token.expose() != ADMIN_TOKEN {
            return Err(ApiError::Status { status: 401, body: "invalid token".into() });
        }
        let mut backend = lock(&self.backend);
        backend.revision += 1;
        let mut canonical = settings.clone();
        canonical.site_name = canonical.site_name.trim().to_owned();
        canonical.extra.insert("revision".into(), backend.revision.into());
        backend.settings = canonical.clone();
        Ok(canonical)
    }

    async fn fetch_properties(&self) -> Result<Vec<Property>, ApiError> {
        self.enter(Endpoint::FetchProperties).await?;
        Ok(lock(&self.backend).properties.clone())
    }

    async fn fetch_offers(&self) -> Result<Vec<Offer>, ApiError> {
        self.enter(Endpoint::FetchOffers).await?;
        Ok(self.backend_offers())
    }

    async fn create_offer(&self, offer: &NewOffer) -> Result<Offer, ApiError> {
        self.enter(Endpoint::CreateOffer).await?;
        let mut backend = lock(&self.backend);
        let created = Offer {
            id: format!("o{}", backend.offers.len() + 1),
            property_id: offer.property_id.clone(),
            buyer_name: offer.buyer_name.clone(),
            buyer_email: offer.buyer_email.clone(),
            amount: offer.amount,
            message: Some(offer.message.clone()),
            status: "pending".into(),
        };
        backend.offers.push(created.clone());
        Ok(created)
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<AdminToken, ApiError> {
        self.enter(Endpoint::Login).await?;
        if credentials.email == ADMIN_EMAIL && credentials.password() == ADMIN_PASSWORD {
            let token = lock(&self.backend).login_token.clone();
            Ok(AdminToken::new(token.unwrap_or_else(|| ADMIN_TOKEN.to_owned())))
        } else {
            Err(ApiError::Status { status: 401, body: "invalid credentials".into() })
        }
    }

    async fn seed_admin(&self) -> Result<(), ApiError> {
        self.enter(Endpoint::Seed).await
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

#[must_use]
pub fn settings(site_name: &str, headline: &str) -> SiteSettings {
    SiteSettings {
        site_name: site_name.into(),
        hero_headline: headline.into(),
        hero_subtitle: "Browse curated properties across the city.".into(),
        ..SiteSettings::default()
    }
}

#[must_use]
pub fn loft() -> Property {
    Property {
        id: "p1".into(),
        title: "Loft".into(),
        description: "Open-plan loft downtown".into(),
        price: 250_000.0,
        city: "Metropolis".into(),
        state: "NY".into(),
        images: Vec::new(),
    }
}

#[must_use]
pub fn offer(id: &str, property_id: &str, amount: f64) -> Offer {
    Offer {
        id: id.into(),
        property_id: property_id.into(),
        buyer_name: "Lois Lane".into(),
        buyer_email: "lois@example.com".into(),
        amount,
        message: None,
        status: "pending".into(),
    }
}

/// Yield until `ready` holds; used to observe an in-flight action from a
/// concurrently polled branch.
pub async fn wait_until(mut ready: impl FnMut() -> bool) {
    while !ready() {
        tokio::task::yield_now().await;
    }
}
