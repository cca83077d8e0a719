//! Root coordinator: initial load, canonical slices, and which overlay is open.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Site` owns the [`SiteStore`] and hands read-only projections to the
//! catalog view. It creates the admin panel and the offer flow, each of
//! which owns its own disjoint state slice.
//!
//! CONSISTENCY
//! ===========
//! Read once per session. Slices are only re-fetched on explicit request
//! (`refresh_offers`), except settings, which the admin editor publishes to
//! the store after a successful save.

#[cfg(test)]
#[path = "site_test.rs"]
mod site_test;

use std::sync::Arc;

use super::admin::AdminPanel;
use super::error::ActionError;
use super::offer::{OfferFlow, OfferTarget};
use super::store::SiteStore;
use crate::net::SiteApi;
use crate::view::catalog::CatalogView;

/// Which slices the initial load obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub settings: bool,
    pub properties: bool,
    pub offers: bool,
    /// Outcome of the best-effort admin bootstrap; informational only.
    pub admin_seeded: bool,
}

impl LoadReport {
    #[must_use]
    pub fn complete(&self) -> bool {
        self.settings && self.properties && self.offers
    }
}

pub struct Site {
    api: Arc<dyn SiteApi>,
    store: SiteStore,
    admin: AdminPanel,
    offer: OfferFlow,
}

impl Site {
    #[must_use]
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        let store = SiteStore::new();
        Self {
            admin: AdminPanel::new(api.clone(), store.clone()),
            offer: OfferFlow::new(api.clone()),
            api,
            store,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SiteStore {
        &self.store
    }

    #[must_use]
    pub fn admin(&self) -> &AdminPanel {
        &self.admin
    }

    #[must_use]
    pub fn offer(&self) -> &OfferFlow {
        &self.offer
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Issue the three independent fetches and the admin bootstrap together.
    ///
    /// Never fails: a failed fetch leaves its slice absent and the rest of
    /// the page renders from whatever did arrive.
    pub async fn init(&self) -> LoadReport {
        let (settings, properties, offers, admin_seeded) = tokio::join!(
            self.load_settings(),
            self.load_properties(),
            self.load_offers(),
            self.bootstrap_admin(),
        );
        let report = LoadReport { settings, properties, offers, admin_seeded };
        tracing::info!(?report, "initial load finished");
        report
    }

    async fn load_settings(&self) -> bool {
        match self.api.fetch_settings().await {
            Ok(settings) => {
                self.store.publish_settings(settings);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "settings unavailable; using default copy");
                false
            }
        }
    }

    async fn load_properties(&self) -> bool {
        match self.api.fetch_properties().await {
            Ok(properties) => {
                tracing::debug!(count = properties.len(), "properties loaded");
                self.store.publish_properties(properties);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "properties unavailable");
                false
            }
        }
    }

    async fn load_offers(&self) -> bool {
        self.refresh_offers().await.is_ok()
    }

    /// Ask the backend to make sure an admin account exists.
    ///
    /// Idempotent and non-critical: the outcome is logged and returned, never
    /// propagated, and it does not gate the rest of the load.
    pub async fn bootstrap_admin(&self) -> bool {
        match self.api.seed_admin().await {
            Ok(()) => {
                tracing::debug!("admin bootstrap ok");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "admin bootstrap failed; continuing without it");
                false
            }
        }
    }

    /// Re-fetch the public offers list.
    ///
    /// # Errors
    ///
    /// The mapped remote failure; the previous list is kept.
    pub async fn refresh_offers(&self) -> Result<(), ActionError> {
        match self.api.fetch_offers().await {
            Ok(offers) => {
                tracing::debug!(count = offers.len(), "offers loaded");
                self.store.publish_offers(offers);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "offers unavailable");
                Err(ActionError::from_api(e))
            }
        }
    }

    // =========================================================================
    // VIEWS AND OVERLAYS
    // =========================================================================

    /// Current landing page from the canonical slices.
    #[must_use]
    pub fn catalog(&self) -> CatalogView {
        CatalogView::build(self.store.settings().as_ref(), &self.store.properties(), &self.store.offers())
    }

    pub fn open_admin(&self) {
        self.admin.open();
    }

    pub fn close_admin(&self) {
        self.admin.close();
    }

    /// Open the offer flow for a listed property.
    ///
    /// # Errors
    ///
    /// [`ActionError::UnknownProperty`] if the id is not in the catalog.
    pub fn open_offer(&self, property_id: &str) -> Result<OfferTarget, ActionError> {
        let property = self
            .store
            .property(property_id)
            .ok_or_else(|| ActionError::UnknownProperty(property_id.to_owned()))?;
        let target = OfferTarget::from(&property);
        self.offer.open(target.clone());
        Ok(target)
    }

    pub fn close_offer(&self) {
        self.offer.close();
    }
}
