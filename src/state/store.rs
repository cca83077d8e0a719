//! Single source of truth for canonical remote state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root coordinator fills the store on load; the admin editor publishes
//! the server's canonical settings after a successful save. Views and other
//! holders subscribe instead of fetching their own copies, so a mutation in
//! one component is observed everywhere.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::types::{Offer, Property, SiteSettings};

/// Shared, cloneable handle to the canonical slices.
///
/// Each slice is an independent `watch` channel: absent settings are `None`,
/// absent listings are empty.
#[derive(Clone, Debug)]
pub struct SiteStore {
    settings: Arc<watch::Sender<Option<SiteSettings>>>,
    properties: Arc<watch::Sender<Vec<Property>>>,
    offers: Arc<watch::Sender<Vec<Offer>>>,
}

impl Default for SiteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Arc::new(watch::Sender::new(None)),
            properties: Arc::new(watch::Sender::new(Vec::new())),
            offers: Arc::new(watch::Sender::new(Vec::new())),
        }
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    #[must_use]
    pub fn settings(&self) -> Option<SiteSettings> {
        self.settings.borrow().clone()
    }

    pub fn publish_settings(&self, settings: SiteSettings) {
        self.settings.send_replace(Some(settings));
        tracing::debug!(subscribers = self.settings.receiver_count(), "settings published");
    }

    #[must_use]
    pub fn subscribe_settings(&self) -> watch::Receiver<Option<SiteSettings>> {
        self.settings.subscribe()
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    #[must_use]
    pub fn properties(&self) -> Vec<Property> {
        self.properties.borrow().clone()
    }

    /// Look up one listed property by id.
    #[must_use]
    pub fn property(&self, id: &str) -> Option<Property> {
        self.properties.borrow().iter().find(|p| p.id == id).cloned()
    }

    pub fn publish_properties(&self, properties: Vec<Property>) {
        self.properties.send_replace(properties);
    }

    #[must_use]
    pub fn subscribe_properties(&self) -> watch::Receiver<Vec<Property>> {
        self.properties.subscribe()
    }

    // =========================================================================
    // OFFERS
    // =========================================================================

    #[must_use]
    pub fn offers(&self) -> Vec<Offer> {
        self.offers.borrow().clone()
    }

    pub fn publish_offers(&self, offers: Vec<Offer>) {
        self.offers.send_replace(offers);
    }

    #[must_use]
    pub fn subscribe_offers(&self) -> watch::Receiver<Vec<Offer>> {
        self.offers.subscribe()
    }
}
