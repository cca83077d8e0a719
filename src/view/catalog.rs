//! Public landing page view model: hero, property cards, recent offers.
//!
//! Pure projection of the canonical store; nothing here mutates state.
//! Every slice may be absent, and each absent slice has its own displayable
//! fallback instead of blocking the page.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::fmt;

use crate::net::types::{Offer, Property, SiteSettings};
use crate::state::offer::OfferTarget;
use crate::util::money::format_usd;

pub const DEFAULT_SITE_NAME: &str = "Nova Estates";
pub const DEFAULT_HEADLINE: &str = "Find your next home";
pub const DEFAULT_SUBTITLE: &str = "Browse curated properties across the city.";
pub const NO_OFFERS_TEXT: &str = "No offers yet.";
pub const NO_PROPERTIES_TEXT: &str = "No properties listed yet.";
pub const NO_IMAGE_TEXT: &str = "No Image";
/// Offers shown in the "Recent Offers" section.
pub const RECENT_OFFER_LIMIT: usize = 6;
const PROPERTY_ID_PREVIEW_CHARS: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogView {
    pub site_name: String,
    pub headline: String,
    pub subtitle: String,
    pub cards: Vec<PropertyCard>,
    pub offers: OffersSection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyCard {
    pub property_id: String,
    pub title: String,
    pub description: String,
    /// Formatted price, e.g. `$250,000`.
    pub price_label: String,
    /// `City, State`.
    pub location: String,
    /// First image URL; `None` renders the "No Image" placeholder.
    pub image: Option<String>,
}

impl PropertyCard {
    fn from_property(property: &Property) -> Self {
        Self {
            property_id: property.id.clone(),
            title: property.title.clone(),
            description: property.description.clone(),
            price_label: format_usd(property.price),
            location: format!("{}, {}", property.city, property.state),
            image: property.images.first().cloned(),
        }
    }

    /// The card's offer action: open the offer flow bound to this property.
    #[must_use]
    pub fn offer_target(&self) -> OfferTarget {
        OfferTarget { property_id: self.property_id.clone(), title: self.title.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OffersSection {
    /// Zero offers fetched (or the fetch failed).
    Empty,
    Recent(Vec<OfferCard>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfferCard {
    pub buyer_name: String,
    pub amount_label: String,
    pub status_label: String,
    /// Shortened property reference, e.g. `p1...`.
    pub property_label: String,
    pub message: Option<String>,
}

impl OfferCard {
    fn from_offer(offer: &Offer) -> Self {
        let preview: String = offer.property_id.chars().take(PROPERTY_ID_PREVIEW_CHARS).collect();
        Self {
            buyer_name: offer.buyer_name.clone(),
            amount_label: format_usd(offer.amount),
            status_label: format!("Status: {}", offer.status),
            property_label: format!("Property: {preview}..."),
            message: offer.message.clone().filter(|m| !m.is_empty()),
        }
    }
}

impl CatalogView {
    /// Project whatever slices are present into the landing page.
    #[must_use]
    pub fn build(settings: Option<&SiteSettings>, properties: &[Property], offers: &[Offer]) -> Self {
        let offers = if offers.is_empty() {
            OffersSection::Empty
        } else {
            OffersSection::Recent(offers.iter().take(RECENT_OFFER_LIMIT).map(OfferCard::from_offer).collect())
        };

        Self {
            site_name: text_or(settings.map(|s| s.site_name.as_str()), DEFAULT_SITE_NAME),
            headline: text_or(settings.map(|s| s.hero_headline.as_str()), DEFAULT_HEADLINE),
            subtitle: text_or(settings.map(|s| s.hero_subtitle.as_str()), DEFAULT_SUBTITLE),
            cards: properties.iter().map(PropertyCard::from_property).collect(),
            offers,
        }
    }

    #[must_use]
    pub fn card(&self, property_id: &str) -> Option<&PropertyCard> {
        self.cards.iter().find(|c| c.property_id == property_id)
    }
}

/// Blank or absent copy falls back to the default text.
fn text_or(value: Option<&str>, fallback: &str) -> String {
    value.filter(|s| !s.trim().is_empty()).unwrap_or(fallback).to_owned()
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.site_name)?;
        writeln!(f, "{}", self.headline)?;
        writeln!(f, "{}", self.subtitle)?;
        writeln!(f)?;

        writeln!(f, "Featured Properties")?;
        if self.cards.is_empty() {
            writeln!(f, "  {NO_PROPERTIES_TEXT}")?;
        }
        for card in &self.cards {
            writeln!(f, "  [{}] {}  {}", card.property_id, card.title, card.price_label)?;
            writeln!(f, "      {}", card.location)?;
            if !card.description.is_empty() {
                writeln!(f, "      {}", card.description)?;
            }
            writeln!(f, "      {}", card.image.as_deref().unwrap_or(NO_IMAGE_TEXT))?;
        }
        writeln!(f)?;

        writeln!(f, "Recent Offers")?;
        match &self.offers {
            OffersSection::Empty => writeln!(f, "  {NO_OFFERS_TEXT}")?,
            OffersSection::Recent(cards) => {
                for card in cards {
                    writeln!(f, "  {}  {}", card.buyer_name, card.amount_label)?;
                    writeln!(f, "      {} | {}", card.status_label, card.property_label)?;
                    if let Some(message) = &card.message {
                        writeln!(f, "      {message}")?;
                    }
                }
            }
        }
        writeln!(f)?;
        write!(f, "(c) {}", self.site_name)
    }
}
