//! Client-side state: the canonical store, the root coordinator, and the
//! components that own their own working state.
//!
//! DESIGN
//! ======
//! Each component keeps a disjoint slice behind its own short-lived lock.
//! Locks are never held across an await, so one component's in-flight
//! request never blocks another component.

pub mod admin;
pub mod error;
pub mod notice;
pub mod offer;
pub mod site;
pub mod store;

#[cfg(test)]
pub mod test_helpers;

pub use admin::{AdminPanel, AdminStep, AdminView};
pub use error::{ActionError, ValidationError};
pub use notice::Notice;
pub use offer::{OfferField, OfferFlow, OfferTarget};
pub use site::{LoadReport, Site};
pub use store::SiteStore;
