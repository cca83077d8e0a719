//! Offer submission flow.
//!
//! SYSTEM CONTEXT
//! ==============
//! Opened from a property card with that property injected as the target.
//! Every opening starts from an empty form. Submission is unauthenticated.
//! A created offer is not merged into the public offers list; it shows up
//! after the next independent refresh.

#[cfg(test)]
#[path = "offer_test.rs"]
mod offer_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::{ActionError, ValidationError};
use super::notice::Notice;
use crate::net::SiteApi;
use crate::net::types::{NewOffer, Offer, Property};

/// The property an offer is being made on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfferTarget {
    pub property_id: String,
    pub title: String,
}

impl From<&Property> for OfferTarget {
    fn from(property: &Property) -> Self {
        Self { property_id: property.id.clone(), title: property.title.clone() }
    }
}

/// Raw buyer input, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfferForm {
    pub buyer_name: String,
    pub buyer_email: String,
    pub amount: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferField {
    BuyerName,
    BuyerEmail,
    Amount,
    Message,
}

impl OfferForm {
    pub fn set(&mut self, field: OfferField, value: String) {
        match field {
            OfferField::BuyerName => self.buyer_name = value,
            OfferField::BuyerEmail => self.buyer_email = value,
            OfferField::Amount => self.amount = value,
            OfferField::Message => self.message = value,
        }
    }

    /// Validate the form into a request body for `target`.
    ///
    /// # Errors
    ///
    /// Blank name or email, or an amount that is not a finite, non-negative number.
    pub fn validate(&self, target: &OfferTarget) -> Result<NewOffer, ValidationError> {
        let buyer_name = self.buyer_name.trim();
        if buyer_name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let buyer_email = self.buyer_email.trim();
        if buyer_email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        let amount = parse_amount(&self.amount)?;
        Ok(NewOffer {
            property_id: target.property_id.clone(),
            buyer_name: buyer_name.to_owned(),
            buyer_email: buyer_email.to_owned(),
            amount,
            message: self.message.trim().to_owned(),
        })
    }
}

/// Parse a typed amount. `"150000"` and `"150000.50"` are accepted;
/// blank, non-numeric, `inf`/`NaN` and negative input are not.
///
/// # Errors
///
/// The matching [`ValidationError`].
pub fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    let amount = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_owned()))?;
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount(trimmed.to_owned()));
    }
    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }
    Ok(amount)
}

/// Read-only snapshot of the modal for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct OfferView {
    pub open: bool,
    pub target: Option<OfferTarget>,
    pub form: OfferForm,
    pub submit_pending: bool,
    pub notice: Option<Notice>,
}

impl OfferView {
    /// Modal header line, e.g. `Property: Loft`.
    #[must_use]
    pub fn header(&self) -> Option<String> {
        self.target.as_ref().map(|t| format!("Property: {}", t.title))
    }
}

#[derive(Default)]
struct OfferState {
    open: bool,
    generation: u64,
    target: Option<OfferTarget>,
    form: OfferForm,
    submit_pending: bool,
    notice: Option<Notice>,
}

impl OfferState {
    /// Reset to a closed, empty modal under a new generation.
    fn reset(&mut self) {
        *self = Self { generation: self.generation + 1, ..Self::default() };
    }
}

/// Cloneable handle to the offer modal.
#[derive(Clone)]
pub struct OfferFlow {
    api: Arc<dyn SiteApi>,
    state: Arc<Mutex<OfferState>>,
}

impl OfferFlow {
    #[must_use]
    pub fn new(api: Arc<dyn SiteApi>) -> Self {
        Self { api, state: Arc::new(Mutex::new(OfferState::default())) }
    }

    fn lock(&self) -> MutexGuard<'_, OfferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open with an empty form bound to `target`.
    pub fn open(&self, target: OfferTarget) {
        let mut state = self.lock();
        state.reset();
        tracing::debug!(property_id = %target.property_id, generation = state.generation, "offer modal opened");
        state.target = Some(target);
        state.open = true;
    }

    /// Close and clear the form. An in-flight submit completes in the
    /// background and its result is dropped.
    pub fn close(&self) {
        self.lock().reset();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    #[must_use]
    pub fn view(&self) -> OfferView {
        let state = self.lock();
        OfferView {
            open: state.open,
            target: state.target.clone(),
            form: state.form.clone(),
            submit_pending: state.submit_pending,
            notice: state.notice.clone(),
        }
    }

    /// Set one form field.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotOpen`] when the modal is closed.
    pub fn edit(&self, field: OfferField, value: impl Into<String>) -> Result<(), ActionError> {
        let mut state = self.lock();
        if !state.open {
            return Err(ActionError::NotOpen);
        }
        state.form.set(field, value.into());
        Ok(())
    }

    /// Validate and post the offer.
    ///
    /// Success closes the modal and leaves an "Offer submitted!" notice.
    /// Failure keeps the modal open with the entered values.
    ///
    /// # Errors
    ///
    /// `Validation` before anything is sent; `Transport`/`Server` from the
    /// backend; `Busy`, `NotOpen`, `Superseded` for local preconditions.
    pub async fn submit(&self) -> Result<Offer, ActionError> {
        let (generation, body) = {
            let mut state = self.lock();
            if !state.open {
                return Err(ActionError::NotOpen);
            }
            if state.submit_pending {
                return Err(ActionError::Busy);
            }
            let target = state.target.clone().ok_or(ActionError::NotOpen)?;
            let body = match state.form.validate(&target) {
                Ok(body) => body,
                Err(err) => {
                    state.notice = Some(Notice::Invalid(err.clone()));
                    return Err(err.into());
                }
            };
            state.submit_pending = true;
            state.notice = None;
            (state.generation, body)
        };

        let result = self.api.create_offer(&body).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(generation, "offer result discarded; modal closed");
            return Err(ActionError::Superseded);
        }
        state.submit_pending = false;
        match result {
            Ok(offer) => {
                tracing::info!(offer_id = %offer.id, property_id = %offer.property_id, "offer submitted");
                state.reset();
                state.notice = Some(Notice::OfferSubmitted);
                Ok(offer)
            }
            Err(e) => {
                let err = ActionError::from_api(e);
                tracing::warn!(property_id = %body.property_id, error = %err, "offer submission failed");
                state.notice = Some(Notice::OfferFailed);
                Err(err)
            }
        }
    }
}
