//! Component-level failure taxonomy.
//!
//! Remote failures are mapped at the component that initiated them; the
//! component also records a [`super::notice::Notice`] so nothing needs a
//! global error handler.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::net::ApiError;

/// Malformed local input, rejected before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("amount is required")]
    MissingAmount,
    #[error("amount `{0}` is not a number")]
    InvalidAmount(String),
    #[error("amount cannot be negative")]
    NegativeAmount,
    #[error("buyer name is required")]
    MissingName,
    #[error("buyer email is required")]
    MissingEmail,
}

/// Why a component action did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// No response from the backend.
    #[error("server unreachable: {0}")]
    Transport(String),

    /// The login endpoint rejected the credentials.
    #[error("login rejected (status {status})")]
    Auth { status: u16 },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Non-2xx on a well-formed request, or a body that did not decode.
    #[error("server error: {detail}")]
    Server { status: Option<u16>, detail: String },

    /// A privileged action was attempted without a session token.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The same action is already in flight.
    #[error("action already in progress")]
    Busy,

    /// The owning panel or modal is closed.
    #[error("not open")]
    NotOpen,

    /// The editor has no working copy yet.
    #[error("settings not loaded")]
    NotLoaded,

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    /// The owner was closed or reopened while the request was in flight;
    /// the result was dropped.
    #[error("result discarded: owner closed before the response arrived")]
    Superseded,
}

impl ActionError {
    /// Map a failure from any endpoint other than login.
    #[must_use]
    pub fn from_api(err: ApiError) -> Self {
        match err {
            ApiError::Transport(detail) | ApiError::ClientBuild(detail) => Self::Transport(detail),
            ApiError::Status { status, .. } => Self::Server { status: Some(status), detail: format!("status {status}") },
            ApiError::Decode(detail) => Self::Server { status: None, detail },
        }
    }

    /// Map a login failure: any 4xx is a credential rejection.
    #[must_use]
    pub fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, .. } if (400..500).contains(&status) => Self::Auth { status },
            other => Self::from_api(other),
        }
    }
}
