//! User-visible notices raised by components.
//!
//! Login failures always read "Login failed": the cause (bad credentials vs.
//! unreachable server) is logged, never shown.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::fmt;

use super::error::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    LoginFailed,
    SettingsLoadFailed,
    SettingsSaved,
    SaveFailed,
    OfferSubmitted,
    OfferFailed,
    Invalid(ValidationError),
}

impl Notice {
    /// True for notices that report a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::SettingsSaved | Self::OfferSubmitted)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginFailed => f.write_str("Login failed"),
            Self::SettingsLoadFailed => f.write_str("Could not load settings"),
            Self::SettingsSaved => f.write_str("Settings saved"),
            Self::SaveFailed => f.write_str("Save failed"),
            Self::OfferSubmitted => f.write_str("Offer submitted!"),
            Self::OfferFailed => f.write_str("Failed to submit offer"),
            Self::Invalid(err) => write!(f, "Check your offer: {err}"),
        }
    }
}
