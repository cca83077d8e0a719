//! Wire DTOs for the estates REST API.
//!
//! DESIGN
//! ======
//! Records decode leniently: a missing or null field takes its default
//! (empty string, `0.0`, empty list) and identifiers may arrive as strings
//! or numbers. `SiteSettings` keeps any key it does not model so a save
//! sends back exactly what was fetched.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The singleton site-copy document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Brand name shown in the navbar and footer.
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub site_name: String,
    /// Landing-page headline.
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub hero_headline: String,
    /// Landing-page subtitle under the headline.
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub hero_subtitle: String,
    /// Free-form keys the client does not model, round-tripped verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One editable key of [`SiteSettings`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SettingsField {
    SiteName,
    HeroHeadline,
    HeroSubtitle,
    Extra(String),
}

impl SettingsField {
    /// Map a wire key to a field; unknown keys become [`SettingsField::Extra`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key {
            "site_name" => Self::SiteName,
            "hero_headline" => Self::HeroHeadline,
            "hero_subtitle" => Self::HeroSubtitle,
            other => Self::Extra(other.to_owned()),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::SiteName => "site_name",
            Self::HeroHeadline => "hero_headline",
            Self::HeroSubtitle => "hero_subtitle",
            Self::Extra(key) => key,
        }
    }
}

impl SiteSettings {
    /// Overwrite one field with a string value.
    pub fn set(&mut self, field: &SettingsField, value: String) {
        match field {
            SettingsField::SiteName => self.site_name = value,
            SettingsField::HeroHeadline => self.hero_headline = value,
            SettingsField::HeroSubtitle => self.hero_subtitle = value,
            SettingsField::Extra(key) => {
                self.extra.insert(key.clone(), Value::String(value));
            }
        }
    }

    /// Read one field as text. Non-string extra values are not text.
    #[must_use]
    pub fn get(&self, field: &SettingsField) -> Option<&str> {
        match field {
            SettingsField::SiteName => Some(&self.site_name),
            SettingsField::HeroHeadline => Some(&self.hero_headline),
            SettingsField::HeroSubtitle => Some(&self.hero_subtitle),
            SettingsField::Extra(key) => self.extra.get(key).and_then(Value::as_str),
        }
    }
}

/// A listed property. Read-only from this client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Opaque server identifier.
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub description: String,
    /// Asking price in whole currency units.
    #[serde(default, deserialize_with = "deserialize_f64_or_null")]
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub city: String,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub state: String,
    /// Image URLs in display order; the first is the card image.
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub images: Vec<String>,
}

/// A purchase offer as stored by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    /// Referenced property; not checked against the catalog.
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub property_id: String,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub buyer_name: String,
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub buyer_email: String,
    #[serde(default, deserialize_with = "deserialize_f64_or_null")]
    pub amount: f64,
    #[serde(default)]
    pub message: Option<String>,
    /// Server-assigned status such as `pending`; displayed, never edited.
    #[serde(default, deserialize_with = "deserialize_string_or_null")]
    pub status: String,
}

/// Body of `POST /api/offers`. Built only from validated form input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewOffer {
    pub property_id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub amount: f64,
    /// Always sent; empty when the buyer left no message.
    pub message: String,
}

/// Admin login credentials. The password never appears in `Debug` output.
pub struct Credentials {
    pub email: String,
    password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: SecretString::from(password.into()) }
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /api/admin/login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful `POST /api/admin/login` response.
#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// In-memory bearer credential for settings mutation.
///
/// Cloning shares the same secret allocation.
#[derive(Clone)]
pub struct AdminToken(Arc<SecretString>);

impl AdminToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(token.into())))
    }

    /// True when the server handed back an empty or whitespace token.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }

    /// The raw token, for building the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken([REDACTED])")
    }
}

fn deserialize_string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_f64_or_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}
