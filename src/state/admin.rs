//! Admin session and site-settings editor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The panel is a two-step state machine while open: the login step
//! (no token) and the editor step (token held in memory). Closing the panel
//! drops the token, the credentials and the working copy; reopening always
//! starts at the login step.
//!
//! DESIGN
//! ======
//! Async actions snapshot what they need under the lock, release it, await
//! the backend, then re-lock and apply the result only if the panel's
//! session generation is unchanged. A close or reopen in the meantime bumps
//! the generation, so late results are dropped instead of resurrecting a
//! discarded session.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};

use super::error::ActionError;
use super::notice::Notice;
use super::store::SiteStore;
use crate::net::{ApiError, SiteApi};
use crate::net::types::{AdminToken, Credentials, SettingsField, SiteSettings};

pub const LOGIN_HINT: &str = "Use seeded credentials.";
/// Login inputs are pre-filled with the account the seed endpoint creates.
pub const SEEDED_EMAIL: &str = "admin@example.com";
pub const SEEDED_PASSWORD: &str = "admin123";
const SAVE_LABEL: &str = "Save Settings";
const SAVING_LABEL: &str = "Saving...";

/// Which step the panel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdminStep {
    #[default]
    Closed,
    /// No token: credential inputs and a login action.
    Login,
    /// Token held: fields bound to the working copy.
    Editor,
}

/// Read-only snapshot of the panel for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct AdminView {
    pub step: AdminStep,
    pub email: String,
    pub working: Option<SiteSettings>,
    pub login_pending: bool,
    pub save_pending: bool,
    pub load_pending: bool,
    pub notice: Option<Notice>,
}

impl AdminView {
    /// Label of the save button; changes while a save is in flight.
    #[must_use]
    pub fn save_label(&self) -> &'static str {
        if self.save_pending { SAVING_LABEL } else { SAVE_LABEL }
    }

    /// Whether the save action is enabled.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.step == AdminStep::Editor && self.working.is_some() && !self.save_pending
    }
}

struct AdminState {
    open: bool,
    generation: u64,
    email: String,
    password: SecretString,
    token: Option<AdminToken>,
    working: Option<SiteSettings>,
    login_pending: bool,
    save_pending: bool,
    load_pending: bool,
    notice: Option<Notice>,
}

impl AdminState {
    fn fresh(open: bool, generation: u64) -> Self {
        Self {
            open,
            generation,
            email: SEEDED_EMAIL.to_owned(),
            password: SecretString::from(SEEDED_PASSWORD.to_owned()),
            token: None,
            working: None,
            login_pending: false,
            save_pending: false,
            load_pending: false,
            notice: None,
        }
    }

    fn step(&self) -> AdminStep {
        match (self.open, self.token.is_some()) {
            (false, _) => AdminStep::Closed,
            (true, false) => AdminStep::Login,
            (true, true) => AdminStep::Editor,
        }
    }

    fn authed_token(&self) -> Result<AdminToken, ActionError> {
        if !self.open {
            return Err(ActionError::NotOpen);
        }
        self.token.clone().ok_or(ActionError::NotAuthenticated)
    }
}

/// Cloneable handle to the admin panel. Clones share one session.
#[derive(Clone)]
pub struct AdminPanel {
    api: Arc<dyn SiteApi>,
    store: SiteStore,
    state: Arc<Mutex<AdminState>>,
}

impl AdminPanel {
    #[must_use]
    pub fn new(api: Arc<dyn SiteApi>, store: SiteStore) -> Self {
        Self { api, store, state: Arc::new(Mutex::new(AdminState::fresh(false, 0))) }
    }

    fn lock(&self) -> MutexGuard<'_, AdminState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // VISIBILITY
    // =========================================================================

    /// Open the panel at the login step, discarding any previous session.
    pub fn open(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = AdminState::fresh(true, generation);
        tracing::debug!(generation, "admin panel opened");
    }

    /// Close the panel and discard token, credentials and working copy.
    pub fn close(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        let had_session = state.token.is_some();
        *state = AdminState::fresh(false, generation);
        tracing::debug!(generation, had_session, "admin panel closed");
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    #[must_use]
    pub fn step(&self) -> AdminStep {
        self.lock().step()
    }

    #[must_use]
    pub fn view(&self) -> AdminView {
        let state = self.lock();
        AdminView {
            step: state.step(),
            email: state.email.clone(),
            working: state.working.clone(),
            login_pending: state.login_pending,
            save_pending: state.save_pending,
            load_pending: state.load_pending,
            notice: state.notice.clone(),
        }
    }

    // =========================================================================
    // LOGIN STEP
    // =========================================================================

    /// Fill the credential inputs.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotOpen`] when the panel is closed.
    pub fn set_credentials(&self, email: impl Into<String>, password: impl Into<String>) -> Result<(), ActionError> {
        let mut state = self.lock();
        if !state.open {
            return Err(ActionError::NotOpen);
        }
        state.email = email.into();
        state.password = SecretString::from(password.into());
        Ok(())
    }

    /// Exchange the entered credentials for a token, then load the working copy.
    ///
    /// A failure leaves the panel at the login step with a generic
    /// "Login failed" notice; the returned error keeps the real cause.
    /// A failed settings load after a successful login is not a login
    /// failure: the editor opens and [`AdminPanel::reload`] can retry.
    ///
    /// # Errors
    ///
    /// `Auth` for rejected credentials, `Transport`/`Server` otherwise;
    /// `Busy`, `NotOpen` and `Superseded` for local preconditions.
    pub async fn login(&self) -> Result<(), ActionError> {
        let (generation, credentials) = {
            let mut state = self.lock();
            if !state.open {
                return Err(ActionError::NotOpen);
            }
            if state.token.is_some() {
                return Ok(());
            }
            if state.login_pending {
                return Err(ActionError::Busy);
            }
            state.login_pending = true;
            state.notice = None;
            let credentials = Credentials::new(state.email.clone(), state.password.expose_secret());
            (state.generation, credentials)
        };

        let result = match self.api.admin_login(&credentials).await {
            Ok(token) if token.is_blank() => Err(ApiError::Decode("login response carried an empty token".into())),
            other => other,
        };

        {
            let mut state = self.lock();
            if state.generation != generation {
                tracing::debug!(generation, "login result discarded; panel closed");
                return Err(ActionError::Superseded);
            }
            state.login_pending = false;
            match result {
                Ok(token) => state.token = Some(token),
                Err(e) => {
                    let err = ActionError::from_login(e);
                    tracing::warn!(email = %credentials.email, error = %err, "admin login failed");
                    state.notice = Some(Notice::LoginFailed);
                    return Err(err);
                }
            }
        }

        tracing::info!(email = %credentials.email, "admin authenticated");
        match self.reload().await {
            Ok(()) | Err(ActionError::Superseded) => {}
            Err(e) => tracing::warn!(error = %e, "settings load after login failed"),
        }
        Ok(())
    }

    // =========================================================================
    // EDITOR STEP
    // =========================================================================

    /// Fetch the current settings into the working copy, replacing local edits.
    ///
    /// Loads and saves exclude each other so an older fetch can never land
    /// on top of a newer save response.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a token, `Busy` while a load or save is in
    /// flight, or the mapped remote failure.
    pub async fn reload(&self) -> Result<(), ActionError> {
        let generation = {
            let mut state = self.lock();
            state.authed_token()?;
            if state.load_pending || state.save_pending {
                return Err(ActionError::Busy);
            }
            state.load_pending = true;
            state.generation
        };

        let result = self.api.fetch_settings().await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(generation, "settings load discarded; panel closed");
            return Err(ActionError::Superseded);
        }
        state.load_pending = false;
        match result {
            Ok(settings) => {
                state.working = Some(settings);
                Ok(())
            }
            Err(e) => {
                state.notice = Some(Notice::SettingsLoadFailed);
                Err(ActionError::from_api(e))
            }
        }
    }

    /// Edit one field of the working copy. Local only; nothing is sent.
    ///
    /// # Errors
    ///
    /// `NotOpen`, `NotAuthenticated`, or `NotLoaded` when there is no working copy.
    pub fn edit(&self, field: &SettingsField, value: impl Into<String>) -> Result<(), ActionError> {
        let mut state = self.lock();
        state.authed_token()?;
        let working = state.working.as_mut().ok_or(ActionError::NotLoaded)?;
        working.set(field, value.into());
        Ok(())
    }

    /// Send the whole working copy with the session token.
    ///
    /// On success the working copy becomes exactly the server's response and
    /// that canonical document is published to the shared store. On failure
    /// the working copy and the session are left as they were.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` (no request is sent), `Busy` while a load or save is
    /// in flight, `NotLoaded`,
    /// `Superseded`, or the mapped remote failure.
    pub async fn save(&self) -> Result<SiteSettings, ActionError> {
        let (generation, token, draft) = {
            let mut state = self.lock();
            let token = state.authed_token()?;
            if state.save_pending || state.load_pending {
                return Err(ActionError::Busy);
            }
            let draft = state.working.clone().ok_or(ActionError::NotLoaded)?;
            state.save_pending = true;
            state.notice = None;
            (state.generation, token, draft)
        };

        let result = self.api.update_settings(&token, &draft).await;

        let canonical = {
            let mut state = self.lock();
            let current = state.generation == generation;
            if current {
                state.save_pending = false;
            }
            match result {
                Ok(canonical) if current => {
                    state.working = Some(canonical.clone());
                    state.notice = Some(Notice::SettingsSaved);
                    canonical
                }
                Ok(canonical) => {
                    // The panel is gone but the server accepted the write.
                    drop(state);
                    self.store.publish_settings(canonical);
                    tracing::debug!(generation, "save result discarded; panel closed");
                    return Err(ActionError::Superseded);
                }
                Err(_) if !current => return Err(ActionError::Superseded),
                Err(e) => {
                    let err = ActionError::from_api(e);
                    tracing::warn!(error = %err, "settings save failed");
                    state.notice = Some(Notice::SaveFailed);
                    return Err(err);
                }
            }
        };

        tracing::info!("site settings saved");
        self.store.publish_settings(canonical.clone());
        Ok(canonical)
    }
}
