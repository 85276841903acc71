use crate::api::{ControlApi, ControlApiError, StatusSnapshot};
use crate::session::{self, Credentials, InputError};
use crate::store::{Session, SessionStore, StoreError};

/// Steady states of the session machine. A transient loading overlay is not
/// modeled here: every action takes `&mut self`, so at most one action is in
/// flight and callers disable further input for the duration of the await.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    LoggedOut,
    LoggedIn {
        email: String,
        /// Last fetched snapshot, tracked explicitly so toggle intent is
        /// derived from known state rather than from rendered text.
        snapshot: Option<StatusSnapshot>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Input(#[from] InputError),
    /// Server-side rejection of login, toggle, or settings; carries the
    /// server message or a hardcoded fallback. Phase is unchanged.
    #[error("{message}")]
    Rejected { message: String },
    /// The server disowned the session. The local session has already been
    /// torn down by the time this is returned.
    #[error("Session expired. Please login again.")]
    SessionExpired,
    #[error("Server connection failed.")]
    Transport { message: String },
    #[error("Not logged in.")]
    NotLoggedIn,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates login/logout and session-validity checks, reconciling the
/// local store with server truth. Sole caller of the store and the control
/// API; the view projector is driven from its snapshot.
pub struct SessionController<S, C> {
    store: S,
    api: C,
    phase: Phase,
}

impl<S, C> SessionController<S, C>
where
    S: SessionStore,
    C: ControlApi,
{
    pub fn new(store: S, api: C) -> Self {
        Self {
            store,
            api,
            phase: Phase::LoggedOut,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn email(&self) -> Option<&str> {
        match &self.phase {
            Phase::LoggedIn { email, .. } => Some(email),
            Phase::LoggedOut => None,
        }
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match &self.phase {
            Phase::LoggedIn { snapshot, .. } => snapshot.as_ref(),
            Phase::LoggedOut => None,
        }
    }

    /// Restores the persisted session, if any, then immediately validates it
    /// against the server. An empty store means LoggedOut.
    pub async fn restore(&mut self) -> Result<(), ControllerError> {
        match self.store.load().await? {
            Some(session) => {
                self.phase = Phase::LoggedIn {
                    email: session.email,
                    snapshot: None,
                };
                self.refresh().await
            }
            None => {
                self.phase = Phase::LoggedOut;
                Ok(())
            }
        }
    }

    /// Validates and normalizes the credentials client-side, then attempts a
    /// backend login. On success the session is persisted and the first
    /// snapshot fetched; on failure the phase stays LoggedOut.
    pub async fn login(
        &mut self,
        email: &str,
        app_password: &str,
        api_key: &str,
    ) -> Result<(), ControllerError> {
        let credentials = Credentials::parse(email, app_password, api_key)?;
        if let Err(error) = self.api.login(&credentials).await {
            return Err(self.absorb(error).await);
        }

        let session = Session {
            email: credentials.email.clone(),
        };
        self.store.save(&session).await?;
        self.phase = Phase::LoggedIn {
            email: session.email,
            snapshot: None,
        };
        tracing::info!(email = %credentials.email, "logged in");
        self.refresh().await
    }

    /// Re-fetches the status snapshot. Always hits the server; the snapshot
    /// is never trusted across render cycles because toggle/settings calls
    /// can race with server-side timer updates.
    pub async fn refresh(&mut self) -> Result<(), ControllerError> {
        let email = self.require_email()?;
        match self.api.fetch_status(&email).await {
            Ok(snapshot) => {
                self.phase = Phase::LoggedIn {
                    email,
                    snapshot: Some(snapshot),
                };
                Ok(())
            }
            Err(error) => Err(self.absorb(error).await),
        }
    }

    /// Requests the logical negation of the last-known active state, then
    /// issues exactly one follow-up status fetch so the rendered snapshot
    /// reflects the server's post-mutation truth.
    pub async fn toggle(&mut self) -> Result<(), ControllerError> {
        let email = self.require_email()?;
        let displayed_active = self.snapshot().is_some_and(|snapshot| snapshot.active);
        let want_active = !displayed_active;

        match self.api.toggle(&email, want_active).await {
            // The toggle response body is discarded in favor of the
            // mandatory re-fetch.
            Ok(_) => self.refresh().await,
            Err(error) => Err(self.absorb(error).await),
        }
    }

    /// Parses the interval client-side (an invalid value never reaches the
    /// backend), saves it, then re-fetches the snapshot once.
    pub async fn save_settings(&mut self, raw_interval: &str) -> Result<(), ControllerError> {
        let email = self.require_email()?;
        let interval = session::parse_interval(raw_interval)?;

        match self.api.save_settings(&email, interval).await {
            Ok(()) => self.refresh().await,
            Err(error) => Err(self.absorb(error).await),
        }
    }

    /// Pure local operation: clears the store and drops to LoggedOut. Never
    /// blocked by network state; the phase changes even if the store errors.
    pub async fn logout(&mut self) -> Result<(), ControllerError> {
        self.phase = Phase::LoggedOut;
        self.store.clear().await?;
        tracing::info!("logged out");
        Ok(())
    }

    fn require_email(&self) -> Result<String, ControllerError> {
        self.email()
            .map(str::to_string)
            .ok_or(ControllerError::NotLoggedIn)
    }

    /// Maps an API error onto the controller taxonomy. `SessionNotFound` is
    /// never surfaced raw: the session is torn down unconditionally and the
    /// caller gets a generic session-expired notice instead.
    async fn absorb(&mut self, error: ControlApiError) -> ControllerError {
        match error {
            ControlApiError::SessionNotFound => {
                self.phase = Phase::LoggedOut;
                if let Err(store_error) = self.store.clear().await {
                    tracing::warn!(error = %store_error, "failed to clear session after server 404");
                }
                ControllerError::SessionExpired
            }
            ControlApiError::AuthRejected { message }
            | ControlApiError::Toggle { message }
            | ControlApiError::Settings { message } => ControllerError::Rejected { message },
            ControlApiError::Transport { message } => {
                tracing::warn!(error = %message, "control backend unreachable");
                ControllerError::Transport { message }
            }
        }
    }
}
