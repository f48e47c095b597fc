//! Authentication state for the dashboard session.
//!
//! [`SessionClient`] records the signed-in user, a loading flag, and the last auth
//! error. Unlike the product store it has no actor: each call mutates the published
//! state around a single gateway round trip, and the watch channel serializes those
//! writes.

use crate::gateway::{AuthGateway, RequestError};
use crate::model::{Credentials, User};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Cloneable handle to the session state.
pub struct SessionClient<G: AuthGateway> {
    gateway: Arc<G>,
    state: Arc<watch::Sender<AuthState>>,
}

impl<G: AuthGateway> Clone for SessionClient<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
        }
    }
}

impl<G: AuthGateway> SessionClient<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            gateway,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Sign in. On failure the user is cleared and the message kept in `error`.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: Credentials) -> Result<User, RequestError> {
        self.begin();
        let result = self.gateway.login(credentials).await;
        self.state.send_modify(|state| {
            state.loading = false;
            match &result {
                Ok(user) => state.user = Some(user.clone()),
                Err(e) => {
                    state.user = None;
                    state.error = Some(e.message.clone());
                }
            }
        });
        match &result {
            Ok(_) => info!("Logged in"),
            Err(e) => warn!(error = %e, "Login failed"),
        }
        result
    }

    /// Restore the user from the server-side session.
    ///
    /// On failure the user is cleared but `error` is left alone: a missing session is
    /// the normal state before login, not something to show.
    #[instrument(skip_all)]
    pub async fn fetch_profile(&self) -> Result<User, RequestError> {
        self.begin();
        let result = self.gateway.profile().await;
        self.state.send_modify(|state| {
            state.loading = false;
            state.user = result.as_ref().ok().cloned();
        });
        if let Err(e) = &result {
            info!(error = %e, "No active session");
        }
        result
    }

    /// End the server-side session, then forget the user locally.
    ///
    /// When the server refuses, nothing local changes and the error is returned.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), RequestError> {
        if let Err(e) = self.gateway.logout().await {
            warn!(error = %e, "Logout failed");
            return Err(e);
        }
        self.state.send_modify(|state| {
            state.user = None;
            state.error = None;
        });
        info!("Logged out");
        Ok(())
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }
}

impl<G: AuthGateway> std::fmt::Debug for SessionClient<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("state", &*self.state.borrow())
            .finish()
    }
}
