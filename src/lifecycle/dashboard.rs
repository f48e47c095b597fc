use crate::config::ClientConfig;
use crate::gateway::{AuthGateway, ProductGateway, RequestError};
use crate::session::SessionClient;
use crate::store::{StoreClient, StoreError, SyncActor};
use std::sync::Arc;
use tracing::{error, info};

/// Failure of a dashboard-level operation.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The server rejected the call; local state is untouched.
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The session-scoped runtime of the dashboard.
///
/// `Dashboard` is responsible for:
/// - **Lifecycle Management**: Starting the store actor at session start and stopping it
/// - **Dependency Wiring**: Handing the same gateway to the store and the session
/// - **Logout**: Ending the server session, then forgetting the user *and* discarding
///   every session-scoped product
///
/// # Example
///
/// ```ignore
/// let dashboard = Dashboard::start(Arc::new(HttpGateway::new(&config)?), &config);
///
/// dashboard.session.login(credentials).await?;
/// let _subscription = dashboard.products.subscribe().await?;
///
/// dashboard.logout().await?;
/// dashboard.shutdown().await?;
/// ```
pub struct Dashboard<G: ProductGateway + AuthGateway> {
    /// Handle to the product store
    pub products: StoreClient,

    /// Handle to the auth state
    pub session: SessionClient<G>,

    handle: tokio::task::JoinHandle<()>,
}

impl<G: ProductGateway + AuthGateway> Dashboard<G> {
    /// Spawns the store actor with `gateway` injected and returns the wired handles.
    pub fn start(gateway: Arc<G>, config: &ClientConfig) -> Self {
        let (actor, products) = SyncActor::new(config.store_buffer);
        let handle = tokio::spawn(actor.run(Arc::clone(&gateway)));
        let session = SessionClient::new(gateway);
        info!("Dashboard started");

        Self {
            products,
            session,
            handle,
        }
    }

    /// Ends the session: server session closed, user forgotten, product list emptied,
    /// flags and error cleared.
    ///
    /// If the server refuses the logout, neither the session nor the products change.
    pub async fn logout(&self) -> Result<(), DashboardError> {
        self.session.logout().await?;
        self.products.reset().await?;
        Ok(())
    }

    /// Gracefully shuts down the store.
    ///
    /// Dropping the last [`StoreClient`] closes the actor's mailbox, so clones handed out
    /// elsewhere must be dropped too or this waits for them.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!("Shutting down dashboard...");
        drop(self.products);

        if let Err(e) = self.handle.await {
            error!("Store task failed: {:?}", e);
            return Err(StoreError::TaskFailed(e.to_string()));
        }

        info!("Dashboard shutdown complete.");
        Ok(())
    }
}
