//! # Store Client
//!
//! The presentation-facing handle to the [`SyncActor`](super::SyncActor).

use super::error::StoreError;
use super::message::{Response, StoreRequest};
use super::state::ProductCollectionState;
use crate::gateway::Subscription;
use crate::model::{Product, ProductPatch};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument};

/// Type-safe, cloneable client for the product store.
///
/// Commands resolve once their outcome has been applied to the state. A failed
/// request still resolves with `Ok(())`: the failure is visible through
/// [`ProductCollectionState::last_error`] and the family's flag, never as an `Err`.
/// `Err` only means the store itself is gone.
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
    state: watch::Receiver<ProductCollectionState>,
}

impl StoreClient {
    pub(crate) fn new(
        sender: mpsc::Sender<StoreRequest>,
        state: watch::Receiver<ProductCollectionState>,
    ) -> Self {
        Self { sender, state }
    }

    /// Current state, as last published by the actor.
    pub fn state(&self) -> ProductCollectionState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified after every state transition.
    pub fn watch(&self) -> watch::Receiver<ProductCollectionState> {
        self.state.clone()
    }

    /// Replace the list with one page from the server.
    #[instrument(skip(self))]
    pub async fn fetch(&self, page: u32, limit: u32) -> Result<(), StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Fetch { page, limit, respond_to })
            .await
    }

    /// Create a product and append the server's record.
    #[instrument(skip(self))]
    pub async fn add(&self, patch: ProductPatch) -> Result<(), StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Add { patch, respond_to })
            .await
    }

    /// Update a product and replace it in place with the server's record.
    #[instrument(skip_all)]
    pub async fn update(
        &self,
        id: impl Into<String>,
        patch: ProductPatch,
    ) -> Result<(), StoreError> {
        let id = id.into();
        debug!(%id, ?patch, "Sending request");
        self.request(|respond_to| StoreRequest::Update { id, patch, respond_to })
            .await
    }

    /// Flip a product between active and inactive.
    pub async fn toggle_status(&self, product: &Product) -> Result<(), StoreError> {
        self.update(product.id.clone(), ProductPatch::status(!product.status))
            .await
    }

    /// Delete a product and drop it from the list.
    #[instrument(skip_all)]
    pub async fn delete(&self, id: impl Into<String>) -> Result<(), StoreError> {
        let id = id.into();
        debug!(%id, "Sending request");
        self.request(|respond_to| StoreRequest::Delete { id, respond_to })
            .await
    }

    /// Mirror the remote collection until the returned handle is unsubscribed or dropped.
    #[instrument(skip(self))]
    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Subscribe { respond_to })
            .await
    }

    /// Discard all session-scoped state: empty list, flags down, no error.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), StoreError> {
        debug!("Sending request");
        self.request(|respond_to| StoreRequest::Reset { respond_to })
            .await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> StoreRequest,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}
