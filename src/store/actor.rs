//! # Synchronization Actor
//!
//! This module defines the `SyncActor`, the single owner of the
//! [`ProductCollectionState`]. It implements the "Server" side of the store: every
//! state transition happens inside its loop, one message at a time.

use super::client::StoreClient;
use super::message::{Completion, Response, StoreRequest};
use super::state::{Family, Mutation, ProductCollectionState};
use crate::gateway::{ProductGateway, RequestError, Subscription};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// The actor that keeps the local product list in step with the remote collection.
///
/// # Architecture Note
/// Gateway calls are *not* awaited inside the loop. The actor marks the family as in
/// progress, spawns the call, and goes back to its mailbox. When the call resolves,
/// the spawned task posts a [`Completion`] back, and the actor applies it. Snapshots
/// from the live feed travel through the same completion queue.
///
/// Consequences:
/// - commands of every family interleave freely, including two of the same family;
/// - resolutions and snapshots are applied in the order they *arrive*, so whichever
///   lands last wins;
/// - only this task ever writes the state, so no locks are needed.
pub struct SyncActor {
    receiver: mpsc::Receiver<StoreRequest>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_sender: mpsc::UnboundedSender<Completion>,
    state: watch::Sender<ProductCollectionState>,
}

impl SyncActor {
    /// Creates a new `SyncActor` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the command channel. If the channel is full,
    ///   calls on the client wait until there is space. Zero is raised to one.
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let (completion_sender, completions) = mpsc::unbounded_channel();
        let (state, state_receiver) = watch::channel(ProductCollectionState::default());
        let actor = Self {
            receiver,
            completions,
            completion_sender,
            state,
        };
        (actor, StoreClient::new(sender, state_receiver))
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// The gateway is injected here rather than in `new()`, so the store can be
    /// created before the transport is ready.
    pub async fn run<G: ProductGateway>(mut self, gateway: Arc<G>) {
        info!("Store started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &gateway),
                    None => break,
                },
                Some(completion) = self.completions.recv() => self.apply(completion),
            }
        }

        info!(size = self.state.borrow().products.len(), "Shutdown");
    }

    fn handle_request<G: ProductGateway>(&mut self, request: StoreRequest, gateway: &Arc<G>) {
        match request {
            StoreRequest::Fetch { page, limit, respond_to } => {
                debug!(page, limit, "Fetch");
                self.begin(Family::Fetch);
                let gateway = Arc::clone(gateway);
                self.spawn_command(Family::Fetch, respond_to, async move {
                    gateway.fetch_page(page, limit).await.map(Mutation::ReplaceAll)
                });
            }
            StoreRequest::Add { patch, respond_to } => {
                debug!(?patch, "Add");
                self.begin(Family::Add);
                if let Err(reason) = patch.validate_new() {
                    self.finish(Family::Add, Err(RequestError::new(reason)));
                    let _ = respond_to.send(());
                    return;
                }
                let gateway = Arc::clone(gateway);
                self.spawn_command(Family::Add, respond_to, async move {
                    gateway.create(patch).await.map(Mutation::Append)
                });
            }
            StoreRequest::Update { id, patch, respond_to } => {
                debug!(%id, ?patch, "Update");
                self.begin(Family::Update);
                if let Err(reason) = patch.validate() {
                    self.finish(Family::Update, Err(RequestError::new(reason)));
                    let _ = respond_to.send(());
                    return;
                }
                let gateway = Arc::clone(gateway);
                self.spawn_command(Family::Update, respond_to, async move {
                    let product = gateway.update(id.clone(), patch).await?;
                    Ok(Mutation::Replace { id, product })
                });
            }
            StoreRequest::Delete { id, respond_to } => {
                debug!(%id, "Delete");
                self.begin(Family::Delete);
                let gateway = Arc::clone(gateway);
                self.spawn_command(Family::Delete, respond_to, async move {
                    gateway.remove(id.clone()).await?;
                    Ok(Mutation::Remove(id))
                });
            }
            StoreRequest::Subscribe { respond_to } => {
                self.state.send_modify(|state| state.fetch_in_progress = true);
                let subscription = self.open_feed(gateway.as_ref());
                info!("Subscribed");
                let _ = respond_to.send(subscription);
            }
            StoreRequest::Reset { respond_to } => {
                self.state.send_modify(ProductCollectionState::clear);
                info!("Reset");
                let _ = respond_to.send(());
            }
        }
    }

    /// Idle -> InProgress for `family`.
    fn begin(&mut self, family: Family) {
        self.state.send_modify(|state| {
            state.set_in_progress(family, true);
            state.last_error = None;
        });
    }

    /// InProgress -> Idle for `family`, applying the mutation on success.
    fn finish(&mut self, family: Family, outcome: Result<Mutation, RequestError>) {
        self.state.send_modify(|state| {
            state.set_in_progress(family, false);
            match outcome {
                Ok(mutation) => {
                    mutation.apply(&mut state.products);
                    state.last_error = None;
                    info!(%family, size = state.products.len(), "Applied");
                }
                Err(e) => {
                    warn!(%family, error = %e, "Failed");
                    state.last_error = Some(e.message);
                }
            }
        });
    }

    fn spawn_command<F>(&self, family: Family, respond_to: Response<()>, call: F)
    where
        F: Future<Output = Result<Mutation, RequestError>> + Send + 'static,
    {
        let sender = self.completion_sender.clone();
        tokio::spawn(async move {
            let outcome = call.await;
            // The actor may already be gone; the caller then sees `Dropped`.
            let _ = sender.send(Completion::Command {
                family,
                outcome,
                respond_to,
            });
        });
    }

    /// Opens the gateway feed and forwards its snapshots into the completion queue.
    fn open_feed<G: ProductGateway>(&self, gateway: &G) -> Subscription {
        let mut feed = gateway.subscribe();
        let active = Arc::new(AtomicBool::new(true));
        let sender = self.completion_sender.clone();
        let forward_active = active.clone();

        let forwarder = tokio::spawn(async move {
            while let Some(products) = feed.next().await {
                let snapshot = Completion::Snapshot {
                    active: forward_active.clone(),
                    products,
                };
                if sender.send(snapshot).is_err() {
                    break;
                }
            }
            debug!("Feed forwarder stopped");
        });

        let abort = forwarder.abort_handle();
        Subscription::new(move || {
            active.store(false, Ordering::SeqCst);
            abort.abort();
            info!("Unsubscribed");
        })
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Command {
                family,
                outcome,
                respond_to,
            } => {
                self.finish(family, outcome);
                let _ = respond_to.send(());
            }
            Completion::Snapshot { active, products } => {
                if !active.load(Ordering::SeqCst) {
                    debug!("Snapshot from a closed subscription dropped");
                    return;
                }
                let size = products.len();
                self.state.send_modify(|state| {
                    state.products = products;
                    state.fetch_in_progress = false;
                    state.last_error = None;
                });
                info!(size, "Snapshot applied");
            }
        }
    }
}
