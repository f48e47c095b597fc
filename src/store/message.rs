//! # Store Messages
//!
//! Commands sent by [`StoreClient`](super::StoreClient) to the
//! [`SyncActor`](super::SyncActor), and the completions the actor posts to itself
//! once a gateway call resolves or a snapshot arrives.

use super::state::{Family, Mutation};
use crate::gateway::{RequestError, Subscription};
use crate::model::{Product, ProductPatch};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<T>;

/// Presentation-facing commands.
///
/// Gateway-backed variants (`Fetch`, `Add`, `Update`, `Delete`) are answered only after
/// their resolution has been applied to the state.
#[derive(Debug)]
pub enum StoreRequest {
    Fetch {
        page: u32,
        limit: u32,
        respond_to: Response<()>,
    },
    Add {
        patch: ProductPatch,
        respond_to: Response<()>,
    },
    Update {
        id: String,
        patch: ProductPatch,
        respond_to: Response<()>,
    },
    Delete {
        id: String,
        respond_to: Response<()>,
    },
    Subscribe {
        respond_to: Response<Subscription>,
    },
    Reset {
        respond_to: Response<()>,
    },
}

/// Work finished outside the actor, queued back to it in arrival order.
#[derive(Debug)]
pub(crate) enum Completion {
    Command {
        family: Family,
        outcome: Result<Mutation, RequestError>,
        respond_to: Response<()>,
    },
    Snapshot {
        active: Arc<AtomicBool>,
        products: Vec<Product>,
    },
}
