//! # Synchronization Store
//!
//! Keeps a local, in-memory product list consistent with the remote collection under
//! interleaved local commands and a live server-push subscription.
//!
//! # Main Components
//!
//! - [`SyncActor`] - Owns the [`ProductCollectionState`] and applies every transition
//! - [`StoreClient`] - Cloneable handle: commands plus read access to the state
//! - [`ProductCollectionState`] / [`Family`] - What the presentation layer renders
//! - [`StoreError`] - Failures of the store plumbing itself
//!
//! # State machine
//!
//! Each family (fetch, add, update, delete) runs Idle -> InProgress -> Idle. Entering
//! InProgress clears `last_error`. On success the mutation is applied and `last_error`
//! stays clear; on failure the list is left exactly as it was and `last_error` holds the
//! message. Commands are never optimistic.
//!
//! Snapshots from [`StoreClient::subscribe`] replace the whole list whenever they
//! arrive, regardless of commands in flight. There is no sequencing token: whichever of
//! a snapshot or a command resolution is applied last wins.
//!
//! ```no_run
//! use product_sync::gateway::mock::create_mock_gateway;
//! use product_sync::store::SyncActor;
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let (gateway, _requests) = create_mock_gateway(16);
//! let (actor, store) = SyncActor::new(32);
//! tokio::spawn(actor.run(Arc::new(gateway)));
//!
//! let _subscription = store.subscribe().await.unwrap();
//! println!("{} products", store.state().products.len());
//! # }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod state;

pub use actor::SyncActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use state::{Family, ProductCollectionState};
