//! # Remote Gateway
//!
//! The contract the [`store`](crate::store) and [`session`](crate::session) consume to
//! talk to the outside world.
//!
//! - [`ProductGateway`]: request/response calls on the product collection plus a live
//!   feed that pushes the *full* collection on every remote change (never a diff).
//! - [`AuthGateway`]: login, profile lookup, logout.
//! - [`SnapshotFeed`] / [`Subscription`]: the receiving end of a live feed and the handle
//!   that stops it.
//!
//! Implementations: [`http::HttpGateway`] for a real API, [`mock`] for tests.

pub mod error;
pub mod http;
pub mod mock;

pub use error::*;

use crate::model::{Credentials, Product, ProductPatch, User};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Request/response access to the remote product collection plus its live feed.
///
/// Every call either resolves with the server's view of the affected records or fails
/// with a [`RequestError`]. Nothing here touches local state.
#[async_trait]
pub trait ProductGateway: Send + Sync + 'static {
    /// Fetch one page of products.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Product>, RequestError>;

    /// Create a product; the server assigns its `id`.
    async fn create(&self, patch: ProductPatch) -> Result<Product, RequestError>;

    /// Update a product and return the full post-update record.
    ///
    /// Fails with a not-found [`RequestError`] when `id` no longer exists server-side.
    async fn update(&self, id: String, patch: ProductPatch) -> Result<Product, RequestError>;

    /// Remove a product.
    async fn remove(&self, id: String) -> Result<(), RequestError>;

    /// Open the live feed. Each item is the full current collection.
    fn subscribe(&self) -> SnapshotFeed;
}

/// Session endpoints.
#[async_trait]
pub trait AuthGateway: Send + Sync + 'static {
    async fn login(&self, credentials: Credentials) -> Result<User, RequestError>;

    async fn profile(&self) -> Result<User, RequestError>;

    /// End the server-side session.
    async fn logout(&self) -> Result<(), RequestError>;
}

/// Handle to a long-lived push channel.
///
/// [`unsubscribe`](Subscription::unsubscribe) runs the cancel hook once; later calls are
/// no-ops. Dropping the handle unsubscribes as well.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Stops further snapshots and releases the channel.
    pub fn unsubscribe(&self) {
        let cancel = match self.cancel.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        match self.cancel.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// The receiving end of a live feed.
///
/// Owns the [`Subscription`], so dropping the feed closes the remote channel.
#[derive(Debug)]
pub struct SnapshotFeed {
    receiver: mpsc::UnboundedReceiver<Vec<Product>>,
    subscription: Subscription,
}

impl SnapshotFeed {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<Vec<Product>>,
        subscription: Subscription,
    ) -> Self {
        Self {
            receiver,
            subscription,
        }
    }

    /// Waits for the next snapshot. `None` once the feed has closed.
    pub async fn next(&mut self) -> Option<Vec<Product>> {
        if !self.subscription.is_active() {
            return None;
        }
        self.receiver.recv().await
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(subscription.is_active());
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(!subscription.is_active());
        drop(subscription);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        drop(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_feed_stops_after_unsubscribe() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut feed = SnapshotFeed::new(rx, Subscription::new(|| {}));

        tx.send(vec![Product::new("p1", "Widget", 1.0, 1, true)]).unwrap();
        assert_eq!(feed.next().await.map(|s| s.len()), Some(1));

        feed.subscription().unsubscribe();
        tx.send(Vec::new()).unwrap();
        assert!(feed.next().await.is_none());
    }
}
