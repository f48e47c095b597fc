//! # Mock Gateway
//!
//! Utilities for testing the store and session without a server.
//!
//! Two styles are available:
//!
//! - **Manual responders**: [`create_mock_gateway`] returns a gateway and the receiver
//!   its requests arrive on. Helpers like [`expect_create`] or [`expect_update`] hand the
//!   test each request together with its responder, so the test decides *when* (and in
//!   what order) every call resolves. This is what race tests need.
//! - **Scripted**: [`ScriptedGateway`] answers from a queue of expectations and
//!   [`verify`](ScriptedGateway::verify)s that all of them were consumed.
//!
//! Both share the live feed: [`MockGateway::push_snapshot`] delivers a full collection
//! to every open subscription.

use super::{AuthGateway, ProductGateway, RequestError, SnapshotFeed, Subscription};
use crate::model::{Credentials, Product, ProductPatch, User};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// One-shot responder handed to the test for a pending gateway call.
pub type Responder<T> = oneshot::Sender<Result<T, RequestError>>;

/// A gateway call captured by the mock.
#[derive(Debug)]
pub enum GatewayRequest {
    FetchPage {
        page: u32,
        limit: u32,
        respond_to: Responder<Vec<Product>>,
    },
    Create {
        patch: ProductPatch,
        respond_to: Responder<Product>,
    },
    Update {
        id: String,
        patch: ProductPatch,
        respond_to: Responder<Product>,
    },
    Remove {
        id: String,
        respond_to: Responder<()>,
    },
    Login {
        credentials: Credentials,
        respond_to: Responder<User>,
    },
    Profile {
        respond_to: Responder<User>,
    },
    Logout {
        respond_to: Responder<()>,
    },
}

struct Feed {
    sender: mpsc::UnboundedSender<Vec<Product>>,
    active: Arc<AtomicBool>,
}

/// Gateway whose calls are forwarded to a channel the test controls.
#[derive(Clone)]
pub struct MockGateway {
    sender: mpsc::Sender<GatewayRequest>,
    feeds: Arc<Mutex<Vec<Feed>>>,
}

impl MockGateway {
    /// Delivers `products` to every open subscription and returns how many received it.
    pub fn push_snapshot(&self, products: Vec<Product>) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|feed| {
            feed.active.load(Ordering::SeqCst) && feed.sender.send(products.clone()).is_ok()
        });
        feeds.len()
    }

    /// Number of subscriptions that have not been cancelled.
    pub fn subscriber_count(&self) -> usize {
        let mut feeds = self.feeds.lock().unwrap();
        feeds.retain(|feed| feed.active.load(Ordering::SeqCst) && !feed.sender.is_closed());
        feeds.len()
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(Responder<T>) -> GatewayRequest,
    ) -> Result<T, RequestError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| RequestError::new("mock gateway closed"))?;
        response
            .await
            .map_err(|_| RequestError::new("mock gateway dropped the request"))?
    }
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGateway").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProductGateway for MockGateway {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Vec<Product>, RequestError> {
        self.call(|respond_to| GatewayRequest::FetchPage { page, limit, respond_to })
            .await
    }

    async fn create(&self, patch: ProductPatch) -> Result<Product, RequestError> {
        self.call(|respond_to| GatewayRequest::Create { patch, respond_to })
            .await
    }

    async fn update(&self, id: String, patch: ProductPatch) -> Result<Product, RequestError> {
        self.call(|respond_to| GatewayRequest::Update { id, patch, respond_to })
            .await
    }

    async fn remove(&self, id: String) -> Result<(), RequestError> {
        self.call(|respond_to| GatewayRequest::Remove { id, respond_to })
            .await
    }

    fn subscribe(&self) -> SnapshotFeed {
        let (sender, receiver) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));
        self.feeds.lock().unwrap().push(Feed {
            sender,
            active: active.clone(),
        });
        SnapshotFeed::new(
            receiver,
            Subscription::new(move || active.store(false, Ordering::SeqCst)),
        )
    }
}

#[async_trait]
impl AuthGateway for MockGateway {
    async fn login(&self, credentials: Credentials) -> Result<User, RequestError> {
        self.call(|respond_to| GatewayRequest::Login { credentials, respond_to })
            .await
    }

    async fn profile(&self) -> Result<User, RequestError> {
        self.call(|respond_to| GatewayRequest::Profile { respond_to })
            .await
    }

    async fn logout(&self) -> Result<(), RequestError> {
        self.call(|respond_to| GatewayRequest::Logout { respond_to })
            .await
    }
}

/// Creates a mock gateway and the receiver its requests arrive on.
///
/// # Testing Strategy
/// The store spawns every gateway call, so from a test's point of view the calls are
/// "in flight" until the test answers them through the captured responder. Answering
/// them in a chosen order reproduces network reordering deterministically.
pub fn create_mock_gateway(buffer_size: usize) -> (MockGateway, mpsc::Receiver<GatewayRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let gateway = MockGateway {
        sender,
        feeds: Arc::new(Mutex::new(Vec::new())),
    };
    (gateway, receiver)
}

/// Helper to verify that the next request is a FetchPage request
pub async fn expect_fetch_page(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
) -> Option<(u32, u32, Responder<Vec<Product>>)> {
    match receiver.recv().await {
        Some(GatewayRequest::FetchPage {
            page,
            limit,
            respond_to,
        }) => Some((page, limit, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a Create request
pub async fn expect_create(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
) -> Option<(ProductPatch, Responder<Product>)> {
    match receiver.recv().await {
        Some(GatewayRequest::Create { patch, respond_to }) => Some((patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is an Update request
pub async fn expect_update(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
) -> Option<(String, ProductPatch, Responder<Product>)> {
    match receiver.recv().await {
        Some(GatewayRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a Remove request
pub async fn expect_remove(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
) -> Option<(String, Responder<()>)> {
    match receiver.recv().await {
        Some(GatewayRequest::Remove { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a Login request
pub async fn expect_login(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
) -> Option<(Credentials, Responder<User>)> {
    match receiver.recv().await {
        Some(GatewayRequest::Login {
            credentials,
            respond_to,
        }) => Some((credentials, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a Logout request
pub async fn expect_logout(receiver: &mut mpsc::Receiver<GatewayRequest>) -> Option<Responder<()>> {
    match receiver.recv().await {
        Some(GatewayRequest::Logout { respond_to }) => Some(respond_to),
        _ => None,
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A queued answer for [`ScriptedGateway`].
enum Expectation {
    FetchPage(Result<Vec<Product>, RequestError>),
    Create(Result<Product, RequestError>),
    Update {
        id: String,
        response: Result<Product, RequestError>,
    },
    Remove {
        id: String,
        response: Result<(), RequestError>,
    },
    Login(Result<User, RequestError>),
    Profile(Result<User, RequestError>),
    Logout(Result<(), RequestError>),
}

/// A mock gateway that answers from a queue of expectations.
///
/// A request that does not match the next expectation is recorded and left unanswered,
/// so the caller sees a failed request; [`verify`](Self::verify) then reports it.
///
/// # Example
/// ```ignore
/// let scripted = ScriptedGateway::new();
/// scripted.expect_create().return_ok(Product::new("p1", "Widget", 9.99, 5, true));
/// scripted.expect_remove("p1").return_ok(());
///
/// let gateway = scripted.gateway();
/// // Drive a store with `gateway`...
/// scripted.verify(); // Ensures all expectations were met
/// ```
pub struct ScriptedGateway {
    gateway: MockGateway,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    mismatches: Arc<Mutex<Vec<String>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl ScriptedGateway {
    /// Creates a new scripted gateway with no expectations.
    pub fn new() -> Self {
        let (gateway, mut receiver) = create_mock_gateway(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let mismatches = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let mismatches_clone = mismatches.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();
                answer(request, expectation, &mismatches_clone);
            }
        });

        Self {
            gateway,
            expectations,
            mismatches,
            _handle: handle,
        }
    }

    /// Returns the gateway for use in tests.
    pub fn gateway(&self) -> MockGateway {
        self.gateway.clone()
    }

    /// Expects a `fetch_page` call.
    pub fn expect_fetch_page(&self) -> ExpectationBuilder<Vec<Product>> {
        self.builder(Expectation::FetchPage)
    }

    /// Expects a `create` call.
    pub fn expect_create(&self) -> ExpectationBuilder<Product> {
        self.builder(Expectation::Create)
    }

    /// Expects an `update` call for `id`.
    pub fn expect_update(&self, id: impl Into<String>) -> ExpectationBuilder<Product> {
        let id = id.into();
        self.builder(move |response| Expectation::Update { id, response })
    }

    /// Expects a `remove` call for `id`.
    pub fn expect_remove(&self, id: impl Into<String>) -> ExpectationBuilder<()> {
        let id = id.into();
        self.builder(move |response| Expectation::Remove { id, response })
    }

    /// Expects a `login` call.
    pub fn expect_login(&self) -> ExpectationBuilder<User> {
        self.builder(Expectation::Login)
    }

    /// Expects a `profile` call.
    pub fn expect_profile(&self) -> ExpectationBuilder<User> {
        self.builder(Expectation::Profile)
    }

    /// Expects a `logout` call.
    pub fn expect_logout(&self) -> ExpectationBuilder<()> {
        self.builder(Expectation::Logout)
    }

    /// Verifies that every request matched its expectation and all expectations were met.
    pub fn verify(&self) {
        let mismatches = self.mismatches.lock().unwrap();
        if !mismatches.is_empty() {
            panic!("Requests did not match expectations: {}", mismatches.join("; "));
        }
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    fn builder<T>(
        &self,
        wrap: impl FnOnce(Result<T, RequestError>) -> Expectation + Send + 'static,
    ) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            wrap: Box::new(wrap),
            expectations: self.expectations.clone(),
        }
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers `request` from `expectation`, or records why it cannot.
///
/// A mismatch is recorded before the unanswered responder is dropped, so the caller
/// never observes the failure ahead of the record.
fn answer(
    request: GatewayRequest,
    expectation: Option<Expectation>,
    mismatches: &Mutex<Vec<String>>,
) {
    let record = |mismatch: String| mismatches.lock().unwrap().push(mismatch);
    match (request, expectation) {
        (GatewayRequest::FetchPage { respond_to, .. }, Some(Expectation::FetchPage(response))) => {
            let _ = respond_to.send(response);
        }
        (GatewayRequest::Create { respond_to, .. }, Some(Expectation::Create(response))) => {
            let _ = respond_to.send(response);
        }
        (
            GatewayRequest::Update { id, respond_to, .. },
            Some(Expectation::Update {
                id: expected,
                response,
            }),
        ) => {
            if id == expected {
                let _ = respond_to.send(response);
            } else {
                record(format!("update sent for {id}, expected {expected}"));
            }
        }
        (
            GatewayRequest::Remove { id, respond_to },
            Some(Expectation::Remove {
                id: expected,
                response,
            }),
        ) => {
            if id == expected {
                let _ = respond_to.send(response);
            } else {
                record(format!("remove sent for {id}, expected {expected}"));
            }
        }
        (GatewayRequest::Login { respond_to, .. }, Some(Expectation::Login(response))) => {
            let _ = respond_to.send(response);
        }
        (GatewayRequest::Profile { respond_to }, Some(Expectation::Profile(response))) => {
            let _ = respond_to.send(response);
        }
        (GatewayRequest::Logout { respond_to }, Some(Expectation::Logout(response))) => {
            let _ = respond_to.send(response);
        }
        (request, Some(_)) => record(format!("unexpected request: {request:?}")),
        (request, None) => record(format!("request with no expectation left: {request:?}")),
    }
}

/// Builder completing one queued expectation.
pub struct ExpectationBuilder<T> {
    wrap: Box<dyn FnOnce(Result<T, RequestError>) -> Expectation + Send>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl<T> ExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: RequestError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, RequestError>) {
        let expectation = (self.wrap)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}
