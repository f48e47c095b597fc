#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Product Sync
//!
//! > **Client-side synchronization for a product dashboard.**
//!
//! This crate keeps a local, in-memory product list consistent with a remote collection
//! while the user adds, updates, and deletes products and the server pushes live
//! snapshots of the whole collection.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One writer, many requests in flight
//!
//! The product list lives inside a single actor ([`store::SyncActor`]). Only that task
//! ever writes it, so there are no locks. Gateway calls, however, run *outside* the
//! actor: each command marks its family as in progress, spawns the network call, and
//! the result comes back to the actor as a message. Commands therefore overlap freely,
//! and every resolution or snapshot is applied in the order it arrives.
//!
//! ### Not optimistic
//!
//! The list changes only after the gateway confirms. A failed command leaves the list
//! untouched and records the message in `last_error`.
//!
//! ### Last write wins
//!
//! A snapshot replaces the whole list even if a command is still in flight; if the
//! command resolves afterwards, its mutation is applied on top of the snapshot. There is
//! no sequencing token, so the later arrival wins.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! [`Product`](model::Product), the partial [`ProductPatch`](model::ProductPatch) used for
//! create and update, and the session's [`User`](model::User).
//!
//! ### 2. The Outside World ([`gateway`])
//! - **Role**: The contract the store consumes: request/response calls plus a live feed.
//! - **Key items**: [`ProductGateway`](gateway::ProductGateway),
//!   [`HttpGateway`](gateway::http::HttpGateway), [`mock`](gateway::mock).
//!
//! ### 3. The Engine ([`store`])
//! - **Role**: Owns the [`ProductCollectionState`](store::ProductCollectionState) and
//!   reconciles commands with snapshots.
//! - **Key items**: [`SyncActor`](store::SyncActor), [`StoreClient`](store::StoreClient).
//!
//! ### 4. The Session ([`session`])
//! Login, profile restore, logout.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: Spins up the store, wires it to the gateway and the session, and wipes
//!   session-scoped state on logout.
//! - **Key items**: [`Dashboard`](lifecycle::Dashboard),
//!   [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 6. Odds and Ends
//! [`analytics`] for the charts, [`config`] for runtime settings.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # List the first page
//! RUST_LOG=info cargo run -- list
//!
//! # Follow the live collection
//! RUST_LOG=info cargo run -- watch
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod analytics;
pub mod config;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod session;
pub mod store;
