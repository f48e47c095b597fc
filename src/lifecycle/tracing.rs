//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: startup, shutdown, reset, subscribe/unsubscribe
//! - **Commands**: every family logs when its resolution is applied or fails, with
//!   `family`, `size` and `error` fields
//! - **Snapshots**: size of each applied snapshot, and snapshots dropped after unsubscribe
//! - **Gateway calls**: one span per call, carrying its arguments
//!
//! ```bash
//! # Applied commands and snapshots
//! RUST_LOG=info product-sync watch
//!
//! # Full payloads of every command and request
//! RUST_LOG=debug product-sync add --name Widget --price 9.99 --quantity 5
//!
//! # Only the store
//! RUST_LOG=product_sync::store=debug product-sync list
//! ```
//!
//! With `RUST_LOG=info` an add followed by a live update reads:
//!
//! ```text
//! INFO Store started
//! INFO Subscribed
//! INFO Snapshot applied size=3
//! INFO Applied family=add size=4
//! INFO Snapshot applied size=4
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths
        .compact()
        .init();
}
