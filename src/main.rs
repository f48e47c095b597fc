//! # product-sync
//!
//! Command line front end for the product dashboard: every subcommand starts a
//! [`Dashboard`], optionally signs in, runs one store command, and prints the
//! resulting state.
//!
//! ```bash
//! PRODUCT_API_URL=http://localhost:5000 product-sync --username admin --password admin list
//! RUST_LOG=info product-sync watch
//! ```

use clap::{Args, Parser, Subcommand};
use product_sync::analytics::{status_breakdown, stock_chart};
use product_sync::config::{ClientConfig, DEFAULT_PAGE, DEFAULT_PAGE_LIMIT};
use product_sync::gateway::http::HttpGateway;
use product_sync::lifecycle::{setup_tracing, Dashboard};
use product_sync::model::{Credentials, ProductPatch};
use product_sync::store::{ProductCollectionState, StoreClient};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

#[derive(Debug, Parser)]
#[command(name = "product-sync", about = "Product dashboard client", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    /// Sign in before running the command
    #[arg(long, env = "PRODUCT_API_USERNAME", requires = "password")]
    username: Option<String>,

    #[arg(long, env = "PRODUCT_API_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch one page of products
    List {
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Create a product
    Add(AddArgs),
    /// Change fields of a product
    Update(UpdateArgs),
    /// Flip a product between active and inactive
    Toggle {
        #[arg(long)]
        id: String,
    },
    /// Delete a product
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Follow the live collection until interrupted
    Watch,
    /// Print stock and status figures
    Stats,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    quantity: u32,
    /// Create the product as inactive
    #[arg(long)]
    inactive: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    quantity: Option<u32>,
    #[arg(long)]
    status: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _env = dotenvy::dotenv();
    setup_tracing();

    let cli = Cli::parse();
    let gateway = HttpGateway::new(&cli.config).map_err(|e| e.to_string())?;
    let dashboard = Dashboard::start(Arc::new(gateway), &cli.config);

    let signed_in = sign_in(&dashboard, cli.username, cli.password).await;
    let result = match &signed_in {
        Ok(_) => run(cli.command, &dashboard.products, &cli.config).await,
        Err(message) => Err(message.clone()),
    };

    if let Ok(true) = signed_in {
        if let Err(e) = dashboard.logout().await {
            warn!(error = %e, "Logout failed");
        }
    }
    dashboard.shutdown().await.map_err(|e| e.to_string())?;
    result
}

/// Logs in when both credentials are given. `Ok(false)` means no login was attempted.
async fn sign_in(
    dashboard: &Dashboard<HttpGateway>,
    username: Option<String>,
    password: Option<String>,
) -> Result<bool, String> {
    let (Some(username), Some(password)) = (username, password) else {
        return Ok(false);
    };
    dashboard
        .session
        .login(Credentials::new(username, password))
        .instrument(tracing::info_span!("login"))
        .await
        .map_err(|e| e.to_string())?;
    Ok(true)
}

async fn run(command: Command, store: &StoreClient, config: &ClientConfig) -> Result<(), String> {
    match command {
        Command::List { page, limit } => {
            store.fetch(page, limit).await.map_err(|e| e.to_string())?;
            print_products(&outcome(store)?);
        }
        Command::Add(args) => {
            let mut patch = ProductPatch::new(args.name, args.price, args.quantity, !args.inactive);
            patch.description = args.description;
            store.add(patch).await.map_err(|e| e.to_string())?;
            print_products(&outcome(store)?);
        }
        Command::Update(args) => {
            let patch = ProductPatch {
                name: args.name,
                description: args.description,
                price: args.price,
                quantity: args.quantity,
                status: args.status,
            };
            store.update(args.id, patch).await.map_err(|e| e.to_string())?;
            print_products(&outcome(store)?);
        }
        Command::Toggle { id } => {
            let _subscription = load_collection(store, config).await?;
            let product = store
                .state()
                .product(&id)
                .cloned()
                .ok_or_else(|| format!("Product not found: {id}"))?;
            store.toggle_status(&product).await.map_err(|e| e.to_string())?;
            let state = outcome(store)?;
            if let Some(product) = state.product(&id) {
                let status = if product.status { "active" } else { "inactive" };
                println!("{} is now {status}", product.name);
            }
        }
        Command::Delete { id } => {
            store.delete(id).await.map_err(|e| e.to_string())?;
            print_products(&outcome(store)?);
        }
        Command::Watch => {
            let _subscription = store.subscribe().await.map_err(|e| e.to_string())?;
            let mut updates = store.watch();
            info!("Watching products, press Ctrl-C to stop");
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let state = updates.borrow_and_update().clone();
                        if !state.fetch_in_progress {
                            print_products(&state);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Stats => {
            let _subscription = load_collection(store, config).await?;
            let state = store.state();
            let status = status_breakdown(&state.products);
            println!("Active: {}  Inactive: {}", status.active, status.inactive);
            for point in stock_chart(&state.products) {
                if !point.name.is_empty() {
                    println!("{:<30} {:>6}", point.name, point.stock);
                }
            }
        }
    }
    Ok(())
}

/// Subscribes and waits for the first full snapshot.
async fn load_collection(
    store: &StoreClient,
    config: &ClientConfig,
) -> Result<product_sync::gateway::Subscription, String> {
    let subscription = store.subscribe().await.map_err(|e| e.to_string())?;
    let mut updates = store.watch();
    tokio::time::timeout(config.timeout(), updates.wait_for(|state| !state.fetch_in_progress))
        .await
        .map_err(|_| "Timed out waiting for the product collection".to_string())?
        .map_err(|e| e.to_string())?;
    Ok(subscription)
}

/// The state after a command, or its failure message.
fn outcome(store: &StoreClient) -> Result<ProductCollectionState, String> {
    let state = store.state();
    if let Some(message) = &state.last_error {
        return Err(message.clone());
    }
    Ok(state)
}

fn print_products(state: &ProductCollectionState) {
    println!(
        "{:<24} {:<30} {:>10} {:>6}  {:<8} Description",
        "ID", "Name", "Price", "Qty", "Status"
    );
    for product in &state.products {
        println!(
            "{:<24} {:<30} {:>10.2} {:>6}  {:<8} {}",
            product.id,
            product.name,
            product.price,
            product.quantity,
            if product.status { "active" } else { "inactive" },
            product.short_description().unwrap_or_default(),
        );
    }
    println!("(Total: {})", state.products.len());
}
