use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use fluxstore::config::{Config, StorageConfig};
use fluxstore::logging::init_tracing;
use fluxstore::persist::{FileStore, KeyValueStore};
use fluxstore::shop::{
    auth_state, cart_state, checkout, decode_jwt, login, logout, promises, restore_session,
    set_count, shop_store, CartAction, Good, OrderLedger, ShopStore, NEW_ORDER,
};
use fluxstore::store::CombinedState;

#[derive(Parser)]
#[command(name = "fluxstore")]
#[command(about = "Storefront cart and session kept in a persisted state store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.config/fluxstore/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding persisted state, overriding the config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the cart
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },

    /// Log in with a JWT
    Login { token: String },

    /// Forget the current session
    Logout,

    /// Show the logged-in subject
    Whoami,

    /// Place an order for everything in the cart
    Checkout,

    /// List placed orders
    Orders,
}

#[derive(Subcommand)]
enum CartCommand {
    /// Print cart lines and totals
    Show,

    /// Add items of a good
    Add {
        id: String,

        /// Display name (default: the current one, or the id)
        #[arg(long)]
        name: Option<String>,

        /// Unit price (default: the current one, or 0)
        #[arg(long)]
        price: Option<f64>,

        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Remove items of a good
    Sub {
        id: String,

        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Set the count of a good already in the cart
    Set { id: String, count: u32 },

    /// Drop a line
    Del { id: String },

    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let mut storage_config = config.storage;
    if let Some(dir) = cli.data_dir {
        storage_config.data_dir = Some(dir);
    }
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(storage_config.data_dir()));
    debug!(dir = %storage_config.data_dir().display(), "using storage directory");

    let store = shop_store(Arc::clone(&storage), &storage_config);
    let _changes = store.subscribe(|state: &Arc<CombinedState>| {
        debug!(branches = ?state.names().collect::<Vec<_>>(), "store updated");
    });
    store.dispatch_thunk(restore_session(
        Arc::clone(&storage),
        storage_config.token_key.clone(),
    ));

    run_command(cli.command, &store, storage, &storage_config).await
}

async fn run_command(
    command: Commands,
    store: &ShopStore,
    storage: Arc<dyn KeyValueStore>,
    config: &StorageConfig,
) -> Result<()> {
    match command {
        Commands::Cart { command } => run_cart(command, store),
        Commands::Login { token } => {
            decode_jwt(&token).context("Invalid token")?;
            if !store.dispatch_thunk(login(token, storage, config.token_key.clone())) {
                println!("Already logged in with this token");
            }
            print_session(store);
            Ok(())
        }
        Commands::Logout => {
            store.dispatch_thunk(logout(storage, config.token_key.clone()));
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            print_session(store);
            Ok(())
        }
        Commands::Checkout => {
            let ledger = OrderLedger::new(storage, config.orders_key.clone());
            match store.dispatch_thunk(checkout(ledger)).await {
                Some(order) => {
                    println!(
                        "Order {} placed: {} line(s), total {:.2}",
                        order.id,
                        order.lines.len(),
                        order.total
                    );
                    Ok(())
                }
                None => {
                    let reason = promises(&store.get_state())
                        .and_then(|records| records.get(NEW_ORDER).and_then(|r| r.error().cloned()))
                        .map(|error| match error.as_str() {
                            Some(message) => message.to_string(),
                            None => error.to_string(),
                        })
                        .unwrap_or_else(|| "unknown error".to_string());
                    bail!("Checkout failed: {}", reason)
                }
            }
        }
        Commands::Orders => {
            let ledger = OrderLedger::new(storage, config.orders_key.clone());
            let history = ledger.history()?;
            if history.is_empty() {
                println!("No orders yet");
            }
            for order in history {
                println!(
                    "{}  {} line(s)  {:.2}",
                    order.id,
                    order.lines.len(),
                    order.total
                );
            }
            Ok(())
        }
    }
}

fn run_cart(command: CartCommand, store: &ShopStore) -> Result<()> {
    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            id,
            name,
            price,
            count,
        } => {
            let current = cart_state(&store.get_state()).get(&id).map(|line| line.good.clone());
            let good = Good {
                name: name
                    .or_else(|| current.as_ref().map(|good| good.name.clone()))
                    .unwrap_or_else(|| id.clone()),
                price: price
                    .or_else(|| current.as_ref().map(|good| good.price))
                    .unwrap_or(0.0),
                id,
            };
            store.dispatch(CartAction::Add { good, count }.into());
        }
        CartCommand::Sub { id, count } => {
            store.dispatch(CartAction::Sub { id, count }.into());
        }
        CartCommand::Set { id, count } => {
            if !store.dispatch_thunk(set_count(id.clone(), count)) {
                bail!("No '{}' in the cart", id);
            }
        }
        CartCommand::Del { id } => {
            store.dispatch(CartAction::Del { id }.into());
        }
        CartCommand::Clear => {
            store.dispatch(CartAction::Clear.into());
        }
    }
    print_cart(store);
    Ok(())
}

fn print_cart(store: &ShopStore) {
    let cart = cart_state(&store.get_state());
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in cart.lines() {
        println!(
            "{:<16} {:<24} {:>4} x {:>8.2} = {:>9.2}",
            line.good.id,
            line.good.name,
            line.count,
            line.good.price,
            line.subtotal()
        );
    }
    println!(
        "{} item(s), total {:.2}",
        cart.total_count(),
        cart.total_price()
    );
}

fn print_session(store: &ShopStore) {
    let auth = auth_state(&store.get_state());
    match (auth.is_logged_in(), auth.subject()) {
        (false, _) => println!("Not logged in"),
        (true, Some(subject)) => println!("Logged in as {}", subject),
        (true, None) => println!("Logged in"),
    }
}
