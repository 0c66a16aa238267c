//! QKart CLI - a terminal front-end for the storefront.
//!
//! # Usage
//!
//! ```bash
//! qkart login criodo --password learnbydoing
//! qkart search running shoes
//! qkart cart add BW0jAAeDJmlZCF8i
//! qkart address add "12 Main Street, Bengaluru"
//! qkart checkout --address 0Ds2hWYqwcxC3m6o
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - account
//! - `products`, `search` - catalog
//! - `cart` - show and edit the cart
//! - `address` - manage shipping addresses
//! - `checkout` - place the order
//!
//! Configuration comes from `QKART_*` environment variables (see
//! `qkart_storefront::config`). Every failure is printed as the same notice
//! a graphical front-end would show, and the process exits non-zero.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use qkart_core::{AddressId, ProductId};
use qkart_storefront::StoreConfig;
use qkart_storefront::config::ConfigError;
use qkart_storefront::error::StoreError;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user and wallet balance
    Whoami,
    /// List the whole catalog
    Products,
    /// Search the catalog; words are typed in one by one
    Search {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage shipping addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place the order for the current cart
    Checkout {
        /// Shipping address id (see `qkart address list`)
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product that is not in the cart yet
    Add { product_id: String },
    /// Raise a product's quantity by one
    Inc { product_id: String },
    /// Lower a product's quantity by one
    Dec { product_id: String },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add { text: String },
    /// Delete a saved address
    Remove { id: String },
}

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The failure was already shown to the user.
    #[error("command failed")]
    Reported,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StoreConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(&CliError::from(e)),
    };

    // Sentry first, so the tracing layer has a client to report to
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout is for command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_storefront=warn,qkart_cli=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        exit_with(&e);
    }
}

#[allow(clippy::print_stderr)]
fn exit_with(err: &CliError) -> ! {
    match err {
        CliError::Store(e) => eprintln!("{}", e.report()),
        CliError::Config(_) => eprintln!("{err}"),
        CliError::Reported => {}
    }
    std::process::exit(1);
}

async fn run(cli: Cli, config: StoreConfig) -> Result<(), CliError> {
    let mut app = commands::App::new(config)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(&mut app, &username, &SecretString::from(password)).await?;
        }
        Commands::Register {
            username,
            password,
            confirm,
        } => {
            commands::account::register(
                &app,
                &username,
                &SecretString::from(password),
                &SecretString::from(confirm),
            )
            .await?;
        }
        Commands::Logout => commands::account::logout(&mut app)?,
        Commands::Whoami => commands::account::whoami(&app),
        Commands::Products => commands::catalog::products(&app).await?,
        Commands::Search { words } => commands::catalog::search(&app, &words).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app).await?,
            CartAction::Add { product_id } => {
                commands::cart::add(&app, &ProductId::new(product_id)).await?;
            }
            CartAction::Inc { product_id } => {
                commands::cart::increment(&app, &ProductId::new(product_id)).await?;
            }
            CartAction::Dec { product_id } => {
                commands::cart::decrement(&app, &ProductId::new(product_id)).await?;
            }
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&app).await?,
            AddressAction::Add { text } => commands::address::add(&app, &text).await?,
            AddressAction::Remove { id } => {
                commands::address::remove(&app, &AddressId::new(id)).await?;
            }
        },
        Commands::Checkout { address } => {
            commands::checkout::checkout(&mut app, &AddressId::new(address)).await?;
        }
    }
    Ok(())
}
