//! Zellow Server - storefront backend for Zellow Enterprises
//!
//! # Overview
//!
//! - **Cart** (`cart`): server-side carts priced from the live catalog
//! - **Checkout** (`checkout`): step-gated checkout, atomic order placement
//! - **Orders** (`orders`): role-gated lifecycle commands and event broadcast
//! - **Notifications** (`notify`): gift, delivery, receipt mail and web push
//! - **Requests** (`requests`): approval, bulk order, stock and feedback workflows
//! - **HTTP API** (`api`): axum routers
//!
//! # Layout
//!
//! ```text
//! zellow-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── auth/          # JWT verification, roles
//! ├── db/            # redb storage
//! ├── cart/
//! ├── checkout/
//! ├── orders/
//! ├── notify/
//! ├── requests/
//! ├── api/           # routes and handlers
//! └── utils/         # logger, validation
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod requests;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::Storage;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read the configuration, prepare the work directory and
/// start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    let _ = dotenv::dotenv();

    let config = Config::from_env()?;
    std::fs::create_dir_all(config.log_dir())?;
    init_logger_with_file(Some(&config.log_level), Some(&config.log_dir()));

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
 _____     _ _
|__  /___| | | _____      __
  / // _ \ | |/ _ \ \ /\ / /
 / /|  __/ | | (_) \ V  V /
/____\___|_|_|\___/ \_/\_/
    "#
    );
}
