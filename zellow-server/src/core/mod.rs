//! Core module - configuration, state, server and background tasks
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - shared service references
//! - [`Server`] - HTTP server
//! - [`BackgroundTasks`] - spawned task registry

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::{Config, ConfigError, MailConfig, VapidConfig};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
