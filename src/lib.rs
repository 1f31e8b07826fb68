//! Client for the Mandiri QRIS merchant portal transaction-history API.
//! Replays the headers and cookies of an authenticated browser session and
//! can refresh the short-lived secret-token when the portal returns 401.

pub mod client;
pub mod config;
pub mod env_file;
pub mod error;
pub mod output;

pub use client::Session;
pub use config::{Cli, Config};
pub use error::QrisError;
