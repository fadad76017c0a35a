pub mod config;
pub mod server;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};
pub use server::{build_app, run_server};
