pub mod config;
pub mod handlers;
pub mod health;
pub mod mappers;
pub mod middleware;
pub mod routes;
pub mod sequencer;
pub mod server;
pub mod state;
pub mod upstream;

pub use config::{ProxyConfig, UpstreamConfig};
pub use server::AxumServer;

#[cfg(test)]
mod tests;
