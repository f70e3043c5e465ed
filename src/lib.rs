pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod generator;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod store;
