pub mod api;
pub mod config;
pub mod engine;
pub mod init;
pub mod logger;
pub mod reload;
pub mod resolver;
pub mod store;
