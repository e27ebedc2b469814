pub mod cli;
pub mod config;
pub mod engine;
pub mod store;
pub mod webhook;

pub use config::Config;
pub use store::Store;
pub use webhook::Dispatcher;
