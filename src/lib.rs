pub mod args;
mod backup;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod store;
pub mod summary;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use db::Db;
pub use error::{Error, ReadError, Result};
pub use store::{KeyValue, MemoryStore, Store};
