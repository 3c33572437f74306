pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod parser;
pub mod query;
pub mod schema;
pub mod store;
pub mod ui;
pub mod validate;

pub use cli::{Cli, Commands};
pub use error::{DbError, DbResult};
pub use manager::AirlineDb;
