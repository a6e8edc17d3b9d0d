pub mod assignment;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod pool;
pub mod roster;
pub mod scoring;
pub mod store;

pub use error::PoolError;
pub use pool::PoolContext;
