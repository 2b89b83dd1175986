pub mod config;
pub mod error;
pub mod types;

pub use config::KitchenConfig;
pub use error::{KitchenError, Result};
