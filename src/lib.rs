pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod secrets;
pub mod template;
pub mod vault;

pub use error::{Error, Result, StoreError};
