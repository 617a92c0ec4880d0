pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::StorageConfig;

pub use crate::core::{gateway::GatewayStorage, memory::MemoryStorage};
pub use crate::domain::model::{Blob, BlobContent, Listing};
pub use crate::domain::ports::BlobStorage;
pub use crate::utils::error::{Result, StorageError};
