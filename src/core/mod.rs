pub mod gateway;
pub mod memory;

pub use crate::domain::model::{Blob, BlobContent, Listing};
pub use crate::domain::ports::BlobStorage;
pub use crate::utils::error::Result;
