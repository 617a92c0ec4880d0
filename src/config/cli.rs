use crate::config::{StorageConfig, DEFAULT_BASE_URL, DEFAULT_FOLDER};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty, validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "blobgate")]
#[command(about = "Smoke-test a remote blob-storage gateway")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_FOLDER)]
    pub folder: String,

    #[arg(long, help = "Bearer token sent with every request")]
    pub token: Option<String>,

    #[arg(long, help = "Local file to upload; a small generated payload is used when omitted")]
    pub file: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty("folder", &self.folder)?;
        Ok(())
    }
}

impl CliConfig {
    pub fn storage_config(&self) -> Result<StorageConfig> {
        StorageConfig::new(self.base_url.clone(), self.folder.clone(), self.token.clone())
    }
}
