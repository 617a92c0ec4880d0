use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Blob not found: {name}")]
    NotFound { name: String },

    #[error("Upload failed: {message}")]
    UploadFailed { message: String },

    #[error("Download failed for {name}: {message}")]
    DownloadFailed { name: String, message: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientInitError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
