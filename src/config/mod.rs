use std::env;
use std::path::PathBuf;

/// Runtime configuration for the photo processing relay
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (default: 4000)
    pub port: u16,

    /// Flat directory holding uploaded inputs and processed outputs
    /// (default: "./uploads")
    pub upload_dir: PathBuf,

    /// Age threshold after which the sweeper deletes a file, in seconds
    /// (default: 3600)
    pub file_expiry_secs: u64,

    /// Period of the retention sweeper, in seconds (default: 3600)
    pub sweep_interval_secs: u64,

    /// Command line of the external processor; input and output paths are
    /// appended as the final two arguments
    pub processor_command: String,

    /// Maximum request body size in bytes (default: 256 MB)
    pub max_file_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            upload_dir: PathBuf::from("./uploads"),
            file_expiry_secs: 3600,
            sweep_interval_secs: 3600,
            processor_command: "python3 process_passport_photo.py".to_string(),
            max_file_size: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            file_expiry_secs: env::var("FILE_EXPIRY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.file_expiry_secs),

            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.sweep_interval_secs),

            processor_command: env::var("PROCESSOR_COMMAND")
                .unwrap_or(default.processor_command),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }
}
