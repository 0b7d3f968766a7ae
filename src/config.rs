//! Configuration management for Toolbox Server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Per-file upload cap shared by every handler
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadConfig,
    pub cron: CronConfig,
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub local_root: PathBuf,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
    /// Base URL objects are publicly reachable under
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Minio,
    R2,
    S3,
    B2,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub temp_dir: PathBuf,
    pub temp_file_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CronConfig {
    /// Shared secret for `Authorization: Bearer`; `None` rejects all cron calls
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub api_base: String,
    pub spreadsheet_id: Option<String>,
    pub range: String,
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                provider: StorageProvider::Local,
                local_root: PathBuf::from("./data/blobs"),
                endpoint: "http://localhost:9000".to_string(),
                bucket: "toolbox".to_string(),
                access_key: String::new(),
                secret_key: String::new(),
                region: Some("us-east-1".to_string()),
                public_url: None,
            },
            uploads: UploadConfig::default(),
            cron: CronConfig { secret: None },
            sheets: SheetsConfig {
                api_base: "https://sheets.googleapis.com/v4".to_string(),
                spreadsheet_id: None,
                range: "Sheet1!A:D".to_string(),
                access_token: None,
            },
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            max_file_size: DEFAULT_MAX_UPLOAD_BYTES,
            temp_dir: env::temp_dir().join("toolbox"),
            temp_file_ttl_secs: 300,
        }
    }
}

impl StorageProvider {
    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "minio" => StorageProvider::Minio,
            "r2" => StorageProvider::R2,
            "s3" => StorageProvider::S3,
            "b2" => StorageProvider::B2,
            _ => StorageProvider::Local,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = Config::default();
        let provider = StorageProvider::from_name(
            &env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "local".to_string()),
        );

        // S3 credentials are only mandatory when an S3-compatible backend is selected
        let s3_var = |name: &str, fallback: &str| -> Result<String, env::VarError> {
            match provider {
                StorageProvider::Local => Ok(env::var(name).unwrap_or_else(|_| fallback.to_string())),
                _ => env::var(name),
            }
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            storage: StorageConfig {
                provider,
                local_root: env::var("STORAGE_LOCAL_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.local_root),
                endpoint: s3_var("S3_ENDPOINT", &defaults.storage.endpoint)?,
                bucket: s3_var("S3_BUCKET", &defaults.storage.bucket)?,
                access_key: s3_var("S3_ACCESS_KEY", "")?,
                secret_key: s3_var("S3_SECRET_KEY", "")?,
                region: env::var("S3_REGION").ok(),
                public_url: env::var("STORAGE_PUBLIC_URL").ok(),
            },
            uploads: UploadConfig {
                max_file_size: env::var("MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                temp_dir: env::var("TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.uploads.temp_dir),
                temp_file_ttl_secs: env::var("TEMP_FILE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.uploads.temp_file_ttl_secs),
            },
            cron: CronConfig {
                secret: env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
            },
            sheets: SheetsConfig {
                api_base: env::var("SHEETS_API_BASE").unwrap_or(defaults.sheets.api_base),
                spreadsheet_id: env::var("SHEETS_SPREADSHEET_ID").ok(),
                range: env::var("SHEETS_RANGE").unwrap_or(defaults.sheets.range),
                access_token: env::var("SHEETS_ACCESS_TOKEN").ok(),
            },
        })
    }
}
