use serde::{Deserialize, Serialize};
use std::env;

/// S3 connection settings, resolved once at startup and passed explicitly
/// into the client wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// - `S3_ENDPOINT`: custom endpoint (unset = AWS)
    /// - `S3_REGION`: region (default `us-east-1`)
    /// - `S3_BUCKET`: bucket holding both the feed and the artifacts
    ///   (default `eventtdata`)
    /// - `S3_ACCESS_KEY` / `AWS_ACCESS_KEY_ID`
    /// - `S3_SECRET_KEY` / `AWS_SECRET_ACCESS_KEY`
    /// - `S3_PATH_STYLE`: force path-style addressing (default false)
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: env::var("S3_ENDPOINT").ok(),
            region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "eventtdata".to_string()),
            access_key: env::var("S3_ACCESS_KEY")
                .or_else(|_| env::var("AWS_ACCESS_KEY_ID"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("S3_SECRET_KEY")
                .or_else(|_| env::var("AWS_SECRET_ACCESS_KEY"))
                .unwrap_or_else(|_| "minioadmin".to_string()),
            path_style: env::var("S3_PATH_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Configuration for a local MinIO instance, used by integration tests.
    pub fn for_minio(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            region: "us-east-1".to_string(),
            bucket: bucket.into(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            path_style: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_for_minio() {
        let config = StorageConfig::for_minio("http://localhost:9000", "test-bucket");
        assert_eq!(config.endpoint, Some("http://localhost:9000".to_string()));
        assert_eq!(config.bucket, "test-bucket");
        assert!(config.path_style);
        assert_eq!(config.access_key, "minioadmin");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        for var in [
            "S3_ENDPOINT",
            "S3_REGION",
            "S3_BUCKET",
            "S3_ACCESS_KEY",
            "S3_SECRET_KEY",
            "S3_PATH_STYLE",
            "AWS_ACCESS_KEY_ID",
            "AWS_SECRET_ACCESS_KEY",
        ] {
            std::env::remove_var(var);
        }

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.endpoint, None);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.bucket, "eventtdata");
        assert!(!config.path_style);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("S3_REGION", "eu-west-1");
        std::env::set_var("S3_BUCKET", "feed-bucket");
        std::env::set_var("S3_PATH_STYLE", "true");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.bucket, "feed-bucket");
        assert!(config.path_style);

        std::env::remove_var("S3_REGION");
        std::env::remove_var("S3_BUCKET");
        std::env::remove_var("S3_PATH_STYLE");
    }
}
