use std::env;
use std::time::Duration;

/// Region the samples fall back to when nothing else is configured.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub table_name: String,
    pub bucket_name: String,
    pub queue_names: Vec<String>,
    pub table_wait_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            table_name: "Person".to_string(),
            bucket_name: "python-test-aaaaa".to_string(),
            queue_names: vec!["test1".to_string(), "test2".to_string()],
            table_wait_timeout: Duration::from_secs(300),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let table_wait_timeout = match lookup("TABLE_WAIT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| format!("TABLE_WAIT_TIMEOUT_SECS: {}", e))?,
            ),
            None => defaults.table_wait_timeout,
        };

        let queue_names = match lookup("SAMPLE_QUEUE_NAMES") {
            Some(raw) => {
                let names: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect();
                if names.is_empty() {
                    return Err("SAMPLE_QUEUE_NAMES: no queue names given".to_string());
                }
                names
            }
            None => defaults.queue_names,
        };

        Ok(Self {
            region: lookup("AWS_REGION")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.region),
            endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|s| !s.is_empty()),
            table_name: lookup("SAMPLE_TABLE_NAME").unwrap_or(defaults.table_name),
            bucket_name: lookup("SAMPLE_BUCKET_NAME").unwrap_or(defaults.bucket_name),
            queue_names,
            table_wait_timeout,
        })
    }
}
