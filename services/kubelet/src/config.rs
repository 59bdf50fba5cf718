//! Configuration for the kubelet.
//!
//! Everything the runtime-facing components need is carried explicitly in
//! this struct; there are no module-level globals.

use std::time::Duration;

use anyhow::Result;

/// Kubelet configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Container runtime endpoint. Either `unix:///path/to.sock` or an
    /// `http://host:port` URL.
    pub runtime_endpoint: String,

    /// Per-call timeout applied to every runtime RPC.
    pub call_timeout: Duration,

    /// Command for containers whose spec does not provide one.
    pub default_command: Vec<String>,

    /// Working directory for containers whose spec does not provide one.
    pub default_working_dir: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime_endpoint: "unix:///run/containerd/containerd.sock".to_string(),
            call_timeout: Duration::from_secs(30),
            default_command: vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "sleep 1000".to_string(),
            ],
            default_working_dir: "/root".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let runtime_endpoint = std::env::var("KRILL_RUNTIME_ENDPOINT")
            .unwrap_or(defaults.runtime_endpoint);

        let call_timeout = std::env::var("KRILL_RUNTIME_CALL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.call_timeout);

        let default_working_dir = std::env::var("KRILL_DEFAULT_WORKDIR")
            .unwrap_or(defaults.default_working_dir);

        let log_level = std::env::var("KRILL_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            runtime_endpoint,
            call_timeout,
            default_command: defaults.default_command,
            default_working_dir,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.runtime_endpoint.starts_with("unix://"));
        assert_eq!(config.call_timeout, Duration::from_secs(30));
        assert_eq!(config.default_working_dir, "/root");
        assert_eq!(config.default_command[0], "/bin/sh");
    }
}
