//! Process-wide settings, resolved once before dispatch.

use std::time::Duration;

use tracing::warn;
use vast_core::MarketClient;

use crate::args::GlobalArgs;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub raw: bool,
    pub explain: bool,
}

impl Config {
    pub fn from_args(args: &GlobalArgs) -> Result<Self, CliError> {
        let base_url = args.url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(CliError::Config(format!("url must be http(s): {base_url}")));
        }
        if args.timeout == 0 {
            return Err(CliError::Config("timeout must be at least one second".to_string()));
        }
        let api_key = args.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            warn!("no API key configured; set VAST_API_KEY or pass --api-key");
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(args.timeout),
            raw: args.raw,
            explain: args.explain,
        })
    }

    pub fn client(&self) -> MarketClient {
        MarketClient::new(&self.base_url, self.api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::args::Cli;

    fn global(argv: &[&str]) -> GlobalArgs {
        let mut full = vec!["vast"];
        full.extend_from_slice(argv);
        full.push("show-instances");
        Cli::try_parse_from(full).unwrap().global
    }

    #[test]
    fn strips_trailing_slash_and_blank_key() {
        let config = Config::from_args(&global(&["--url", "http://localhost:3000/api/v0/", "--api-key", " "])).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000/api/v0");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn rejects_non_http_url() {
        let err = Config::from_args(&global(&["--url", "ftp://example.com"])).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::from_args(&global(&["--timeout", "0"])).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
