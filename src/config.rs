// Configuration: command-line options (with environment fallbacks) and the
// validated `DeployConfig` handed to the transport and the orchestrator.
// Everything is resolved once at startup; nothing reads the environment
// afterwards.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::token::Credential;

/// Site URL used when nothing is configured. Deploying against it is
/// refused.
pub const PLACEHOLDER_SITE_URL: &str = "https://your-ghost-site.com";
const PLACEHOLDER_HOST: &str = "your-ghost-site.com";

/// Where the theme build drops its archive.
pub const DEFAULT_ARTIFACT: &str = "source/dist/shipmas.zip";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upload a packaged theme to a Ghost site and activate it.
#[derive(Parser, Debug)]
#[command(name = "ghost-theme-deploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the theme zip archive
    #[arg(default_value = DEFAULT_ARTIFACT)]
    pub artifact: PathBuf,

    /// Base URL of the Ghost site
    #[arg(long, env = "GHOST_URL", default_value = PLACEHOLDER_SITE_URL)]
    pub site_url: String,

    /// Admin API key in the form <id>:<secret>
    #[arg(long, env = "GHOST_ADMIN_API_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn deploy_config(&self) -> Result<DeployConfig, ConfigError> {
        DeployConfig::new(
            &self.site_url,
            self.admin_key.as_deref(),
            Duration::from_secs(self.timeout),
        )
    }
}

/// Log filter for the run: `--verbose` forces debug, otherwise `RUST_LOG`
/// applies when it parses, falling back to info.
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Validated, immutable settings for one deployment run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub site: Url,
    pub credential: Credential,
    pub timeout: Duration,
}

impl DeployConfig {
    /// Validate raw settings. The credential is checked first so a missing
    /// key is reported even when the URL is also wrong.
    pub fn new(
        site_url: &str,
        admin_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let credential = match admin_key {
            Some(key) => Credential::parse(key)?,
            None => return Err(ConfigError::MissingCredential),
        };
        let site = parse_site_url(site_url)?;
        Ok(DeployConfig {
            site,
            credential,
            timeout,
        })
    }
}

fn parse_site_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSiteUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.host_str() == Some(PLACEHOLDER_HOST) {
        return Err(ConfigError::PlaceholderSiteUrl(raw.to_string()));
    }
    Ok(url)
}
