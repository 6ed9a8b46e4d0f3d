use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::args::CliOptions;
use crate::handler::DocumentRoot;

pub const DEFAULT_ROOT: &str = "www";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

const ROOT_OPTION: &[&str] = &["d", "directory"];
const HOST_OPTION: &[&str] = &["host"];
const PORT_OPTION: &[&str] = &["p", "port"];

/// Server configuration parsed from command-line arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory files are served from, relative to the working directory or absolute
    pub root: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            root: PathBuf::from(DEFAULT_ROOT),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ServerConfig {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Build a configuration from `std::env::args`-style arguments
    pub fn from_args(args: &[String]) -> Result<Self> {
        Self::from_options(&crate::args::parse_args(args)?)
    }

    fn from_options(options: &CliOptions) -> Result<Self> {
        let known: Vec<&str> = [ROOT_OPTION, HOST_OPTION, PORT_OPTION].concat();
        if let Some(unknown) = options.unknown(&known).next() {
            bail!("Unknown option: {}", unknown);
        }

        let mut config = ServerConfig::default();
        if let Some(root) = options.get(ROOT_OPTION) {
            config.root = PathBuf::from(root);
        }
        if let Some(host) = options.get(HOST_OPTION) {
            config.host = host.to_string();
        }
        if let Some(port) = options.get(PORT_OPTION) {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid port: '{}'", port))?;
        }

        Ok(config)
    }

    /// Address to bind, e.g. "localhost:8080"
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the configured directory into a canonical document root
    pub fn document_root(&self) -> Result<DocumentRoot> {
        DocumentRoot::open(&self.root)
    }
}

/// Parse the process arguments into ServerConfig
pub fn parse_args() -> Result<ServerConfig> {
    let args: Vec<String> = env::args().collect();
    ServerConfig::from_args(&args)
}
