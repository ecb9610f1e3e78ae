use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Command line of the `ficserver` binary.
///
/// The port is the only required argument; a wrong argument count makes clap
/// print the usage to stderr and exit with a non-zero status.
#[derive(Debug, Parser)]
#[command(name = "ficserver", version, about = "Minimal HTTP/1.0 static file server")]
pub struct Cli {
    /// TCP port to listen on
    pub port: u16,

    /// Optional YAML configuration file
    #[arg(long, env = "FICSERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Document root, overrides the configured one
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Layers the command line on top of an already loaded configuration.
    pub fn apply(&self, mut cfg: Config) -> Config {
        cfg.server.port = self.port;
        if let Some(root) = &self.root {
            cfg.static_files.root = root.clone();
        }
        cfg
    }
}
